//! Typed model of the structured payload embedded in assistant replies.
//!
//! The backend instructs the model to emit a pptxgenjs-compatible JSON object
//! with optional `slides` and `excel` fields.  Real model output drifts, so
//! decoding is deliberately tolerant: unknown option fields are ignored, slide
//! items with an unsupported `type` or malformed fields are skipped one by one
//! (the rest of the deck survives), and spreadsheet cells accept both the
//! promised `{ "value": .. }` shape and a bare scalar.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// Top-level payload object parsed out of a reply.
///
/// Both fields are optional; a missing field means "no artifact of that
/// kind", not an error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplyPayload {
    #[serde(default)]
    pub slides: Vec<SlideSpec>,
    #[serde(default)]
    pub excel: Option<SpreadsheetSpec>,
}

impl ReplyPayload {
    /// True when the payload actually carries something exportable.
    pub fn has_artifacts(&self) -> bool {
        !self.slides.is_empty() || self.excel.is_some()
    }
}

// ── Slides ───────────────────────────────────────────────────────────────────

/// One slide's declarative content list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlideSpec {
    #[serde(default, deserialize_with = "lenient_items")]
    pub data: Vec<SlideItem>,
}

/// A single typed element on a slide.  The `type` tag values match the
/// pptxgenjs content types the backend prompt enumerates.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum SlideItem {
    Text {
        #[serde(default)]
        value: String,
        #[serde(default)]
        options: ItemOptions,
    },
    Table {
        #[serde(default)]
        value: Vec<Vec<TableCell>>,
        #[serde(default)]
        options: ItemOptions,
    },
    /// Rendered as a labelled placeholder box; no binary media is embedded.
    Image {
        #[serde(default)]
        value: Option<String>,
        #[serde(default)]
        options: ItemOptions,
    },
    Shape {
        value: String,
        #[serde(default)]
        options: ItemOptions,
    },
    Chart {
        /// Chart kind: `bar`, `line`, `pie`, … unknown kinds fall back to bar.
        #[serde(default)]
        value: String,
        /// Named series; `chatData` is the (misspelled) field the original
        /// client and the backend prompt both use.
        #[serde(default, rename = "chatData")]
        series: Vec<ChartSeries>,
        #[serde(default)]
        options: ItemOptions,
    },
}

/// Decode `data` element-by-element so one malformed item cannot sink the
/// whole slide.
fn lenient_items<'de, D>(deserializer: D) -> Result<Vec<SlideItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<Value>::deserialize(deserializer)?;
    let mut items = Vec::with_capacity(raw.len());
    for value in raw {
        match serde_json::from_value::<SlideItem>(value) {
            Ok(item) => items.push(item),
            Err(e) => warn!(error = %e, "skipping malformed slide item"),
        }
    }
    Ok(items)
}

/// A table cell: pptxgenjs accepts bare strings/numbers or `{ text, .. }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TableCell {
    Text(String),
    Number(f64),
    Rich {
        text: String,
    },
    Other(Value),
}

impl TableCell {
    pub fn text(&self) -> String {
        match self {
            TableCell::Text(s) => s.clone(),
            TableCell::Number(n) => format_number(*n),
            TableCell::Rich { text } => text.clone(),
            TableCell::Other(Value::Null) => String::new(),
            TableCell::Other(v) => v.to_string(),
        }
    }
}

/// One chart series.  `values` is genuinely optional in observed output; a
/// series without values is unusable and the exporter omits it.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartSeries {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub labels: Option<Vec<Value>>,
    #[serde(default)]
    pub values: Option<Vec<Value>>,
}

impl ChartSeries {
    /// Numeric view of `values`; `None` when the field is absent.  Individual
    /// entries that are neither numbers nor numeric strings become `0.0`.
    pub fn numeric_values(&self) -> Option<Vec<f64>> {
        self.values
            .as_ref()
            .map(|vs| vs.iter().map(coerce_number).collect())
    }

    /// Label strings, padded with empty strings by the caller when shorter
    /// than the value list.
    pub fn label_strings(&self) -> Vec<String> {
        self.labels
            .as_ref()
            .map(|ls| ls.iter().map(display_value).collect())
            .unwrap_or_default()
    }
}

// ── Options ──────────────────────────────────────────────────────────────────

/// Position and style options shared by every slide item.  A tolerant
/// superset of the per-type pptxgenjs option bags; fields that do not apply
/// to an item type are simply never read for it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemOptions {
    pub x: Option<Measure>,
    pub y: Option<Measure>,
    pub w: Option<Measure>,
    pub h: Option<Measure>,
    pub font_size: Option<f64>,
    pub font_face: Option<String>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    /// Text color, `RRGGBB` hex.
    pub color: Option<String>,
    pub align: Option<String>,
    pub fill: Option<Fill>,
    pub title: Option<String>,
}

/// A length in slide coordinates: inches, or a percentage of the slide extent.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Measure {
    Inches(f64),
    Percent(String),
}

impl Measure {
    /// Resolve to inches against the given slide extent (also inches).
    pub fn resolve(&self, extent: f64) -> f64 {
        match self {
            Measure::Inches(v) => *v,
            Measure::Percent(s) => {
                let trimmed = s.trim().trim_end_matches('%');
                match trimmed.parse::<f64>() {
                    Ok(pct) if s.trim().ends_with('%') => pct / 100.0 * extent,
                    Ok(v) => v,
                    Err(_) => 0.0,
                }
            }
        }
    }
}

/// Fill color: either `"RRGGBB"` or `{ "color": "RRGGBB" }` on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Fill {
    Plain(String),
    Spec { color: String },
}

impl Fill {
    pub fn color(&self) -> &str {
        match self {
            Fill::Plain(c) => c,
            Fill::Spec { color } => color,
        }
    }
}

// ── Spreadsheet ──────────────────────────────────────────────────────────────

/// Spreadsheet description: column labels plus a 2-D grid of cells.
/// `rowLabels` is carried for preview rendering but, like the original
/// exporter, never written into the workbook.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetSpec {
    #[serde(default)]
    pub column_labels: Vec<String>,
    #[serde(default)]
    pub row_labels: Option<Vec<String>>,
    #[serde(default)]
    pub data: Vec<Vec<Cell>>,
}

/// One grid cell; `{ "value": .. }` per the backend prompt, bare scalars
/// tolerated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Wrapped { value: Value },
    Bare(Value),
}

impl Cell {
    pub fn value(&self) -> &Value {
        match self {
            Cell::Wrapped { value } => value,
            Cell::Bare(value) => value,
        }
    }

    /// Numeric view, for native spreadsheet number cells.
    pub fn as_number(&self) -> Option<f64> {
        self.value().as_f64()
    }

    /// Human-readable text (strings unquoted, null empty).
    pub fn display(&self) -> String {
        display_value(self.value())
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
