//! Slide-deck export: `&[SlideSpec]` → `.pptx`.
//!
//! Each [`SlideSpec`] becomes one slide; its items become text boxes, tables,
//! preset-geometry shapes, labelled image placeholder boxes, or native
//! DrawingML charts.  Charts carry their data as literal caches
//! (`strLit`/`numLit`), so the deck opens without a backing worksheet.
//!
//! Degradation rules: a chart series without `values` is dropped; a chart
//! left with zero usable series is omitted from its slide; an unknown preset
//! shape name falls back to a rectangle.  Malformed items never reach this
//! module — they were already skipped during payload decode.

use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

use tracing::warn;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::xml::{escape, hex_color};
use super::ExportError;
use crate::artifact::{ChartSeries, ItemOptions, SlideItem, SlideSpec, TableCell};

/// pptxgenjs default 16:9 layout, in inches.
const SLIDE_W_IN: f64 = 10.0;
const SLIDE_H_IN: f64 = 5.625;
const EMU_PER_IN: f64 = 914_400.0;

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_C: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";

/// Write the deck to `writer`.
pub fn write_deck<W: Write + Seek>(slides: &[SlideSpec], writer: W) -> Result<(), ExportError> {
    if slides.is_empty() {
        return Err(ExportError::Empty("slide deck is empty"));
    }

    let rendered: Vec<RenderedSlide> = slides.iter().enumerate().scan(0usize, |chart_no, (ix, spec)| {
        Some(render_slide(ix + 1, spec, chart_no))
    }).collect();

    let options =
        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(writer);

    let mut put = |zip: &mut ZipWriter<W>, name: &str, body: &str| -> Result<(), ExportError> {
        zip.start_file(name, options)?;
        zip.write_all(body.as_bytes())?;
        Ok(())
    };

    put(&mut zip, "[Content_Types].xml", &content_types(&rendered))?;
    put(&mut zip, "_rels/.rels", ROOT_RELS)?;
    put(&mut zip, "ppt/presentation.xml", &presentation_xml(rendered.len()))?;
    put(&mut zip, "ppt/_rels/presentation.xml.rels", &presentation_rels(rendered.len()))?;
    put(&mut zip, "ppt/slideMasters/slideMaster1.xml", SLIDE_MASTER)?;
    put(&mut zip, "ppt/slideMasters/_rels/slideMaster1.xml.rels", MASTER_RELS)?;
    put(&mut zip, "ppt/slideLayouts/slideLayout1.xml", SLIDE_LAYOUT)?;
    put(&mut zip, "ppt/slideLayouts/_rels/slideLayout1.xml.rels", LAYOUT_RELS)?;
    put(&mut zip, "ppt/theme/theme1.xml", THEME)?;

    for slide in &rendered {
        put(&mut zip, &format!("ppt/slides/slide{}.xml", slide.number), &slide.xml)?;
        put(
            &mut zip,
            &format!("ppt/slides/_rels/slide{}.xml.rels", slide.number),
            &slide.rels_xml(),
        )?;
        for chart in &slide.charts {
            put(&mut zip, &format!("ppt/charts/chart{}.xml", chart.number), &chart.xml)?;
        }
    }

    zip.finish()?;
    Ok(())
}

/// Convenience wrapper writing to a filesystem path.
pub fn save_deck(slides: &[SlideSpec], path: impl AsRef<Path>) -> Result<(), ExportError> {
    let file = File::create(path)?;
    write_deck(slides, file)
}

// ── Slide rendering ──────────────────────────────────────────────────────────

struct RenderedSlide {
    number: usize,
    xml: String,
    charts: Vec<RenderedChart>,
}

struct RenderedChart {
    number: usize,
    xml: String,
}

impl RenderedSlide {
    /// rId1 is always the layout; charts follow in order.
    fn rels_xml(&self) -> String {
        let mut rels = String::from(
            "<Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout\" Target=\"../slideLayouts/slideLayout1.xml\"/>",
        );
        for (ix, chart) in self.charts.iter().enumerate() {
            rels.push_str(&format!(
                "<Relationship Id=\"rId{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart\" Target=\"../charts/chart{}.xml\"/>",
                ix + 2,
                chart.number
            ));
        }
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
             <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">{rels}</Relationships>"
        )
    }
}

fn render_slide(number: usize, spec: &SlideSpec, chart_no: &mut usize) -> RenderedSlide {
    let mut shapes = String::new();
    let mut charts = Vec::new();
    let mut shape_id = 2u32;

    for item in &spec.data {
        match item {
            SlideItem::Text { value, options } => {
                let f = frame(options, 0.5, 0.5, 9.0, 1.0);
                shapes.push_str(&sp_xml(shape_id, "TextBox", "rect", &f, options, value, true));
            }
            SlideItem::Shape { value, options } => {
                let f = frame(options, 0.5, 0.5, 3.0, 2.0);
                shapes.push_str(&sp_xml(shape_id, "Shape", preset_geometry(value), &f, options, "", false));
            }
            SlideItem::Image { value, options } => {
                let f = frame(options, 0.5, 0.5, 4.0, 3.0);
                let label = match value {
                    Some(path) if !path.is_empty() => format!("[image] {path}"),
                    _ => "[image placeholder]".to_owned(),
                };
                shapes.push_str(&placeholder_xml(shape_id, &f, &label));
            }
            SlideItem::Table { value, options } => {
                if value.is_empty() {
                    continue;
                }
                let rows = value.len();
                let f = frame(options, 0.5, 0.5, 9.0, 0.4 * rows as f64);
                shapes.push_str(&table_xml(shape_id, &f, value, options));
            }
            SlideItem::Chart { value, series, options } => {
                let usable: Vec<&ChartSeries> = series
                    .iter()
                    .filter(|s| s.numeric_values().is_some_and(|v| !v.is_empty()))
                    .collect();
                if usable.is_empty() {
                    warn!(kind = %value, "chart has no usable series; omitting");
                    continue;
                }
                *chart_no += 1;
                let f = frame(options, 0.5, 0.5, 6.0, 4.0);
                let r_id = charts.len() + 2;
                shapes.push_str(&chart_frame_xml(shape_id, &f, r_id));
                charts.push(RenderedChart {
                    number: *chart_no,
                    xml: chart_space_xml(value, &usable, options),
                });
            }
        }
        shape_id += 1;
    }

    let xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <p:sld xmlns:a=\"{NS_A}\" xmlns:r=\"{NS_R}\" xmlns:p=\"{NS_P}\">\
         <p:cSld><p:spTree>\
         <p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>\
         {shapes}\
         </p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"
    );

    RenderedSlide { number, xml, charts }
}

// ── Geometry ─────────────────────────────────────────────────────────────────

struct Frame {
    x: i64,
    y: i64,
    cx: i64,
    cy: i64,
}

impl Frame {
    fn xfrm(&self) -> String {
        format!(
            "<a:xfrm><a:off x=\"{}\" y=\"{}\"/><a:ext cx=\"{}\" cy=\"{}\"/></a:xfrm>",
            self.x, self.y, self.cx, self.cy
        )
    }
}

fn frame(options: &ItemOptions, dx: f64, dy: f64, dw: f64, dh: f64) -> Frame {
    let inches = |m: &Option<crate::artifact::Measure>, extent: f64, default: f64| {
        m.as_ref().map(|m| m.resolve(extent)).unwrap_or(default)
    };
    let to_emu = |v: f64| (v.max(0.0) * EMU_PER_IN) as i64;
    Frame {
        x: to_emu(inches(&options.x, SLIDE_W_IN, dx)),
        y: to_emu(inches(&options.y, SLIDE_H_IN, dy)),
        cx: to_emu(inches(&options.w, SLIDE_W_IN, dw)).max(1),
        cy: to_emu(inches(&options.h, SLIDE_H_IN, dh)).max(1),
    }
}

// ── Shapes and text ──────────────────────────────────────────────────────────

fn sp_xml(
    id: u32,
    name: &str,
    preset: &str,
    frame: &Frame,
    options: &ItemOptions,
    text: &str,
    text_box: bool,
) -> String {
    let fill = options
        .fill
        .as_ref()
        .and_then(|f| hex_color(f.color()))
        .map(|c| format!("<a:solidFill><a:srgbClr val=\"{c}\"/></a:solidFill>"))
        .unwrap_or_default();
    let tx_box_attr = if text_box { " txBox=\"1\"" } else { "" };

    format!(
        "<p:sp><p:nvSpPr><p:cNvPr id=\"{id}\" name=\"{name} {id}\"/><p:cNvSpPr{tx_box_attr}/><p:nvPr/></p:nvSpPr>\
         <p:spPr>{}<a:prstGeom prst=\"{preset}\"><a:avLst/></a:prstGeom>{fill}</p:spPr>\
         {}</p:sp>",
        frame.xfrm(),
        text_body(text, options)
    )
}

fn placeholder_xml(id: u32, frame: &Frame, label: &str) -> String {
    let options = ItemOptions::default();
    format!(
        "<p:sp><p:nvSpPr><p:cNvPr id=\"{id}\" name=\"Image Placeholder {id}\"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>\
         <p:spPr>{}<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom>\
         <a:solidFill><a:srgbClr val=\"F2F2F2\"/></a:solidFill>\
         <a:ln><a:solidFill><a:srgbClr val=\"BFBFBF\"/></a:solidFill></a:ln></p:spPr>\
         {}</p:sp>",
        frame.xfrm(),
        text_body(label, &options)
    )
}

/// One paragraph per input line; run properties from the item options.
fn text_body(text: &str, options: &ItemOptions) -> String {
    let p_props = match options.align.as_deref() {
        Some("center") => "<a:pPr algn=\"ctr\"/>",
        Some("right") => "<a:pPr algn=\"r\"/>",
        Some("left") => "<a:pPr algn=\"l\"/>",
        _ => "",
    };
    let r_props = run_props(options);

    let paragraphs: String = text
        .split('\n')
        .map(|line| {
            if line.is_empty() {
                format!("<a:p>{p_props}</a:p>")
            } else {
                format!(
                    "<a:p>{p_props}<a:r>{r_props}<a:t>{}</a:t></a:r></a:p>",
                    escape(line)
                )
            }
        })
        .collect();

    format!("<p:txBody><a:bodyPr wrap=\"square\"/><a:lstStyle/>{paragraphs}</p:txBody>")
}

fn run_props(options: &ItemOptions) -> String {
    let mut attrs = String::from(" lang=\"en-US\" dirty=\"0\"");
    if let Some(sz) = options.font_size {
        let hundredths = (sz * 100.0).round() as i64;
        if hundredths > 0 {
            attrs.push_str(&format!(" sz=\"{hundredths}\""));
        }
    }
    if options.bold == Some(true) {
        attrs.push_str(" b=\"1\"");
    }
    if options.italic == Some(true) {
        attrs.push_str(" i=\"1\"");
    }

    let mut children = String::new();
    if let Some(color) = options.color.as_deref().and_then(hex_color) {
        children.push_str(&format!(
            "<a:solidFill><a:srgbClr val=\"{color}\"/></a:solidFill>"
        ));
    }
    if let Some(face) = options.font_face.as_deref() {
        children.push_str(&format!("<a:latin typeface=\"{}\"/>", escape(face)));
    }

    format!("<a:rPr{attrs}>{children}</a:rPr>")
}

/// pptxgenjs preset names are OOXML preset names; anything off the known
/// list renders as a rectangle rather than producing an unreadable file.
fn preset_geometry(name: &str) -> &str {
    const KNOWN: &[&str] = &[
        "rect", "roundRect", "ellipse", "triangle", "parallelogram", "trapezoid", "diamond",
        "pentagon", "hexagon", "heptagon", "octagon", "decagon", "dodecagon", "pie", "chord",
        "teardrop", "frame", "halfFrame", "corner", "diagStripe", "plus", "plaque", "can", "cube",
        "bevel", "donut", "noSmoking", "blockArc", "foldedCorner", "smileyFace", "heart",
        "lightningBolt", "sun", "moon", "cloud", "arc", "leftBracket", "rightBracket",
        "leftBrace", "rightBrace", "leftArrow", "rightArrow", "upArrow", "downArrow",
        "leftRightArrow", "upDownArrow", "bentArrow", "uTurnArrow", "circularArrow", "chevron",
        "star4", "star5", "star6", "star7", "star8", "star10", "star12", "star16", "star24",
        "star32", "ribbon", "ribbon2",
    ];
    if let Some(known) = KNOWN.iter().copied().find(|k| *k == name) {
        return known;
    }
    match name {
        "arrow" => "rightArrow",
        other => {
            warn!(shape = %other, "unknown preset shape; rendering as rect");
            "rect"
        }
    }
}

// ── Tables ───────────────────────────────────────────────────────────────────

fn table_xml(id: u32, frame: &Frame, rows: &[Vec<TableCell>], options: &ItemOptions) -> String {
    let n_cols = rows.iter().map(Vec::len).max().unwrap_or(1).max(1);
    let col_w = frame.cx / n_cols as i64;
    let row_h = frame.cy / rows.len() as i64;
    let r_props = run_props(options);

    let grid: String = (0..n_cols)
        .map(|_| format!("<a:gridCol w=\"{col_w}\"/>"))
        .collect();

    let body: String = rows
        .iter()
        .map(|row| {
            let cells: String = (0..n_cols)
                .map(|col_ix| {
                    let text = row.get(col_ix).map(TableCell::text).unwrap_or_default();
                    format!(
                        "<a:tc><a:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r>{r_props}<a:t>{}</a:t></a:r></a:p></a:txBody><a:tcPr/></a:tc>",
                        escape(&text)
                    )
                })
                .collect();
            format!("<a:tr h=\"{row_h}\">{cells}</a:tr>")
        })
        .collect();

    format!(
        "<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id=\"{id}\" name=\"Table {id}\"/>\
         <p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr>\
         <p:xfrm><a:off x=\"{}\" y=\"{}\"/><a:ext cx=\"{}\" cy=\"{}\"/></p:xfrm>\
         <a:graphic><a:graphicData uri=\"http://schemas.openxmlformats.org/drawingml/2006/table\">\
         <a:tbl><a:tblPr firstRow=\"1\" bandRow=\"1\"/><a:tblGrid>{grid}</a:tblGrid>{body}</a:tbl>\
         </a:graphicData></a:graphic></p:graphicFrame>",
        frame.x, frame.y, frame.cx, frame.cy
    )
}

// ── Charts ───────────────────────────────────────────────────────────────────

fn chart_frame_xml(id: u32, frame: &Frame, r_id: usize) -> String {
    format!(
        "<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id=\"{id}\" name=\"Chart {id}\"/>\
         <p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr>\
         <p:xfrm><a:off x=\"{}\" y=\"{}\"/><a:ext cx=\"{}\" cy=\"{}\"/></p:xfrm>\
         <a:graphic><a:graphicData uri=\"http://schemas.openxmlformats.org/drawingml/2006/chart\">\
         <c:chart xmlns:c=\"{NS_C}\" xmlns:r=\"{NS_R}\" r:id=\"rId{r_id}\"/>\
         </a:graphicData></a:graphic></p:graphicFrame>",
        frame.x, frame.y, frame.cx, frame.cy
    )
}

/// Family the chart kind belongs to; unknown kinds fall back to bars.
enum ChartFamily {
    Bar,
    Line,
    Pie,
}

fn chart_family(kind: &str) -> ChartFamily {
    match kind {
        "line" | "radar" | "scatter" => ChartFamily::Line,
        "pie" | "doughnut" => ChartFamily::Pie,
        "bar" | "bar3D" | "area" | "bubble" => ChartFamily::Bar,
        other => {
            warn!(kind = %other, "unknown chart kind; rendering as bar");
            ChartFamily::Bar
        }
    }
}

fn chart_space_xml(kind: &str, series: &[&ChartSeries], options: &ItemOptions) -> String {
    let sers: String = series
        .iter()
        .enumerate()
        .map(|(ix, s)| series_xml(ix, s))
        .collect();

    let (plot, axes) = match chart_family(kind) {
        ChartFamily::Bar => (
            format!(
                "<c:barChart><c:barDir val=\"col\"/><c:grouping val=\"clustered\"/>{sers}\
                 <c:axId val=\"111111111\"/><c:axId val=\"222222222\"/></c:barChart>"
            ),
            true,
        ),
        ChartFamily::Line => (
            format!(
                "<c:lineChart><c:grouping val=\"standard\"/>{sers}\
                 <c:axId val=\"111111111\"/><c:axId val=\"222222222\"/></c:lineChart>"
            ),
            true,
        ),
        ChartFamily::Pie => (format!("<c:pieChart><c:varyColors val=\"1\"/>{sers}</c:pieChart>"), false),
    };

    let ax_xml = if axes {
        "<c:catAx><c:axId val=\"111111111\"/><c:scaling><c:orientation val=\"minMax\"/></c:scaling>\
         <c:delete val=\"0\"/><c:axPos val=\"b\"/><c:crossAx val=\"222222222\"/></c:catAx>\
         <c:valAx><c:axId val=\"222222222\"/><c:scaling><c:orientation val=\"minMax\"/></c:scaling>\
         <c:delete val=\"0\"/><c:axPos val=\"l\"/><c:crossAx val=\"111111111\"/></c:valAx>"
    } else {
        ""
    };

    let title = options
        .title
        .as_deref()
        .map(|t| {
            format!(
                "<c:title><c:tx><c:rich><a:bodyPr/><a:lstStyle/><a:p><a:r><a:t>{}</a:t></a:r></a:p>\
                 </c:rich></c:tx><c:overlay val=\"0\"/></c:title><c:autoTitleDeleted val=\"0\"/>",
                escape(t)
            )
        })
        .unwrap_or_else(|| "<c:autoTitleDeleted val=\"1\"/>".to_owned());

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <c:chartSpace xmlns:c=\"{NS_C}\" xmlns:a=\"{NS_A}\" xmlns:r=\"{NS_R}\">\
         <c:chart>{title}<c:plotArea><c:layout/>{plot}{ax_xml}</c:plotArea>\
         <c:plotVisOnly val=\"1\"/></c:chart></c:chartSpace>"
    )
}

fn series_xml(ix: usize, series: &ChartSeries) -> String {
    // Callers filtered on numeric_values() being non-empty.
    let values = series.numeric_values().unwrap_or_default();
    let mut labels = series.label_strings();
    labels.resize(values.len(), String::new());

    let name = series.name.clone().unwrap_or_else(|| format!("Series {}", ix + 1));

    let cats: String = labels
        .iter()
        .enumerate()
        .map(|(i, l)| format!("<c:pt idx=\"{i}\"><c:v>{}</c:v></c:pt>", escape(l)))
        .collect();
    let vals: String = values
        .iter()
        .enumerate()
        .map(|(i, v)| format!("<c:pt idx=\"{i}\"><c:v>{v}</c:v></c:pt>"))
        .collect();

    format!(
        "<c:ser><c:idx val=\"{ix}\"/><c:order val=\"{ix}\"/>\
         <c:tx><c:strRef><c:f></c:f><c:strCache><c:ptCount val=\"1\"/>\
         <c:pt idx=\"0\"><c:v>{}</c:v></c:pt></c:strCache></c:strRef></c:tx>\
         <c:cat><c:strLit><c:ptCount val=\"{n}\"/>{cats}</c:strLit></c:cat>\
         <c:val><c:numLit><c:ptCount val=\"{n}\"/>{vals}</c:numLit></c:val></c:ser>",
        escape(&name),
        n = values.len()
    )
}

// ── Static parts ─────────────────────────────────────────────────────────────

fn content_types(slides: &[RenderedSlide]) -> String {
    let mut overrides = String::new();
    for slide in slides {
        overrides.push_str(&format!(
            "<Override PartName=\"/ppt/slides/slide{}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slide+xml\"/>",
            slide.number
        ));
        for chart in &slide.charts {
            overrides.push_str(&format!(
                "<Override PartName=\"/ppt/charts/chart{}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.drawingml.chart+xml\"/>",
                chart.number
            ));
        }
    }
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
         <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
         <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
         <Override PartName=\"/ppt/presentation.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml\"/>\
         <Override PartName=\"/ppt/slideMasters/slideMaster1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml\"/>\
         <Override PartName=\"/ppt/slideLayouts/slideLayout1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml\"/>\
         <Override PartName=\"/ppt/theme/theme1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.theme+xml\"/>\
         {overrides}</Types>"
    )
}

fn presentation_xml(n_slides: usize) -> String {
    let slide_ids: String = (0..n_slides)
        .map(|ix| {
            format!(
                "<p:sldId id=\"{}\" r:id=\"rId{}\"/>",
                256 + ix,
                ix + 2
            )
        })
        .collect();
    let cx = (SLIDE_W_IN * EMU_PER_IN) as i64;
    let cy = (SLIDE_H_IN * EMU_PER_IN) as i64;
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <p:presentation xmlns:a=\"{NS_A}\" xmlns:r=\"{NS_R}\" xmlns:p=\"{NS_P}\">\
         <p:sldMasterIdLst><p:sldMasterId id=\"2147483648\" r:id=\"rId1\"/></p:sldMasterIdLst>\
         <p:sldIdLst>{slide_ids}</p:sldIdLst>\
         <p:sldSz cx=\"{cx}\" cy=\"{cy}\"/><p:notesSz cx=\"6858000\" cy=\"9144000\"/>\
         </p:presentation>"
    )
}

fn presentation_rels(n_slides: usize) -> String {
    let mut rels = String::from(
        "<Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster\" Target=\"slideMasters/slideMaster1.xml\"/>",
    );
    for ix in 0..n_slides {
        rels.push_str(&format!(
            "<Relationship Id=\"rId{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide\" Target=\"slides/slide{}.xml\"/>",
            ix + 2,
            ix + 1
        ));
    }
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">{rels}</Relationships>"
    )
}

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
</Relationships>"#;

const SLIDE_MASTER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
<p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld>
<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>
<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>
</p:sldMaster>"#;

const MASTER_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="../theme/theme1.xml"/>
</Relationships>"#;

const SLIDE_LAYOUT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" type="blank">
<p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld>
<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sldLayout>"#;

const LAYOUT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="../slideMasters/slideMaster1.xml"/>
</Relationships>"#;

const THEME: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office">
<a:themeElements>
<a:clrScheme name="Office"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="44546A"/></a:dk2><a:lt2><a:srgbClr val="E7E6E6"/></a:lt2><a:accent1><a:srgbClr val="4472C4"/></a:accent1><a:accent2><a:srgbClr val="ED7D31"/></a:accent2><a:accent3><a:srgbClr val="A5A5A5"/></a:accent3><a:accent4><a:srgbClr val="FFC000"/></a:accent4><a:accent5><a:srgbClr val="5B9BD5"/></a:accent5><a:accent6><a:srgbClr val="70AD47"/></a:accent6><a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink></a:clrScheme>
<a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme>
<a:fmtScheme name="Office">
<a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst>
<a:lnStyleLst><a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst>
<a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst>
<a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst>
</a:fmtScheme>
</a:themeElements>
</a:theme>"#;

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use zip::ZipArchive;

    use super::*;

    fn decks(json: &str) -> Vec<SlideSpec> {
        serde_json::from_str(json).unwrap()
    }

    fn write_to_archive(slides: &[SlideSpec]) -> ZipArchive<Cursor<Vec<u8>>> {
        let mut buf = Cursor::new(Vec::new());
        write_deck(slides, &mut buf).unwrap();
        buf.set_position(0);
        ZipArchive::new(buf).unwrap()
    }

    fn part(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
        let mut body = String::new();
        archive
            .by_name(name)
            .unwrap_or_else(|_| panic!("missing part {name}"))
            .read_to_string(&mut body)
            .unwrap();
        body
    }

    #[test]
    fn empty_deck_is_rejected() {
        let err = write_deck(&[], Cursor::new(Vec::new())).unwrap_err();
        assert!(matches!(err, ExportError::Empty(_)));
    }

    #[test]
    fn one_slide_per_spec_with_text() {
        let slides = decks(
            r#"[{"data":[{"type":"Text","value":"Climate Report","options":{"bold":true,"fontSize":24}}]},
               {"data":[{"type":"Text","value":"Slide two"}]}]"#,
        );
        let mut archive = write_to_archive(&slides);

        let pres = part(&mut archive, "ppt/presentation.xml");
        assert_eq!(pres.matches("<p:sldId ").count(), 2);

        let slide1 = part(&mut archive, "ppt/slides/slide1.xml");
        assert!(slide1.contains("<a:t>Climate Report</a:t>"));
        assert!(slide1.contains("b=\"1\""));
        assert!(slide1.contains("sz=\"2400\""));

        let slide2 = part(&mut archive, "ppt/slides/slide2.xml");
        assert!(slide2.contains("<a:t>Slide two</a:t>"));
    }

    #[test]
    fn table_renders_rows_and_pads_ragged_columns() {
        let slides = decks(
            r#"[{"data":[{"type":"Table","value":[["Name","Age"],["John"]]}]}]"#,
        );
        let mut archive = write_to_archive(&slides);
        let slide = part(&mut archive, "ppt/slides/slide1.xml");
        assert_eq!(slide.matches("<a:tr ").count(), 2);
        assert_eq!(slide.matches("<a:tc>").count(), 4);
        assert!(slide.contains("<a:t>John</a:t>"));
    }

    #[test]
    fn chart_gets_its_own_part_with_literal_data() {
        let slides = decks(
            r#"[{"data":[{"type":"Chart","value":"bar","options":{"title":"Sales"},
                "chatData":[{"name":"Q1","labels":["Jan","Feb"],"values":[10,20]}]}]}]"#,
        );
        let mut archive = write_to_archive(&slides);

        let chart = part(&mut archive, "ppt/charts/chart1.xml");
        assert!(chart.contains("<c:barChart>"));
        assert!(chart.contains("<c:v>Q1</c:v>"));
        assert!(chart.contains("<c:v>20</c:v>"));
        assert!(chart.contains("<a:t>Sales</a:t>"));

        let rels = part(&mut archive, "ppt/slides/_rels/slide1.xml.rels");
        assert!(rels.contains("charts/chart1.xml"));

        let types = part(&mut archive, "[Content_Types].xml");
        assert!(types.contains("/ppt/charts/chart1.xml"));
    }

    #[test]
    fn chart_without_usable_series_is_omitted() {
        let slides = decks(
            r#"[{"data":[
                {"type":"Text","value":"still here"},
                {"type":"Chart","value":"pie","chatData":[{"name":"broken","labels":["a"]}]}
            ]}]"#,
        );
        let mut archive = write_to_archive(&slides);
        let slide = part(&mut archive, "ppt/slides/slide1.xml");
        assert!(slide.contains("<a:t>still here</a:t>"));
        assert!(!slide.contains("graphicFrame"));
        assert!(archive.by_name("ppt/charts/chart1.xml").is_err());
    }

    #[test]
    fn series_without_values_is_dropped_others_survive() {
        let slides = decks(
            r#"[{"data":[{"type":"Chart","value":"line","chatData":[
                {"name":"good","labels":["a","b"],"values":[1,2]},
                {"name":"bad","labels":["a","b"]}
            ]}]}]"#,
        );
        let mut archive = write_to_archive(&slides);
        let chart = part(&mut archive, "ppt/charts/chart1.xml");
        assert!(chart.contains("<c:v>good</c:v>"));
        assert!(!chart.contains("<c:v>bad</c:v>"));
        assert_eq!(chart.matches("<c:ser>").count(), 1);
    }

    #[test]
    fn unknown_shape_falls_back_to_rect() {
        let slides = decks(
            r#"[{"data":[{"type":"Shape","value":"dodecahedron","options":{"fill":{"color":"FF0000"}}}]}]"#,
        );
        let mut archive = write_to_archive(&slides);
        let slide = part(&mut archive, "ppt/slides/slide1.xml");
        assert!(slide.contains("prst=\"rect\""));
        assert!(slide.contains("srgbClr val=\"FF0000\""));
    }

    #[test]
    fn known_shape_keeps_its_preset() {
        let slides = decks(r#"[{"data":[{"type":"Shape","value":"heart"}]}]"#);
        let mut archive = write_to_archive(&slides);
        let slide = part(&mut archive, "ppt/slides/slide1.xml");
        assert!(slide.contains("prst=\"heart\""));
    }

    #[test]
    fn image_becomes_labelled_placeholder() {
        let slides = decks(r#"[{"data":[{"type":"Image","value":"logo.png"}]}]"#);
        let mut archive = write_to_archive(&slides);
        let slide = part(&mut archive, "ppt/slides/slide1.xml");
        assert!(slide.contains("<a:t>[image] logo.png</a:t>"));
    }

    #[test]
    fn percent_measures_resolve_against_the_slide() {
        let slides = decks(
            r#"[{"data":[{"type":"Text","value":"x","options":{"x":"50%","w":"10%"}}]}]"#,
        );
        let mut archive = write_to_archive(&slides);
        let slide = part(&mut archive, "ppt/slides/slide1.xml");
        // 50% of 10in = 5in = 4572000 EMU; 10% = 1in = 914400 EMU.
        assert!(slide.contains("x=\"4572000\""));
        assert!(slide.contains("cx=\"914400\""));
    }

    #[test]
    fn charts_number_globally_across_slides() {
        let slides = decks(
            r#"[{"data":[{"type":"Chart","value":"bar","chatData":[{"values":[1]}]}]},
               {"data":[{"type":"Chart","value":"bar","chatData":[{"values":[2]}]}]}]"#,
        );
        let mut archive = write_to_archive(&slides);
        assert!(archive.by_name("ppt/charts/chart1.xml").is_ok());
        assert!(archive.by_name("ppt/charts/chart2.xml").is_ok());
        let rels2 = part(&mut archive, "ppt/slides/_rels/slide2.xml.rels");
        assert!(rels2.contains("charts/chart2.xml"));
    }

    #[test]
    fn static_parts_are_present() {
        let slides = decks(r#"[{"data":[]}]"#);
        let mut archive = write_to_archive(&slides);
        for name in [
            "[Content_Types].xml",
            "_rels/.rels",
            "ppt/presentation.xml",
            "ppt/_rels/presentation.xml.rels",
            "ppt/slideMasters/slideMaster1.xml",
            "ppt/slideLayouts/slideLayout1.xml",
            "ppt/theme/theme1.xml",
            "ppt/slides/slide1.xml",
        ] {
            assert!(archive.by_name(name).is_ok(), "missing {name}");
        }
    }
}
