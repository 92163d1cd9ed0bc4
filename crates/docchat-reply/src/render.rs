//! Prose rendering: GitHub-flavored markdown to terminal text or print HTML.
//!
//! Two read-only views over [`DecodedReply::prose`](crate::DecodedReply):
//! ANSI-styled text for the interactive session view, and a complete
//! print-formatted HTML document for the "print this block" action.  Copy
//! actions use the raw prose string directly, so nothing here exposes it.

use pulldown_cmark::{html, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::artifact::{Cell, SpreadsheetSpec};

const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const ITALIC: &str = "\x1b[3m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_MATH
}

/// Render prose as a standalone HTML document, styled like the print view
/// the product opens for a reply block.
pub fn render_html(prose: &str) -> String {
    let parser = Parser::new_ext(prose, parser_options());
    let mut body = String::with_capacity(prose.len() * 2);
    html::push_html(&mut body, parser);

    format!(
        "<html>\n<head>\n<title>Print Message</title>\n<style>\n\
         body {{ font-family: Arial, sans-serif; padding: 20px; }}\n\
         table, th, td {{ border: 1px solid #ccc; border-collapse: collapse; padding: 4px 8px; }}\n\
         </style>\n</head>\n<body>\n{body}</body>\n</html>\n"
    )
}

/// Render prose as ANSI-styled terminal text.
///
/// Coverage is intentionally modest: headings, emphasis, code, lists, block
/// quotes, and tables (pipe-joined, header underlined).  Anything else falls
/// through as plain text.
pub fn render_ansi(prose: &str) -> String {
    let parser = Parser::new_ext(prose, parser_options());
    let mut out = String::with_capacity(prose.len());
    let mut table: Option<TableState> = None;
    let mut list_depth = 0usize;

    for event in parser {
        match event {
            Event::Start(tag) => match tag {
                Tag::Heading { level, .. } => {
                    out.push_str(BOLD);
                    out.push_str(heading_prefix(level));
                }
                Tag::Strong => out.push_str(BOLD),
                Tag::Emphasis => out.push_str(ITALIC),
                Tag::BlockQuote(_) => out.push_str(DIM),
                Tag::CodeBlock(_) => out.push_str(CYAN),
                Tag::List(_) => list_depth += 1,
                Tag::Item => {
                    out.push_str(&"  ".repeat(list_depth));
                    out.push_str("• ");
                }
                Tag::Table(_) => table = Some(TableState::default()),
                Tag::TableRow | Tag::TableHead => {
                    if let Some(t) = table.as_mut() {
                        t.row.clear();
                    }
                }
                Tag::TableCell => {
                    if let Some(t) = table.as_mut() {
                        t.row.push(String::new());
                    }
                }
                _ => {}
            },
            Event::End(tag) => match tag {
                TagEnd::Heading(_) => {
                    out.push_str(RESET);
                    out.push_str("\n\n");
                }
                TagEnd::Strong | TagEnd::Emphasis => out.push_str(RESET),
                TagEnd::BlockQuote(_) | TagEnd::CodeBlock => {
                    out.push_str(RESET);
                    out.push('\n');
                }
                TagEnd::Paragraph => {
                    if table.is_none() {
                        out.push_str("\n\n");
                    }
                }
                TagEnd::Item => out.push('\n'),
                TagEnd::List(_) => {
                    list_depth = list_depth.saturating_sub(1);
                    if list_depth == 0 {
                        out.push('\n');
                    }
                }
                TagEnd::TableHead => {
                    if let Some(t) = table.as_mut() {
                        let line = t.row.join(" | ");
                        out.push_str(BOLD);
                        out.push_str(&line);
                        out.push_str(RESET);
                        out.push('\n');
                        out.push_str(&"-".repeat(line.chars().count()));
                        out.push('\n');
                    }
                }
                TagEnd::TableRow => {
                    if let Some(t) = table.as_mut() {
                        out.push_str(&t.row.join(" | "));
                        out.push('\n');
                    }
                }
                TagEnd::Table => {
                    table = None;
                    out.push('\n');
                }
                _ => {}
            },
            Event::Text(text) | Event::Code(text) => match table.as_mut() {
                Some(t) => {
                    if let Some(cell) = t.row.last_mut() {
                        cell.push_str(&text);
                    }
                }
                None => out.push_str(&text),
            },
            Event::InlineMath(math) => {
                out.push('$');
                out.push_str(&math);
                out.push('$');
            }
            Event::DisplayMath(math) => {
                out.push_str("$$");
                out.push_str(&math);
                out.push_str("$$\n");
            }
            Event::SoftBreak | Event::HardBreak => out.push('\n'),
            Event::Rule => out.push_str("────────\n"),
            Event::TaskListMarker(done) => out.push_str(if done { "[x] " } else { "[ ] " }),
            _ => {}
        }
    }

    while out.ends_with('\n') {
        out.pop();
    }
    out.push('\n');
    out
}

/// Render a decoded spreadsheet as an aligned terminal grid, the session
/// view's inline preview of the artifact.  Column labels become a bold
/// underlined header; row labels, when present, become a leading column.
pub fn render_grid(sheet: &SpreadsheetSpec) -> String {
    let row_labels: &[String] = sheet.row_labels.as_deref().unwrap_or(&[]);
    let labelled = !row_labels.is_empty();
    let has_header = !sheet.column_labels.is_empty();

    let mut rows: Vec<Vec<String>> = Vec::with_capacity(sheet.data.len() + 1);
    if has_header {
        let mut header = Vec::new();
        if labelled {
            header.push(String::new());
        }
        header.extend(sheet.column_labels.iter().cloned());
        rows.push(header);
    }
    for (ix, data_row) in sheet.data.iter().enumerate() {
        let mut row = Vec::new();
        if labelled {
            row.push(row_labels.get(ix).cloned().unwrap_or_default());
        }
        row.extend(data_row.iter().map(Cell::display));
        rows.push(row);
    }
    if rows.is_empty() {
        return String::new();
    }

    let n_cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; n_cols];
    for row in &rows {
        for (col, text) in row.iter().enumerate() {
            widths[col] = widths[col].max(text.chars().count());
        }
    }

    let mut out = String::new();
    for (row_ix, row) in rows.iter().enumerate() {
        let line: Vec<String> = (0..n_cols)
            .map(|col| {
                let text = row.get(col).map(String::as_str).unwrap_or("");
                format!("{text:<width$}", width = widths[col])
            })
            .collect();
        let line = line.join(" | ");
        let line = line.trim_end();
        if row_ix == 0 && has_header {
            out.push_str(BOLD);
            out.push_str(line);
            out.push_str(RESET);
            out.push('\n');
            out.push_str(&"-".repeat(line.chars().count()));
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

#[derive(Default)]
struct TableState {
    row: Vec<String>,
}

fn heading_prefix(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "# ",
        HeadingLevel::H2 => "## ",
        HeadingLevel::H3 => "### ",
        _ => "#### ",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_document_has_print_shell_and_body() {
        let html = render_html("**Quarterly** report");
        assert!(html.starts_with("<html>"));
        assert!(html.contains("<title>Print Message</title>"));
        assert!(html.contains("<strong>Quarterly</strong>"));
    }

    #[test]
    fn gfm_table_renders_in_html() {
        let html = render_html("| A | B |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn ansi_heading_is_bold() {
        let out = render_ansi("# Summary");
        assert!(out.contains("\x1b[1m# Summary"));
        assert!(out.contains("\x1b[0m"));
    }

    #[test]
    fn ansi_table_rows_are_pipe_joined() {
        let out = render_ansi("| A | B |\n|---|---|\n| 1 | 2 |");
        assert!(out.contains("A | B"));
        assert!(out.contains("1 | 2"));
    }

    #[test]
    fn ansi_list_items_get_bullets() {
        let out = render_ansi("- one\n- two");
        assert!(out.contains("• one"));
        assert!(out.contains("• two"));
    }

    #[test]
    fn plain_text_survives_unstyled() {
        let out = render_ansi("nothing fancy here");
        assert!(out.contains("nothing fancy here"));
    }

    fn sheet(json: &str) -> SpreadsheetSpec {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn grid_preview_aligns_columns_under_a_header() {
        let out = render_grid(&sheet(
            r#"{"columnLabels":["City","Population"],
               "data":[[{"value":"Reims"},{"value":184076}],[{"value":"Münster"},{"value":320000}]]}"#,
        ));
        assert!(out.contains("City    | Population"));
        assert!(out.contains("Reims   | 184076"));
        assert!(out.contains("Münster | 320000"));
        // Header is bold and underlined with a dash rule.
        assert!(out.contains("\x1b[1mCity"));
        assert!(out.contains("\n------"));
    }

    #[test]
    fn grid_preview_shows_row_labels_as_a_leading_column() {
        let out = render_grid(&sheet(
            r#"{"columnLabels":["Q1","Q2"],"rowLabels":["North","South"],
               "data":[[{"value":1},{"value":2}],[{"value":3},{"value":4}]]}"#,
        ));
        assert!(out.contains("North | 1  | 2"));
        assert!(out.contains("South | 3  | 4"));
    }

    #[test]
    fn grid_preview_without_column_labels_renders_bare_rows() {
        let out = render_grid(&sheet(r#"{"data":[[{"value":"a"},{"value":"b"}]]}"#));
        assert_eq!(out, "a | b\n");
    }

    #[test]
    fn empty_sheet_previews_as_nothing() {
        assert_eq!(render_grid(&SpreadsheetSpec::default()), "");
    }
}
