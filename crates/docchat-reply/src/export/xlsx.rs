//! Spreadsheet export: [`SpreadsheetSpec`] → `.xlsx`.
//!
//! One worksheet: the column labels as the header row, then the data rows.
//! Text lands as inline strings (no shared-string table), numbers as native
//! numeric cells.  Row labels are preview-only and, like the original
//! exporter, never written into the workbook.
//!
//! [`read_grid`] parses a workbook written by [`write_workbook`] back into
//! rows of display strings; it understands exactly the subset this writer
//! emits and exists so the export→reload round trip can be asserted.

use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::xml::{escape, unescape};
use super::ExportError;
use crate::artifact::SpreadsheetSpec;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#;

/// Write `spec` as a single-sheet workbook to `writer`.
pub fn write_workbook<W: Write + Seek>(
    spec: &SpreadsheetSpec,
    writer: W,
) -> Result<(), ExportError> {
    if spec.column_labels.is_empty() && spec.data.is_empty() {
        return Err(ExportError::Empty("spreadsheet has no columns and no data"));
    }

    let options =
        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(writer);

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(CONTENT_TYPES.as_bytes())?;
    zip.start_file("_rels/.rels", options)?;
    zip.write_all(ROOT_RELS.as_bytes())?;
    zip.start_file("xl/workbook.xml", options)?;
    zip.write_all(WORKBOOK.as_bytes())?;
    zip.start_file("xl/_rels/workbook.xml.rels", options)?;
    zip.write_all(WORKBOOK_RELS.as_bytes())?;

    zip.start_file("xl/worksheets/sheet1.xml", options)?;
    zip.write_all(sheet_xml(spec).as_bytes())?;

    zip.finish()?;
    Ok(())
}

/// Convenience wrapper writing to a filesystem path.
pub fn save_workbook(spec: &SpreadsheetSpec, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let file = File::create(path)?;
    write_workbook(spec, file)
}

fn sheet_xml(spec: &SpreadsheetSpec) -> String {
    let mut rows = String::new();
    let mut row_ix = 1usize;

    if !spec.column_labels.is_empty() {
        rows.push_str(&format!("<row r=\"{row_ix}\">"));
        for (col_ix, label) in spec.column_labels.iter().enumerate() {
            rows.push_str(&text_cell(col_ix, row_ix, label));
        }
        rows.push_str("</row>");
        row_ix += 1;
    }

    for data_row in &spec.data {
        rows.push_str(&format!("<row r=\"{row_ix}\">"));
        for (col_ix, cell) in data_row.iter().enumerate() {
            match cell.as_number() {
                Some(n) => rows.push_str(&format!(
                    "<c r=\"{}\"><v>{n}</v></c>",
                    cell_ref(col_ix, row_ix)
                )),
                None => rows.push_str(&text_cell(col_ix, row_ix, &cell.display())),
            }
        }
        rows.push_str("</row>");
        row_ix += 1;
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <worksheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\">\
         <sheetData>{rows}</sheetData></worksheet>"
    )
}

fn text_cell(col_ix: usize, row_ix: usize, text: &str) -> String {
    format!(
        "<c r=\"{}\" t=\"inlineStr\"><is><t xml:space=\"preserve\">{}</t></is></c>",
        cell_ref(col_ix, row_ix),
        escape(text)
    )
}

/// `A1`-style reference for a zero-based column and one-based row.
fn cell_ref(col_ix: usize, row_ix: usize) -> String {
    format!("{}{row_ix}", col_name(col_ix))
}

fn col_name(mut ix: usize) -> String {
    let mut name = String::new();
    loop {
        name.insert(0, (b'A' + (ix % 26) as u8) as char);
        if ix < 26 {
            break;
        }
        ix = ix / 26 - 1;
    }
    name
}

/// Read back the cell grid of a workbook produced by [`write_workbook`].
///
/// Numbers come back via their `<v>` text, inline strings via `<t>`; the
/// result is rows of display strings in sheet order.
pub fn read_grid<R: Read + Seek>(reader: R) -> Result<Vec<Vec<String>>, ExportError> {
    let mut archive = ZipArchive::new(reader)?;
    let mut sheet = String::new();
    archive
        .by_name("xl/worksheets/sheet1.xml")?
        .read_to_string(&mut sheet)?;

    let mut grid = Vec::new();
    for row_chunk in sheet.split("<row ").skip(1) {
        let row_body = match row_chunk.find("</row>") {
            Some(end) => &row_chunk[..end],
            None => return Err(ExportError::MalformedPart("unterminated row element")),
        };
        let mut row = Vec::new();
        for cell_chunk in row_body.split("<c ").skip(1) {
            let value = if let Some(text) = between(cell_chunk, "<t xml:space=\"preserve\">", "</t>")
            {
                unescape(text)
            } else if let Some(num) = between(cell_chunk, "<v>", "</v>") {
                num.to_owned()
            } else {
                String::new()
            };
            row.push(value);
        }
        grid.push(row);
    }
    Ok(grid)
}

fn between<'a>(text: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let start = text.find(open)? + open.len();
    let end = text[start..].find(close)? + start;
    Some(&text[start..end])
}
