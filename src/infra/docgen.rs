//! Service-order document rendering.
//!
//! A `.docx` file is a ZIP archive whose body lives in `word/document.xml`.
//! Rendering copies the template archive entry-for-entry and rewrites only
//! the body XML: the scalar tags are substituted in place wherever they
//! appear (top-level paragraphs and table cells alike), and the top-level
//! paragraph holding `{{DESCRICAO}}` is replaced by a two-column
//! (id, description) table with one row per line item. A description tag
//! inside an existing table is never spliced.
//!
//! Tags must sit inside a single run; the shipped templates keep each tag
//! unsplit.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use chrono::NaiveDate;
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::config::{TAG_DATE, TAG_DESCRIPTION, TAG_ORDER_NUMBER, TAG_SITE_ID};
use crate::domain::order::format_order_number;
use crate::domain::LineItem;
use crate::errors::{AppError, AppResult};

const DOCUMENT_ENTRY: &str = "word/document.xml";

/// Values substituted into the template.
pub struct OrderDocument<'a> {
    pub number: i32,
    pub issued_on: NaiveDate,
    pub primary_site_id: &'a str,
    pub items: &'a [LineItem],
}

/// Render `template` into `destination` with the order's values.
///
/// Fails with a `Document` error carrying the offending path inline.
pub fn render(template: &Path, destination: &Path, doc: &OrderDocument<'_>) -> AppResult<()> {
    let input = File::open(template)
        .map_err(|e| AppError::document(format!("{}: {}", template.display(), e)))?;
    let mut archive = ZipArchive::new(input)
        .map_err(|e| AppError::document(format!("{}: {}", template.display(), e)))?;

    let output = File::create(destination)
        .map_err(|e| AppError::document(format!("{}: {}", destination.display(), e)))?;
    let mut writer = ZipWriter::new(output);

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| AppError::document(format!("{}: {}", template.display(), e)))?;
        let name = entry.name().to_string();

        if name == DOCUMENT_ENTRY {
            let mut xml = String::new();
            entry
                .read_to_string(&mut xml)
                .map_err(|e| AppError::document(format!("{}: {}", template.display(), e)))?;
            let rewritten = rewrite_document_xml(&xml, doc);

            writer
                .start_file(name, FileOptions::default())
                .map_err(|e| AppError::document(format!("{}: {}", destination.display(), e)))?;
            writer
                .write_all(rewritten.as_bytes())
                .map_err(|e| AppError::document(format!("{}: {}", destination.display(), e)))?;
        } else {
            // Untouched entries are copied without recompression
            writer
                .raw_copy_file(entry)
                .map_err(|e| AppError::document(format!("{}: {}", destination.display(), e)))?;
        }
    }

    writer
        .finish()
        .map_err(|e| AppError::document(format!("{}: {}", destination.display(), e)))?;

    Ok(())
}

/// Substitute the scalar tags and splice the line-item table.
fn rewrite_document_xml(xml: &str, doc: &OrderDocument<'_>) -> String {
    let number = format_order_number(doc.number);
    let date = doc.issued_on.format("%d/%m/%Y").to_string();
    let site_id = if doc.primary_site_id.trim().is_empty() {
        "-"
    } else {
        doc.primary_site_id
    };

    let mut out = xml
        .replace(TAG_ORDER_NUMBER, &escape_xml(&number))
        .replace(TAG_DATE, &escape_xml(&date))
        .replace(TAG_SITE_ID, &escape_xml(site_id));

    if let Some(tag_pos) = description_tag_position(&out) {
        let start = paragraph_start(&out, tag_pos);
        let end = out[tag_pos..]
            .find("</w:p>")
            .map(|offset| tag_pos + offset + "</w:p>".len());

        match (start, end) {
            (Some(start), Some(end)) => {
                let table = items_table_xml(doc.items);
                out.replace_range(start..end, &table);
            }
            _ => {
                // Malformed surroundings: leave the tag as-is rather than
                // corrupt the document
                tracing::warn!("Description tag found outside a well-formed paragraph");
            }
        }
    }

    out
}

/// First `{{DESCRICAO}}` occurrence sitting in a top-level paragraph.
///
/// Occurrences inside a table are skipped: splicing a `<w:tbl>` into a cell
/// would nest tables where the template author expected plain text.
fn description_tag_position(xml: &str) -> Option<usize> {
    let mut search = 0;
    while let Some(found) = xml[search..].find(TAG_DESCRIPTION) {
        let at = search + found;
        if table_depth(xml, at) == 0 {
            return Some(at);
        }
        search = at + TAG_DESCRIPTION.len();
    }
    None
}

/// How many tables are open at `pos`.
fn table_depth(xml: &str, pos: usize) -> usize {
    let head = &xml[..pos];
    let mut depth = 0usize;
    let mut cursor = 0;
    while let Some(found) = head[cursor..].find("<w:tbl") {
        let at = cursor + found;
        // Reject property elements such as <w:tblPr> or <w:tblGrid>
        if matches!(head.as_bytes().get(at + 6), Some(b' ') | Some(b'>')) {
            depth += 1;
        }
        cursor = at + 6;
    }
    let mut cursor = 0;
    while let Some(found) = head[cursor..].find("</w:tbl>") {
        depth = depth.saturating_sub(1);
        cursor = cursor + found + "</w:tbl>".len();
    }
    depth
}

/// Offset of the `<w:p>`/`<w:p ...>` opening closest before `pos`.
fn paragraph_start(xml: &str, pos: usize) -> Option<usize> {
    let head = &xml[..pos];
    let mut best = None;
    let mut cursor = 0;
    while let Some(found) = head[cursor..].find("<w:p") {
        let at = cursor + found;
        // Reject sibling element names such as <w:pPr> or <w:pgMar>
        if matches!(head.as_bytes().get(at + 4), Some(b' ') | Some(b'>')) {
            best = Some(at);
        }
        cursor = at + 4;
    }
    best
}

/// Two-column grid table: header row plus one row per line item.
fn items_table_xml(items: &[LineItem]) -> String {
    let mut rows = String::new();
    rows.push_str(&table_row("ID", "DESCRIÇÃO"));
    for item in items {
        rows.push_str(&table_row(&item.site_id, &item.description));
    }

    format!(
        "<w:tbl><w:tblPr><w:tblStyle w:val=\"TableGrid\"/>\
         <w:tblW w:w=\"0\" w:type=\"auto\"/>\
         <w:tblBorders>\
         <w:top w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>\
         <w:left w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>\
         <w:bottom w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>\
         <w:right w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>\
         <w:insideH w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>\
         <w:insideV w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>\
         </w:tblBorders></w:tblPr>\
         <w:tblGrid><w:gridCol w:w=\"1440\"/><w:gridCol w:w=\"7200\"/></w:tblGrid>\
         {}</w:tbl>",
        rows
    )
}

fn table_row(left: &str, right: &str) -> String {
    format!(
        "<w:tr>{}{}</w:tr>",
        table_cell(left, 1440),
        table_cell(right, 7200)
    )
}

fn table_cell(text: &str, width: u32) -> String {
    format!(
        "<w:tc><w:tcPr><w:tcW w:w=\"{}\" w:type=\"dxa\"/></w:tcPr>\
         <w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p></w:tc>",
        width,
        escape_xml(text)
    )
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
