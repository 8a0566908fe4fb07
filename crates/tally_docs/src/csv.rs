use anyhow::{Context, Result};
use tracing::debug;

use crate::model::SectionModel;

/// Byte-order mark so spreadsheet tools open the file as UTF-8.
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Rows of one section as read back from an export, title line first.
pub type ParsedSection = Vec<Vec<String>>;

/// Writes a [`SectionModel`] as delimited text, one record per line and a
/// blank line after every section.
#[derive(Debug, Clone, Copy)]
pub struct DelimitedTextRenderer {
    delimiter: u8,
}

impl Default for DelimitedTextRenderer {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl DelimitedTextRenderer {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    pub fn render(&self, model: &SectionModel) -> Result<Vec<u8>> {
        let mut out = UTF8_BOM.to_vec();
        for section in &model.sections {
            let mut writer = csv::WriterBuilder::new()
                .delimiter(self.delimiter)
                .flexible(true)
                .quote_style(csv::QuoteStyle::Necessary)
                .terminator(csv::Terminator::Any(b'\n'))
                .from_writer(&mut out);

            for line in section.lines() {
                writer
                    .write_record(line.cells)
                    .with_context(|| format!("Failed to write record in section {}", section.title))?;
            }
            writer.flush().context("Failed to flush CSV writer")?;
            drop(writer);

            // A bare newline; the writer would quote an empty record.
            out.push(b'\n');
        }
        debug!(bytes = out.len(), sections = model.sections.len(), "rendered delimited text");
        Ok(out)
    }
}

/// Read an export back into its sections. The BOM is optional.
pub fn parse_sections(input: &[u8], delimiter: u8) -> Result<Vec<ParsedSection>> {
    let body = input.strip_prefix(&UTF8_BOM).unwrap_or(input);

    let mut sections = Vec::new();
    for chunk in split_on_blank_lines(body) {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(chunk);

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.context("Failed to read CSV record")?;
            rows.push(record.iter().map(String::from).collect());
        }
        sections.push(rows);
    }
    Ok(sections)
}

/// Split at empty lines that sit outside quoted fields.
fn split_on_blank_lines(body: &[u8]) -> Vec<&[u8]> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut line_start = 0;
    let mut in_quotes = false;

    for (i, &byte) in body.iter().enumerate() {
        match byte {
            b'"' => in_quotes = !in_quotes,
            b'\n' if !in_quotes => {
                if i == line_start {
                    if i > start {
                        chunks.push(&body[start..i]);
                    }
                    start = i + 1;
                }
                line_start = i + 1;
            }
            _ => {}
        }
    }
    if start < body.len() {
        chunks.push(&body[start..]);
    }
    chunks
}
