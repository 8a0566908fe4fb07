use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDateTime, Timelike};
use rust_xlsxwriter::{
    Color, DocProperties, ExcelDateTime, Format, FormatAlign, FormatBorder, Workbook, Worksheet,
};
use tally_core::StyleConfig;
use tracing::debug;
use unicode_width::UnicodeWidthStr;

use crate::model::{LineKind, SectionModel};

/// Excel's hard column-width ceiling, in characters.
const MAX_COLUMN_WIDTH: f64 = 255.0;
/// Font size the default column width unit is measured against.
const BASE_FONT_SIZE: f64 = 11.0;

/// Writes a [`SectionModel`] as a single-sheet XLSX workbook.
#[derive(Debug, Clone, Copy)]
pub struct SpreadsheetRenderer<'a> {
    style: &'a StyleConfig,
    windowed_row_threshold: usize,
}

/// Cell formats for one render, built from the style config.
struct Formats {
    title: Format,
    header: Format,
    data: Format,
}

impl Formats {
    fn new(style: &StyleConfig) -> Self {
        let border = Color::RGB(style.border_color.rgb());
        let title = Format::new()
            .set_bold()
            .set_font_size(style.font_size)
            .set_font_color(Color::RGB(style.title_font_color.rgb()))
            .set_background_color(Color::RGB(style.title_fill.rgb()))
            .set_align(FormatAlign::Center)
            .set_border(FormatBorder::Thin)
            .set_border_color(border);
        let header = Format::new()
            .set_bold()
            .set_font_size(style.font_size)
            .set_font_color(Color::RGB(style.header_font_color.rgb()))
            .set_background_color(Color::RGB(style.header_fill.rgb()))
            .set_align(FormatAlign::Center)
            .set_border(FormatBorder::Thin)
            .set_border_color(border);
        let data = Format::new()
            .set_font_size(style.font_size)
            .set_font_color(Color::RGB(style.data_font_color.rgb()))
            .set_background_color(Color::RGB(style.data_fill.rgb()))
            .set_align(FormatAlign::Left)
            .set_border(FormatBorder::Thin)
            .set_border_color(border);
        Self { title, header, data }
    }
}

impl<'a> SpreadsheetRenderer<'a> {
    pub fn new(style: &'a StyleConfig, windowed_row_threshold: usize) -> Self {
        Self {
            style,
            windowed_row_threshold,
        }
    }

    /// Render `model` to XLSX bytes. `created` is stamped into the document
    /// properties so output depends only on its inputs.
    pub fn render(&self, model: &SectionModel, created: NaiveDateTime) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let properties = DocProperties::new().set_creation_datetime(&excel_datetime(created)?);
        workbook.set_properties(&properties);

        let formats = Formats::new(self.style);
        let windowed = model.total_lines() > self.windowed_row_threshold;
        debug!(
            lines = model.total_lines(),
            windowed, "rendering spreadsheet"
        );
        let worksheet = if windowed {
            workbook.add_worksheet_with_constant_memory()
        } else {
            workbook.add_worksheet()
        };
        worksheet
            .set_name(&model.sheet_name)
            .with_context(|| format!("Failed to set sheet name: {}", model.sheet_name))?;
        worksheet.set_right_to_left(model.right_to_left);

        write_sections(worksheet, model, &formats)?;

        for (col, width) in column_widths(model, self.style.font_size).into_iter().enumerate() {
            worksheet
                .set_column_width(col as u16, width)
                .with_context(|| format!("Failed to set width of column {col}"))?;
        }

        let bytes = workbook
            .save_to_buffer()
            .context("Failed to save workbook to buffer")?;

        Ok(bytes)
    }
}

fn write_sections(worksheet: &mut Worksheet, model: &SectionModel, formats: &Formats) -> Result<()> {
    let mut excel_row: u32 = 0;
    for section in &model.sections {
        for line in section.lines() {
            match line.kind {
                LineKind::Title { span } if span > 1 => {
                    worksheet
                        .merge_range(
                            excel_row,
                            0,
                            excel_row,
                            (span - 1) as u16,
                            &section.title,
                            &formats.title,
                        )
                        .with_context(|| format!("Failed to merge title at row {excel_row}"))?;
                }
                kind => {
                    let format = match kind {
                        LineKind::Title { .. } => &formats.title,
                        LineKind::Header => &formats.header,
                        LineKind::Data => &formats.data,
                    };
                    for (col_idx, cell) in line.cells.iter().enumerate() {
                        worksheet
                            .write_string_with_format(excel_row, col_idx as u16, cell, format)
                            .with_context(|| {
                                format!("Failed to write cell at ({excel_row}, {col_idx})")
                            })?;
                    }
                }
            }
            excel_row += 1;
        }
        // Blank separator.
        excel_row += 1;
    }
    Ok(())
}

/// Column widths in Excel character units, sized to the widest header or
/// data cell in each column. Merged titles do not widen their columns.
pub fn column_widths(model: &SectionModel, font_size: f64) -> Vec<f64> {
    let mut widest = vec![0usize; model.max_columns()];
    for section in &model.sections {
        for line in section.lines() {
            match line.kind {
                LineKind::Title { span } if span > 1 => continue,
                _ => {}
            }
            for (col, cell) in line.cells.iter().enumerate() {
                let width = cell
                    .lines()
                    .map(UnicodeWidthStr::width)
                    .max()
                    .unwrap_or(0);
                if let Some(slot) = widest.get_mut(col) {
                    *slot = (*slot).max(width);
                }
            }
        }
    }
    let scale = font_size / BASE_FONT_SIZE;
    widest
        .into_iter()
        .map(|chars| (chars as f64 * scale + 2.0).min(MAX_COLUMN_WIDTH))
        .collect()
}

fn excel_datetime(timestamp: NaiveDateTime) -> Result<ExcelDateTime> {
    let date = ExcelDateTime::from_ymd(
        timestamp.year().try_into().context("Export year out of range")?,
        timestamp.month().try_into().context("Export month out of range")?,
        timestamp.day().try_into().context("Export day out of range")?,
    )
    .context("Invalid export date")?;
    date.and_hms(
        timestamp.hour().try_into().context("Export hour out of range")?,
        timestamp.minute().try_into().context("Export minute out of range")?,
        f64::from(timestamp.second()),
    )
    .context("Invalid export time")
}
