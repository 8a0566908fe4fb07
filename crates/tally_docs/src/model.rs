//! Renderer-agnostic section model.
//!
//! A report is an ordered list of sections. Each section renders as a title
//! line, a header line, its data lines, and a blank separator. The header
//! fixes the section's column count and every data row is fitted to it.

use serde::Serialize;
use tracing::warn;

pub type Row = Vec<String>;

/// What a rendered line represents, so renderers can style it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Section title; merged across `span` columns when `span > 1`.
    Title { span: usize },
    Header,
    Data,
}

/// One line of a section as handed to a renderer.
#[derive(Debug, Clone, Copy)]
pub struct Line<'a> {
    pub kind: LineKind,
    pub cells: &'a [String],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub title: String,
    pub columns: Row,
    pub rows: Vec<Row>,
    /// Columns the title cell spans. Always at least 1.
    pub title_span: usize,
}

impl Section {
    /// New section whose title spans every column.
    pub fn new(title: impl Into<String>, columns: Row) -> Self {
        let title_span = columns.len().max(1);
        Self {
            title: title.into(),
            columns,
            rows: Vec::new(),
            title_span,
        }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Append a data row, padding with empty cells or truncating so it
    /// matches the header width.
    pub fn push_row(&mut self, mut row: Row) {
        let width = self.column_count();
        if row.len() != width {
            warn!(
                section = %self.title,
                expected = width,
                actual = row.len(),
                "row width does not match header; fitting"
            );
            row.resize(width, String::new());
        }
        self.rows.push(row);
    }

    /// Title, header and data lines in render order.
    pub fn lines(&self) -> impl Iterator<Item = Line<'_>> {
        let title = Line {
            kind: LineKind::Title {
                span: self.title_span,
            },
            cells: std::slice::from_ref(&self.title),
        };
        let header = Line {
            kind: LineKind::Header,
            cells: &self.columns,
        };
        [title, header].into_iter().chain(self.rows.iter().map(|row| Line {
            kind: LineKind::Data,
            cells: row,
        }))
    }

    /// Number of non-blank lines this section renders to.
    pub fn line_count(&self) -> usize {
        2 + self.rows.len()
    }
}

/// A complete report ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionModel {
    pub sheet_name: String,
    pub right_to_left: bool,
    pub sections: Vec<Section>,
}

impl SectionModel {
    pub fn new(sheet_name: impl Into<String>, right_to_left: bool) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            right_to_left,
            sections: Vec::new(),
        }
    }

    pub fn push(&mut self, section: Section) {
        self.sections.push(section);
    }

    /// Total rendered lines including one blank separator per section.
    pub fn total_lines(&self) -> usize {
        self.sections.iter().map(|s| s.line_count() + 1).sum()
    }

    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }

    /// The widest section, in columns.
    pub fn max_columns(&self) -> usize {
        self.sections
            .iter()
            .map(|s| s.column_count().max(1))
            .max()
            .unwrap_or(0)
    }
}
