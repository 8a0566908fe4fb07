//! Entry point for one export: document in, bytes + filename + MIME type out.

use chrono::{Local, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tally_core::{ExportConfig, ExportError, ExportFormat, ExportRequest, ReportVariant};
use tracing::{error, info};

use crate::analyzer::DocumentAnalyzer;
use crate::builder::build_sections;
use crate::csv::DelimitedTextRenderer;
use crate::model::SectionModel;
use crate::xlsx::SpreadsheetRenderer;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static UNSAFE_FILENAME_CHAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9\x{0600}-\x{06FF}_.-]").expect("valid regex"));

/// A finished export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: &'static str,
}

/// Runs exports against one configuration. Holds no per-call state.
#[derive(Debug, Clone, Default)]
pub struct ExportCoordinator {
    config: ExportConfig,
}

impl ExportCoordinator {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Parse `raw` as JSON and export it. The root must be an object.
    pub fn export_json(
        &self,
        raw: &[u8],
        request: ExportRequest,
    ) -> Result<ExportArtifact, ExportError> {
        let document = parse_document(raw)?;
        self.export(&document, request)
    }

    /// Export `document`, stamping it with the current local time.
    pub fn export(
        &self,
        document: &Value,
        request: ExportRequest,
    ) -> Result<ExportArtifact, ExportError> {
        self.export_at(document, request, Local::now().naive_local())
    }

    /// Export `document` as of `timestamp`. Same inputs, same bytes.
    pub fn export_at(
        &self,
        document: &Value,
        request: ExportRequest,
        timestamp: NaiveDateTime,
    ) -> Result<ExportArtifact, ExportError> {
        info!(
            variant = %request.variant,
            role = %request.role,
            format = %request.format,
            language = %request.language,
            "export started"
        );

        let model = build_sections(document, request.variant, request.role, request.language);
        let bytes = self
            .render(&model, request.format, timestamp)
            .map_err(|err| {
                error!(error = %format!("{err:#}"), "export render failed");
                ExportError::Render(err)
            })?;

        let title = DocumentAnalyzer::new(document).title(request.variant);
        let filename = export_filename(request, title.as_deref(), timestamp);
        info!(filename = %filename, bytes = bytes.len(), "export finished");

        Ok(ExportArtifact {
            bytes,
            filename,
            content_type: request.format.content_type(),
        })
    }

    fn render(
        &self,
        model: &SectionModel,
        format: ExportFormat,
        timestamp: NaiveDateTime,
    ) -> anyhow::Result<Vec<u8>> {
        match format {
            ExportFormat::Spreadsheet => {
                SpreadsheetRenderer::new(&self.config.style, self.config.windowed_row_threshold)
                    .render(model, timestamp)
            }
            ExportFormat::DelimitedText => {
                DelimitedTextRenderer::new(self.config.delimiter_byte()).render(model)
            }
        }
    }
}

/// Parse raw bytes into a document with an object root.
pub fn parse_document(raw: &[u8]) -> Result<Value, ExportError> {
    let document: Value = serde_json::from_slice(raw)
        .map_err(|err| ExportError::MalformedInput(err.to_string()))?;
    if !document.is_object() {
        return Err(ExportError::MalformedInput(
            "document root must be a JSON object".into(),
        ));
    }
    Ok(document)
}

/// `{role}_{title}_{yyyyMMdd_HHmmss}.{ext}` with the title made filesystem-safe.
pub fn export_filename(
    request: ExportRequest,
    title: Option<&str>,
    timestamp: NaiveDateTime,
) -> String {
    let title = match title {
        Some(title) => sanitize_title(title),
        None => default_title(request.variant).to_string(),
    };
    format!(
        "{}_{}_{}.{}",
        request.role,
        title,
        timestamp.format("%Y%m%d_%H%M%S"),
        request.format.extension()
    )
}

/// Whitespace runs become `_`, then anything outside ASCII letters and
/// digits, the Arabic block, `_`, `.` and `-` becomes `_`.
pub fn sanitize_title(title: &str) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(title, "_");
    UNSAFE_FILENAME_CHAR.replace_all(&collapsed, "_").into_owned()
}

fn default_title(variant: ReportVariant) -> &'static str {
    match variant {
        ReportVariant::Election => "unnamed_election",
        ReportVariant::Survey => "export",
    }
}
