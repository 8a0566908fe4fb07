use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::request::Language;

/// Errors that abort an export. Missing or mistyped individual fields never
/// end up here; they are defaulted while the report is built.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Malformed input document: {0}")]
    MalformedInput(String),

    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("Render failed: {0:#}")]
    Render(#[source] anyhow::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Classification of errors for logging and caller display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// The request itself was unusable (bad document, unknown format).
    UserError,
    /// The backend failed while writing the output.
    SystemError,
    /// Invalid or unreadable configuration.
    ConfigError,
}

impl ExportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MalformedInput(_) | Self::UnsupportedFormat(_) => ErrorCategory::UserError,
            Self::Render(_) => ErrorCategory::SystemError,
            Self::Config(_) => ErrorCategory::ConfigError,
        }
    }

    /// Returns a message for the caller in the requested language. Render
    /// failures hide backend details.
    pub fn user_message(&self, language: Language) -> String {
        match language {
            Language::En => match self {
                Self::MalformedInput(msg) => format!("The export document could not be read: {msg}"),
                Self::UnsupportedFormat(fmt) => format!("Unsupported export format: {fmt}"),
                Self::Render(_) => "An error occurred during export.".into(),
                Self::Config(msg) => format!("Configuration issue: {msg}"),
            },
            Language::Ar => match self {
                Self::MalformedInput(msg) => format!("تعذرت قراءة مستند التصدير: {msg}"),
                Self::UnsupportedFormat(fmt) => format!("صيغة التصدير غير مدعومة: {fmt}"),
                Self::Render(_) => "حدث خطأ أثناء التصدير.".into(),
                Self::Config(msg) => format!("مشكلة في الإعدادات: {msg}"),
            },
        }
    }
}
