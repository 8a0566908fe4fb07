pub mod config;
pub mod error_handler;
pub mod logging;
pub mod request;

pub use config::{ExportConfig, HexColor, StyleConfig};
pub use error_handler::{ErrorCategory, ExportError};
pub use request::{ExportFormat, ExportRequest, Language, ReportVariant, Role};
