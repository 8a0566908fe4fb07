// Report export engine: section model, election/survey builders, XLSX and CSV output.

pub mod analyzer;
pub mod builder;
pub mod catalog;
pub mod csv;
pub mod export;
pub mod model;
pub mod value;
pub mod xlsx;

pub use analyzer::DocumentAnalyzer;
pub use builder::build_sections;
pub use catalog::LabelCatalog;
pub use export::{ExportArtifact, ExportCoordinator, parse_document};
pub use model::{Section, SectionModel};
