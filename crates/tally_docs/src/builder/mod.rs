//! Builds the [`SectionModel`] for one export.
//!
//! Role gating happens here and only here; renderers draw whatever sections
//! and columns the model contains.

pub mod election;
pub mod survey;

use serde_json::Value;
use tally_core::{Language, ReportVariant, Role};
use tracing::debug;

use crate::analyzer::DocumentAnalyzer;
use crate::catalog::LabelCatalog;
use crate::model::SectionModel;

/// Build the section model for `document` as seen by `role`, in `language`.
pub fn build_sections(
    document: &Value,
    variant: ReportVariant,
    role: Role,
    language: Language,
) -> SectionModel {
    let analyzer = DocumentAnalyzer::new(document);
    let catalog = LabelCatalog::new(variant, language);
    let model = match variant {
        ReportVariant::Election => election::build(&analyzer, role, &catalog),
        ReportVariant::Survey => survey::build(&analyzer, role, &catalog),
    };
    debug!(
        %variant,
        %role,
        %language,
        sections = model.sections.len(),
        lines = model.total_lines(),
        "built section model"
    );
    model
}

/// Owned cells from labels or values.
pub(crate) fn row<I, S>(cells: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    cells.into_iter().map(Into::into).collect()
}
