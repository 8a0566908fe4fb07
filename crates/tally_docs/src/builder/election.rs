//! Election report: main data, distributions, results summary, insights.

use tally_core::{ReportVariant, Role};

use super::row;
use crate::analyzer::{DocumentAnalyzer, Insights, ResultsSummaryEntry};
use crate::catalog::{LabelCatalog, election as keys};
use crate::model::{Section, SectionModel};

/// Distribution sections in render order: (title key, `analytics` field).
const DISTRIBUTIONS: [(&str, &str); 2] = [
    (keys::GENDER_DIST, "candidateGender"),
    (keys::AGE_DIST, "candidateAgeRange"),
];

pub fn build(analyzer: &DocumentAnalyzer<'_>, role: Role, catalog: &LabelCatalog) -> SectionModel {
    let mut model = SectionModel::new(
        catalog.text(keys::MAIN_DATA),
        catalog.language().is_right_to_left(),
    );

    model.push(main_data(analyzer, role, catalog));

    if role.is_creator() {
        for (title_key, field) in DISTRIBUTIONS {
            if let Some(section) = distribution(analyzer, title_key, field, catalog) {
                model.push(section);
            }
        }
    }

    model.push(results_summary(&analyzer.results_summary(), role, catalog));

    if role.is_creator() {
        if let Some(insights) = analyzer.insights() {
            model.push(insights_section(&insights, catalog));
        }
    }

    model
}

fn main_data(analyzer: &DocumentAnalyzer<'_>, role: Role, catalog: &LabelCatalog) -> Section {
    let mut fields = vec![keys::ELECTION_ID, keys::ELECTION_NAME, keys::ELECTION_DESCRIPTION];
    fields.extend(
        analyzer
            .optional_columns(ReportVariant::Election)
            .into_iter()
            .map(|col| col.key()),
    );
    fields.push(keys::EXPORT_TYPE);

    let mut section = Section::new(
        catalog.text(keys::MAIN_DATA),
        row(fields.iter().map(|key| catalog.label(key))),
    );
    let export_type = match role {
        Role::Creator => catalog.text(keys::CREATOR),
        Role::Viewer => catalog.text(keys::VOTER),
    };
    section.push_row(
        fields
            .iter()
            .map(|key| {
                if *key == keys::EXPORT_TYPE {
                    export_type.clone()
                } else {
                    analyzer.field_text(key)
                }
            })
            .collect(),
    );
    section
}

fn distribution(
    analyzer: &DocumentAnalyzer<'_>,
    title_key: &str,
    field: &str,
    catalog: &LabelCatalog,
) -> Option<Section> {
    let dist = analyzer.distribution(field);
    if dist.is_empty() {
        return None;
    }
    let mut section = Section::new(
        catalog.text(title_key),
        row([catalog.label(keys::CATEGORY), catalog.label(keys::PERCENTAGE)]),
    );
    for (category, pct) in dist.percentages() {
        section.push_row(vec![category.to_string(), format_percent(pct)]);
    }
    Some(section)
}

fn results_summary(entries: &[ResultsSummaryEntry], role: Role, catalog: &LabelCatalog) -> Section {
    let mut columns = vec![keys::CANDIDATE_NAME, keys::NUMBER_OF_VOTERS];
    if role.is_creator() {
        columns.push(keys::VOTERS);
    }
    let mut section = Section::new(
        catalog.text(keys::RESULTS_SUMMARY),
        row(columns.iter().map(|key| catalog.label(key))),
    );

    for entry in entries {
        let mut cells = vec![entry.candidate_name.clone(), entry.vote_count.to_string()];
        if role.is_creator() {
            cells.push(match &entry.voters {
                Some(voters) => voters.join(", "),
                None => catalog.text(keys::NOT_AVAILABLE),
            });
        }
        section.push_row(cells);
    }
    section
}

fn insights_section(insights: &Insights, catalog: &LabelCatalog) -> Section {
    let mut section = Section::new(
        catalog.text(keys::INSIGHTS),
        row([
            catalog.label(keys::TOTAL_CANDIDATES),
            catalog.label(keys::ALL_VOTERS_COUNT),
            catalog.label(keys::COMPLETION_RATE),
            catalog.label(keys::SUBMITTED_VOTES_COUNT),
        ]),
    );
    section.push_row(vec![
        insights.total_candidates.to_string(),
        insights.all_voters_count.to_string(),
        format_percent(insights.completion_rate),
        insights.submitted_votes_count.to_string(),
    ]);
    section
}

/// Two decimals and a percent sign: `75.00%`.
pub fn format_percent(value: f64) -> String {
    format!("{value:.2}%")
}
