//! Survey report: creator-only main data, then question results.

use tally_core::{ReportVariant, Role};

use super::row;
use crate::analyzer::{DocumentAnalyzer, OptionalColumn, QuestionResult, TypeTag};
use crate::catalog::{LabelCatalog, survey as keys};
use crate::model::{Section, SectionModel};
use crate::value::plain_float;

pub fn build(analyzer: &DocumentAnalyzer<'_>, role: Role, catalog: &LabelCatalog) -> SectionModel {
    let sheet_key = match role {
        Role::Creator => keys::SHEET_CREATOR,
        Role::Viewer => keys::SHEET_VIEWER,
    };
    let mut model = SectionModel::new(catalog.text(sheet_key), catalog.language().is_right_to_left());

    if role.is_creator() {
        model.push(main_data(analyzer, catalog));
    }
    model.push(question_results(&analyzer.question_results(), role, catalog));
    model
}

fn main_data(analyzer: &DocumentAnalyzer<'_>, catalog: &LabelCatalog) -> Section {
    let present = analyzer.optional_columns(ReportVariant::Survey);
    let fields: Vec<&str> = keys::MAIN_DATA_FIELDS
        .into_iter()
        .filter(|key| match *key {
            "endDate" => present.contains(&OptionalColumn::EndDate),
            "endTime" => present.contains(&OptionalColumn::EndTime),
            _ => true,
        })
        .collect();

    let mut section = Section::new(
        catalog.text(keys::MAIN_DATA),
        row(fields.iter().map(|key| catalog.label(key))),
    );
    section.push_row(fields.iter().map(|key| analyzer.plain_text(key)).collect());
    section
}

fn question_results(questions: &[QuestionResult], role: Role, catalog: &LabelCatalog) -> Section {
    let mut columns = vec![
        keys::QUESTION_NUMBER,
        keys::QUESTION_TITLE,
        keys::QUESTION_TYPE,
        keys::ANSWER_NAME,
        keys::ANSWER_PERCENTAGE,
    ];
    let with_voter = role.is_creator();
    if with_voter {
        columns.push(keys::VOTER_NAME);
    }
    let mut section = Section::new(
        catalog.text(keys::QUESTION_RESULTS),
        row(columns.iter().map(|key| catalog.label(key))),
    );

    for question in questions {
        let lead = [
            question.number.clone(),
            question.title.clone(),
            question.raw_type.clone(),
        ];
        let mut push = |answer: String, percentage: String, voter: &str| {
            let mut cells = lead.to_vec();
            cells.push(answer);
            cells.push(percentage);
            if with_voter {
                cells.push(voter.to_string());
            }
            section.push_row(cells);
        };

        match question.kind {
            TypeTag::Text => push(question.single_answer.clone(), String::new(), &question.voter_name),
            TypeTag::MultiAnswer if question.answers.is_empty() => {
                push(String::new(), String::new(), "")
            }
            TypeTag::MultiAnswer => {
                for answer in &question.answers {
                    push(
                        answer.name.clone(),
                        format!("{}%", plain_float(answer.percentage)),
                        &answer.voter_name,
                    );
                }
            }
            TypeTag::Unknown => push(catalog.text(keys::UNKNOWN_QUESTION_TYPE), String::new(), ""),
        }
    }
    section
}
