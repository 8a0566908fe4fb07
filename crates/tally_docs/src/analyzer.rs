//! Shape probing and typed, defaulted views over a source document.
//!
//! All report fields live under the top-level `data` object. Nothing here
//! fails: absent or mistyped fields fall back to defaults and are logged at
//! debug level.

use serde_json::{Map, Value};
use tally_core::ReportVariant;
use tracing::debug;

use crate::value::{float_or, int_or, text_or};

/// Optional main-data columns, in the order they appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionalColumn {
    StartDate,
    EndDate,
    EndTime,
}

impl OptionalColumn {
    pub fn key(self) -> &'static str {
        match self {
            Self::StartDate => "startDate",
            Self::EndDate => "endDate",
            Self::EndTime => "endTime",
        }
    }

    /// Candidates for each variant, in column order.
    fn candidates(variant: ReportVariant) -> &'static [OptionalColumn] {
        match variant {
            ReportVariant::Election => &[Self::StartDate, Self::EndDate],
            ReportVariant::Survey => &[Self::EndDate, Self::EndTime],
        }
    }
}

/// Ordered category counts, e.g. `{male: 3, female: 1}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Distribution {
    entries: Vec<(String, u64)>,
}

impl Distribution {
    pub fn from_entries(entries: Vec<(String, u64)>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Sum of all counts. Widened so any number of `u64` counts fits.
    pub fn total(&self) -> u128 {
        self.entries.iter().map(|(_, count)| u128::from(*count)).sum()
    }

    /// `(category, percentage)` pairs in source order. Every percentage is
    /// `0.0` when the total is zero.
    pub fn percentages(&self) -> Vec<(&str, f64)> {
        let total = self.total();
        self.entries
            .iter()
            .map(|(category, count)| {
                let pct = if total == 0 {
                    0.0
                } else {
                    *count as f64 / total as f64 * 100.0
                };
                (category.as_str(), pct)
            })
            .collect()
    }
}

/// One candidate line of an election result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsSummaryEntry {
    pub candidate_name: String,
    pub vote_count: i64,
    /// `None` when the source carries no usable voter list.
    pub voters: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Insights {
    pub total_candidates: i64,
    pub all_voters_count: i64,
    pub completion_rate: f64,
    pub submitted_votes_count: i64,
}

/// Answer-shape classification of a survey question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// One free-form answer.
    Text,
    /// A list of answers, each with a share of responses.
    MultiAnswer,
    Unknown,
}

impl TypeTag {
    const TEXT_TAGS: [&'static str; 6] = [
        "TEXT_SINGLE_LINE",
        "TEXT_MULTI_LINE",
        "TEXT_URL",
        "TEXT_NUMBER",
        "TEXT_DATE",
        "TEXT_DATETIME",
    ];
    const MULTI_ANSWER_TAGS: [&'static str; 5] = [
        "RANKING",
        "MULTI_SELECTION",
        "MULTI_CHOICE",
        "RATING_RANGE",
        "RATING_STARS",
    ];

    /// Classify a raw tag. Matching is exact; anything unrecognized is
    /// `Unknown`.
    pub fn classify(tag: &str) -> Self {
        if Self::TEXT_TAGS.iter().any(|t| *t == tag) {
            Self::Text
        } else if Self::MULTI_ANSWER_TAGS.iter().any(|t| *t == tag) {
            Self::MultiAnswer
        } else {
            Self::Unknown
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub name: String,
    pub percentage: f64,
    pub voter_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestionResult {
    pub number: String,
    pub title: String,
    /// The tag as it appeared in the source.
    pub raw_type: String,
    pub kind: TypeTag,
    pub single_answer: String,
    pub voter_name: String,
    pub answers: Vec<Answer>,
}

/// Read-only view over one source document.
#[derive(Debug, Clone, Copy)]
pub struct DocumentAnalyzer<'a> {
    data: Option<&'a Map<String, Value>>,
}

impl<'a> DocumentAnalyzer<'a> {
    pub fn new(document: &'a Value) -> Self {
        let data = document.get("data").and_then(Value::as_object);
        if data.is_none() {
            debug!("document has no `data` object; every field will default");
        }
        Self { data }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.data.and_then(|d| d.get(key))
    }

    /// Whether `key` exists under `data`, whatever its value.
    pub fn has(&self, key: &str) -> bool {
        self.data.is_some_and(|d| d.contains_key(key))
    }

    /// Guess the report layout from the fields present.
    pub fn detect_variant(&self) -> ReportVariant {
        let election_like = self.has("electionName") || self.has("resultsSummary");
        let survey_like = self.has("questionResults") || self.has("voteTitle");
        if survey_like && !election_like {
            ReportVariant::Survey
        } else {
            ReportVariant::Election
        }
    }

    /// Optional columns present in this document, in column order. Presence
    /// is by key, so `""` and `null` still count.
    pub fn optional_columns(&self, variant: ReportVariant) -> Vec<OptionalColumn> {
        OptionalColumn::candidates(variant)
            .iter()
            .copied()
            .filter(|col| self.has(col.key()))
            .collect()
    }

    /// Election main-data value: `"N/A"` when absent, empty when null.
    pub fn field_text(&self, key: &str) -> String {
        match self.get(key) {
            None => "N/A".to_string(),
            value => text_or(value, ""),
        }
    }

    /// Survey main-data value: empty when absent or null.
    pub fn plain_text(&self, key: &str) -> String {
        text_or(self.get(key), "")
    }

    /// Report title used for filenames, if the document names itself.
    pub fn title(&self, variant: ReportVariant) -> Option<String> {
        let key = match variant {
            ReportVariant::Election => "electionName",
            ReportVariant::Survey => "voteTitle",
        };
        match self.get(key) {
            None | Some(Value::Null) => None,
            value => Some(text_or(value, "")),
        }
    }

    /// `data.analytics.<key>` as an ordered distribution. Negative counts
    /// clamp to zero.
    pub fn distribution(&self, key: &str) -> Distribution {
        let Some(object) = self
            .get("analytics")
            .and_then(|a| a.get(key))
            .and_then(Value::as_object)
        else {
            debug!(distribution = key, "distribution absent");
            return Distribution::default();
        };
        let entries = object
            .iter()
            .map(|(category, count)| {
                let count = int_or(Some(count), 0).max(0) as u64;
                (category.clone(), count)
            })
            .collect();
        Distribution::from_entries(entries)
    }

    pub fn results_summary(&self) -> Vec<ResultsSummaryEntry> {
        let Some(items) = self.get("resultsSummary").and_then(Value::as_array) else {
            debug!("resultsSummary absent or not an array");
            return Vec::new();
        };
        items
            .iter()
            .map(|candidate| ResultsSummaryEntry {
                candidate_name: text_or(candidate.get("candidateName"), "N/A"),
                vote_count: int_or(candidate.get("numberOfVoters"), 0),
                voters: candidate
                    .get("voters")
                    .and_then(Value::as_array)
                    .filter(|list| !list.is_empty())
                    .map(|list| list.iter().map(|v| text_or(Some(v), "")).collect()),
            })
            .collect()
    }

    /// `Some` whenever the `insights` key exists, even if every value is
    /// missing.
    pub fn insights(&self) -> Option<Insights> {
        if !self.has("insights") {
            return None;
        }
        let node = self.get("insights");
        let field = |key: &str| node.and_then(|n| n.get(key));
        Some(Insights {
            total_candidates: int_or(field("totalCandidates"), 0),
            all_voters_count: int_or(field("allVotersCount"), 0),
            completion_rate: float_or(field("completionRate"), 0.0),
            submitted_votes_count: int_or(field("submittedVotesCount"), 0),
        })
    }

    pub fn question_results(&self) -> Vec<QuestionResult> {
        let Some(items) = self.get("questionResults").and_then(Value::as_array) else {
            debug!("questionResults absent or not an array");
            return Vec::new();
        };
        items.iter().map(read_question).collect()
    }
}

fn read_question(question: &Value) -> QuestionResult {
    let raw_type = text_or(question.get("type"), "");
    let answers = question
        .get("answers")
        .and_then(Value::as_array)
        .map(|answers| {
            answers
                .iter()
                .map(|answer| Answer {
                    name: text_or(answer.get("name"), ""),
                    percentage: float_or(answer.get("answerPercentage"), 0.0),
                    voter_name: text_or(answer.get("voterName"), ""),
                })
                .collect()
        })
        .unwrap_or_default();

    QuestionResult {
        number: text_or(question.get("questionNumber"), ""),
        title: text_or(question.get("title"), ""),
        kind: TypeTag::classify(&raw_type),
        raw_type,
        single_answer: text_or(question.get("singleAnswer"), ""),
        voter_name: text_or(question.get("voterName"), ""),
        answers,
    }
}
