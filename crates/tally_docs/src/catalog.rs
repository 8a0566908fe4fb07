//! Display strings for report sections, columns and placeholders.
//!
//! Election and survey reports keep separate tables: their key sets barely
//! overlap and share no meaning where they do (`creator` is a role label in
//! one and a field in the other).

use tally_core::{Language, ReportVariant};

/// Semantic keys used by the election report.
pub mod election {
    pub const MAIN_DATA: &str = "MAIN_DATA";
    pub const GENDER_DIST: &str = "GENDER_DIST";
    pub const AGE_DIST: &str = "AGE_DIST";
    pub const RESULTS_SUMMARY: &str = "RESULTS_SUMMARY";
    pub const INSIGHTS: &str = "INSIGHTS";

    pub const ELECTION_ID: &str = "electionId";
    pub const ELECTION_NAME: &str = "electionName";
    pub const ELECTION_DESCRIPTION: &str = "electionDescription";
    pub const START_DATE: &str = "startDate";
    pub const END_DATE: &str = "endDate";
    pub const EXPORT_TYPE: &str = "exportType";
    pub const CREATOR: &str = "creator";
    pub const VOTER: &str = "voter";
    pub const CANDIDATE_NAME: &str = "candidateName";
    pub const NUMBER_OF_VOTERS: &str = "numberOfVoters";
    pub const VOTERS: &str = "voters";
    pub const PERCENTAGE: &str = "percentage";
    pub const NOT_AVAILABLE: &str = "notAvailable";
    pub const TOTAL_CANDIDATES: &str = "totalCandidates";
    pub const ALL_VOTERS_COUNT: &str = "allVotersCount";
    pub const COMPLETION_RATE: &str = "completionRate";
    pub const SUBMITTED_VOTES_COUNT: &str = "submittedVotesCount";
    pub const CATEGORY: &str = "category";
}

/// Semantic keys used by the survey report. Main-data field keys double as
/// source field names.
pub mod survey {
    pub const MAIN_DATA: &str = "MAIN_DATA";
    pub const QUESTION_RESULTS: &str = "QUESTION_RESULTS";
    pub const SHEET_CREATOR: &str = "SHEET_CREATOR";
    pub const SHEET_VIEWER: &str = "SHEET_VIEWER";
    pub const UNKNOWN_QUESTION_TYPE: &str = "UNKNOWN_QUESTION_TYPE";

    pub const QUESTION_NUMBER: &str = "questionNumber";
    pub const QUESTION_TITLE: &str = "questionTitle";
    pub const QUESTION_TYPE: &str = "questionType";
    pub const ANSWER_NAME: &str = "answerName";
    pub const ANSWER_PERCENTAGE: &str = "answerPercentage";
    pub const VOTER_NAME: &str = "voterName";

    /// Main-data fields in display order.
    pub const MAIN_DATA_FIELDS: [&str; 17] = [
        "voteTitle",
        "creator",
        "loggedInUser",
        "votingStatus",
        "type",
        "description",
        "allowShare",
        "startDate",
        "startTime",
        "endDate",
        "endTime",
        "totalParticipants",
        "submittedVotes",
        "pendingVotes",
        "views",
        "completionRate",
        "questionResultCount",
    ];
}

type Table = &'static [(&'static str, &'static str)];

const ELECTION_EN: Table = &[
    ("MAIN_DATA", "Main Data"),
    ("GENDER_DIST", "Gender Distribution"),
    ("AGE_DIST", "Age Range Distribution"),
    ("RESULTS_SUMMARY", "Results Summary"),
    ("INSIGHTS", "Insights"),
    ("electionId", "Election Id"),
    ("electionName", "Election Name"),
    ("electionDescription", "Election Description"),
    ("startDate", "Start Date"),
    ("endDate", "End Date"),
    ("exportType", "Export Type"),
    ("creator", "Creator"),
    ("voter", "Voter"),
    ("candidateName", "Candidate Name"),
    ("numberOfVoters", "Number Of Voters"),
    ("voters", "Voters"),
    ("percentage", "Percentage"),
    ("notAvailable", "Not Available"),
    ("totalCandidates", "Total Candidates"),
    ("allVotersCount", "All Voters Count"),
    ("completionRate", "Completion Rate"),
    ("submittedVotesCount", "Submitted Votes Count"),
    ("category", "Category"),
];

const ELECTION_AR: Table = &[
    ("MAIN_DATA", "البيانات الرئيسية"),
    ("GENDER_DIST", "توزيع الجنس"),
    ("AGE_DIST", "توزيع الفئات العمرية"),
    ("RESULTS_SUMMARY", "ملخص النتائج"),
    ("INSIGHTS", "رؤى"),
    ("electionId", "معرّف الانتخاب"),
    ("electionName", "اسم الانتخاب"),
    ("electionDescription", "وصف الانتخاب"),
    ("startDate", "تاريخ البدء"),
    ("endDate", "تاريخ الانتهاء"),
    ("exportType", "نوع التصدير"),
    ("creator", "منشئ"),
    ("voter", "مشاهد"),
    ("candidateName", "اسم المرشح"),
    ("numberOfVoters", "عدد المصوتين"),
    ("voters", "المصوتين"),
    ("percentage", "النسبة المئوية"),
    ("notAvailable", "غير متاح للمشاهد"),
    ("totalCandidates", "إجمالي المرشحين"),
    ("allVotersCount", "عدد المصوتين"),
    ("completionRate", "معدل الإكمال"),
    ("submittedVotesCount", "عدد الأصوات المقدمة"),
    ("category", "الفئة"),
];

// English survey field labels are the raw field keys; downstream tooling
// matches on them.
const SURVEY_EN: Table = &[
    ("MAIN_DATA", "Main Data"),
    ("QUESTION_RESULTS", "Question Results"),
    ("SHEET_CREATOR", "Survey Data - Creator"),
    ("SHEET_VIEWER", "Survey Data - Viewer"),
    ("UNKNOWN_QUESTION_TYPE", "Unknown Question Type"),
    ("questionNumber", "Question Number"),
    ("questionTitle", "Title"),
    ("questionType", "Type"),
    ("type", "type"),
    ("answerName", "Answer Name"),
    ("answerPercentage", "Answer Percentage"),
    ("voterName", "Voter Name"),
    ("voteTitle", "voteTitle"),
    ("creator", "creator"),
    ("loggedInUser", "loggedInUser"),
    ("votingStatus", "votingStatus"),
    ("description", "description"),
    ("allowShare", "allowShare"),
    ("startDate", "startDate"),
    ("startTime", "startTime"),
    ("endDate", "endDate"),
    ("endTime", "endTime"),
    ("totalParticipants", "totalParticipants"),
    ("submittedVotes", "submittedVotes"),
    ("pendingVotes", "pendingVotes"),
    ("views", "views"),
    ("completionRate", "completionRate"),
    ("questionResultCount", "questionResultCount"),
];

const SURVEY_AR: Table = &[
    ("MAIN_DATA", "البيانات الرئيسية"),
    ("QUESTION_RESULTS", "نتائج الأسئلة"),
    ("SHEET_CREATOR", "بيانات الاستبيان - منشئ"),
    ("SHEET_VIEWER", "بيانات الاستبيان - مشاهد"),
    ("UNKNOWN_QUESTION_TYPE", "نوع السؤال غير معروف"),
    ("questionNumber", "رقم السؤال"),
    ("questionTitle", "العنوان"),
    ("questionType", "النوع"),
    ("type", "النوع"),
    ("answerName", "اسم الإجابة"),
    ("answerPercentage", "نسبة الإجابة"),
    ("voterName", "اسم المصوت"),
    ("voteTitle", "عنوان الاستطلاع"),
    ("creator", "المنشئ"),
    ("loggedInUser", "المستخدم المسجل"),
    ("votingStatus", "حالة التصويت"),
    ("description", "الوصف"),
    ("allowShare", "السماح بالمشاركة"),
    ("startDate", "تاريخ البدء"),
    ("startTime", "وقت البدء"),
    ("endDate", "تاريخ الانتهاء"),
    ("endTime", "وقت الانتهاء"),
    ("totalParticipants", "إجمالي المشاركين"),
    ("submittedVotes", "الأصوات المقدمة"),
    ("pendingVotes", "الأصوات المعلقة"),
    ("views", "عدد المشاهدات"),
    ("completionRate", "معدل الإكمال"),
    ("questionResultCount", "عدد نتائج الأسئلة"),
];

fn table(variant: ReportVariant, language: Language) -> Table {
    match (variant, language) {
        (ReportVariant::Election, Language::En) => ELECTION_EN,
        (ReportVariant::Election, Language::Ar) => ELECTION_AR,
        (ReportVariant::Survey, Language::En) => SURVEY_EN,
        (ReportVariant::Survey, Language::Ar) => SURVEY_AR,
    }
}

/// Look up the display string for `key`. Unknown keys come back verbatim.
pub fn resolve<'a>(variant: ReportVariant, language: Language, key: &'a str) -> &'a str {
    table(variant, language)
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| *label)
        .unwrap_or(key)
}

/// A catalog bound to one variant and language for the length of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelCatalog {
    variant: ReportVariant,
    language: Language,
}

impl LabelCatalog {
    pub fn new(variant: ReportVariant, language: Language) -> Self {
        Self { variant, language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn label<'a>(&self, key: &'a str) -> &'a str {
        resolve(self.variant, self.language, key)
    }

    /// Owned label, for building rows.
    pub fn text(&self, key: &str) -> String {
        self.label(key).to_string()
    }
}
