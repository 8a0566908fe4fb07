use std::collections::BTreeMap;
use std::io::{Cursor, Read};

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::{Value, json};

use tally_core::{ExportConfig, ExportError, ExportFormat, ExportRequest, Language, ReportVariant, Role};
use tally_docs::csv::{UTF8_BOM, parse_sections};
use tally_docs::model::LineKind;
use tally_docs::xlsx::column_widths;
use tally_docs::{ExportCoordinator, SectionModel, build_sections};

fn at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 11, 2)
        .unwrap()
        .and_hms_opt(8, 0, 59)
        .unwrap()
}

fn election() -> Value {
    json!({"data": {
        "electionId": "e-1",
        "electionName": "Student Council",
        "electionDescription": "Annual vote",
        "startDate": "2024-10-01",
        "endDate": "2024-10-31",
        "analytics": {
            "candidateGender": {"male": 3, "female": 1},
            "candidateAgeRange": {"18-24": 2, "25-34": 2}
        },
        "resultsSummary": [
            {"candidateName": "A", "numberOfVoters": 3},
            {"candidateName": "B", "numberOfVoters": 1}
        ],
        "insights": {"totalCandidates": 2, "allVotersCount": 8,
                     "completionRate": 87.456, "submittedVotesCount": 4}
    }})
}

fn survey() -> Value {
    json!({"data": {
        "voteTitle": "Team Lunch",
        "creator": "amal",
        "questionResults": [
            {"questionNumber": 1, "title": "Dish", "type": "MULTI_CHOICE",
             "answers": [{"name": "Rice", "answerPercentage": 50, "voterName": "sara"}]}
        ]
    }})
}

fn request(variant: ReportVariant, role: Role, language: Language, format: ExportFormat) -> ExportRequest {
    ExportRequest::new(variant, role, language, format)
}

fn csv_text(bytes: &[u8]) -> String {
    assert_eq!(&bytes[..3], &UTF8_BOM);
    String::from_utf8(bytes[3..].to_vec()).unwrap()
}

#[test]
fn test_results_summary_csv_example() {
    let artifact = ExportCoordinator::default()
        .export_at(
            &election(),
            request(ReportVariant::Election, Role::Creator, Language::En, ExportFormat::DelimitedText),
            at(),
        )
        .unwrap();
    let text = csv_text(&artifact.bytes);
    assert!(text.contains(
        "Results Summary\nCandidate Name,Number Of Voters,Voters\nA,3,Not Available\nB,1,Not Available\n\n"
    ));
}

#[test]
fn test_gender_distribution_csv_example() {
    let artifact = ExportCoordinator::default()
        .export_at(
            &election(),
            request(ReportVariant::Election, Role::Creator, Language::En, ExportFormat::DelimitedText),
            at(),
        )
        .unwrap();
    let text = csv_text(&artifact.bytes);
    assert!(text.contains("Gender Distribution\nCategory,Percentage\nmale,75.00%\nfemale,25.00%\n\n"));
    assert!(text.contains("Age Range Distribution\nCategory,Percentage\n18-24,50.00%\n25-34,50.00%\n"));
    assert!(text.contains("2,8,87.46%,4\n"));
}

#[test]
fn test_viewer_csv_has_no_distributions_or_voters() {
    let artifact = ExportCoordinator::default()
        .export_at(
            &election(),
            request(ReportVariant::Election, Role::Viewer, Language::En, ExportFormat::DelimitedText),
            at(),
        )
        .unwrap();
    let text = csv_text(&artifact.bytes);
    assert!(!text.contains("Distribution"));
    assert!(!text.contains("Insights"));
    assert!(!text.contains("Not Available"));
    assert!(text.contains("Candidate Name,Number Of Voters\nA,3\nB,1\n"));
    assert!(artifact.filename.starts_with("viewer_Student_Council_"));
}

#[test]
fn test_csv_matches_section_model() {
    for (doc, variant) in [(election(), ReportVariant::Election), (survey(), ReportVariant::Survey)] {
        for role in [Role::Creator, Role::Viewer] {
            for language in [Language::En, Language::Ar] {
                let model = build_sections(&doc, variant, role, language);
                let artifact = ExportCoordinator::default()
                    .export_at(&doc, request(variant, role, language, ExportFormat::DelimitedText), at())
                    .unwrap();
                let parsed = parse_sections(&artifact.bytes, b',').unwrap();

                assert_eq!(parsed.len(), model.sections.len());
                for (section, rows) in model.sections.iter().zip(&parsed) {
                    let expected: Vec<Vec<String>> = section.lines().map(|l| l.cells.to_vec()).collect();
                    assert_eq!(&expected, rows);
                }
            }
        }
    }
}

#[test]
fn test_exports_are_idempotent() {
    let coordinator = ExportCoordinator::default();
    for format in [ExportFormat::Spreadsheet, ExportFormat::DelimitedText] {
        for language in [Language::En, Language::Ar] {
            let req = request(ReportVariant::Election, Role::Creator, language, format);
            let first = coordinator.export_at(&election(), req, at()).unwrap();
            let second = coordinator.export_at(&election(), req, at()).unwrap();
            assert_eq!(first, second);
        }
    }
}

#[test]
fn test_spreadsheet_artifact() {
    let artifact = ExportCoordinator::default()
        .export_at(
            &survey(),
            request(ReportVariant::Survey, Role::Creator, Language::Ar, ExportFormat::Spreadsheet),
            at(),
        )
        .unwrap();
    assert_eq!(&artifact.bytes[0..2], b"PK");
    assert_eq!(artifact.filename, "creator_Team_Lunch_20241102_080059.xlsx");
    assert_eq!(
        artifact.content_type,
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
}

#[test]
fn test_large_export_uses_windowed_sheet() {
    let results: Vec<Value> = (0..300)
        .map(|i| json!({"candidateName": format!("c{i}"), "numberOfVoters": i}))
        .collect();
    let doc = json!({"data": {"electionName": "Big", "resultsSummary": results}});
    let config = ExportConfig {
        windowed_row_threshold: 50,
        ..ExportConfig::default()
    };
    let artifact = ExportCoordinator::new(config)
        .export_at(
            &doc,
            request(ReportVariant::Election, Role::Viewer, Language::En, ExportFormat::Spreadsheet),
            at(),
        )
        .unwrap();
    assert_eq!(&artifact.bytes[0..2], b"PK");
}

#[test]
fn test_custom_delimiter_from_config() {
    let config = ExportConfig {
        delimiter: ';',
        ..ExportConfig::default()
    };
    let artifact = ExportCoordinator::new(config)
        .export_at(
            &election(),
            request(ReportVariant::Election, Role::Creator, Language::En, ExportFormat::DelimitedText),
            at(),
        )
        .unwrap();
    let text = csv_text(&artifact.bytes);
    assert!(text.contains("A;3;Not Available\n"));
    assert_eq!(parse_sections(&artifact.bytes, b';').unwrap().len(), 5);
}

#[test]
fn test_export_json_rejects_non_object() {
    let coordinator = ExportCoordinator::default();
    let req = request(ReportVariant::Election, Role::Creator, Language::Ar, ExportFormat::DelimitedText);
    for raw in [&b"not json"[..], b"42", b"\"text\"", b"[]"] {
        let err = coordinator.export_json(raw, req).unwrap_err();
        assert!(matches!(err, ExportError::MalformedInput(_)));
        assert!(err.user_message(Language::Ar).starts_with("تعذرت قراءة مستند التصدير"));
    }
}

#[test]
fn test_export_json_accepts_sparse_document() {
    let artifact = ExportCoordinator::default()
        .export_json(
            br#"{"data": {}}"#,
            request(ReportVariant::Election, Role::Creator, Language::En, ExportFormat::DelimitedText),
        )
        .unwrap();
    let text = csv_text(&artifact.bytes);
    assert!(text.starts_with("Main Data\nElection Id,Election Name,Election Description,Export Type\nN/A,N/A,N/A,Creator\n\n"));
    assert!(artifact.filename.starts_with("creator_unnamed_election_"));
}

/// Non-empty cell text keyed by 1-based row, with 0-based column indexes.
type CellGrid = BTreeMap<u32, Vec<(usize, String)>>;

/// What a rendered worksheet contains, read back from the XLSX package.
struct SheetContents {
    cells: CellGrid,
    merges: Vec<String>,
    /// `(first, last, width)` per `<col>` entry, 1-based columns.
    columns: Vec<(usize, usize, f64)>,
    right_to_left: bool,
}

fn zip_entry(bytes: &[u8], name: &str) -> Option<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name(name).ok()?;
    let mut text = String::new();
    file.read_to_string(&mut text).unwrap();
    Some(text)
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn column_index(letters: &str) -> usize {
    letters.bytes().fold(0, |acc, b| acc * 26 + usize::from(b - b'A' + 1)) - 1
}

fn column_letters(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap()
}

fn read_sheet(bytes: &[u8]) -> SheetContents {
    let sheet = zip_entry(bytes, "xl/worksheets/sheet1.xml").unwrap();
    let text_re = Regex::new(r"(?s)<t[^>]*>(.*?)</t>").unwrap();
    let shared: Vec<String> = zip_entry(bytes, "xl/sharedStrings.xml")
        .map(|xml| {
            Regex::new(r"(?s)<si>(.*?)</si>")
                .unwrap()
                .captures_iter(&xml)
                .map(|si| {
                    text_re
                        .captures(&si[1])
                        .map(|t| unescape(&t[1]))
                        .unwrap_or_default()
                })
                .collect()
        })
        .unwrap_or_default();

    let cell_re = Regex::new(r#"(?s)<c r="([A-Z]+)(\d+)"([^>]*?)(?:/>|>(.*?)</c>)"#).unwrap();
    let value_re = Regex::new(r"<v>(\d+)</v>").unwrap();
    let mut cells = CellGrid::new();
    for cap in cell_re.captures_iter(&sheet) {
        let body = cap.get(4).map_or("", |m| m.as_str());
        let text = if body.contains("<is>") {
            text_re.captures(body).map(|t| unescape(&t[1])).unwrap_or_default()
        } else if cap[3].contains(r#"t="s""#) {
            let index: usize = value_re.captures(body).unwrap()[1].parse().unwrap();
            shared[index].clone()
        } else {
            String::new()
        };
        if !text.is_empty() {
            let row: u32 = cap[2].parse().unwrap();
            cells.entry(row).or_default().push((column_index(&cap[1]), text));
        }
    }
    for row in cells.values_mut() {
        row.sort();
    }

    let merges: Vec<String> = Regex::new(r#"<mergeCell ref="([A-Z]+\d+:[A-Z]+\d+)"/>"#)
        .unwrap()
        .captures_iter(&sheet)
        .map(|cap| cap[1].to_string())
        .collect();

    let attr = |element: &str, name: &str| -> String {
        Regex::new(&format!(r#"\b{name}="([^"]*)""#)).unwrap().captures(element).unwrap()[1].to_string()
    };
    let columns: Vec<(usize, usize, f64)> = Regex::new(r"<col ([^>]*)/>")
        .unwrap()
        .captures_iter(&sheet)
        .map(|cap| {
            (
                attr(&cap[1], "min").parse().unwrap(),
                attr(&cap[1], "max").parse().unwrap(),
                attr(&cap[1], "width").parse().unwrap(),
            )
        })
        .collect();

    SheetContents {
        cells,
        merges,
        columns,
        right_to_left: sheet.contains(r#"rightToLeft="1""#),
    }
}

/// Where each model line should land: one row per line, one blank row after
/// every section, titles merged across their span.
fn expected_layout(model: &SectionModel) -> (CellGrid, Vec<String>) {
    let mut cells = CellGrid::new();
    let mut merges = Vec::new();
    let mut row = 1u32;
    for section in &model.sections {
        for line in section.lines() {
            let texts: Vec<(usize, String)> = line
                .cells
                .iter()
                .enumerate()
                .filter(|(_, cell)| !cell.is_empty())
                .map(|(col, cell)| (col, cell.clone()))
                .collect();
            if !texts.is_empty() {
                cells.insert(row, texts);
            }
            if let LineKind::Title { span } = line.kind {
                if span > 1 {
                    merges.push(format!("A{row}:{}{row}", column_letters(span - 1)));
                }
            }
            row += 1;
        }
        row += 1;
    }
    (cells, merges)
}

fn assert_sheet_matches_model(bytes: &[u8], model: &SectionModel, font_size: f64) {
    let sheet = read_sheet(bytes);
    let (cells, merges) = expected_layout(model);

    assert_eq!(sheet.cells, cells);
    assert_eq!(sheet.merges, merges);
    assert_eq!(sheet.right_to_left, model.right_to_left);

    let widths = column_widths(model, font_size);
    assert_eq!(widths.len(), model.max_columns());
    for (col, width) in widths.iter().enumerate() {
        let (_, _, actual) = sheet
            .columns
            .iter()
            .find(|(first, last, _)| (*first..=*last).contains(&(col + 1)))
            .unwrap_or_else(|| panic!("no <col> entry for column {col}"));
        assert!(
            *actual >= *width && *actual < width + 1.0,
            "column {col}: xml width {actual}, computed {width}"
        );
    }
}

fn large_election(candidates: usize) -> Value {
    let mut doc = election();
    let results: Vec<Value> = (0..candidates)
        .map(|i| json!({"candidateName": format!("Candidate {i}"), "numberOfVoters": i, "voters": [format!("voter{i}")]}))
        .collect();
    doc["data"]["resultsSummary"] = json!(results);
    doc
}

#[test]
fn test_spreadsheet_cells_match_section_model() {
    let config = ExportConfig::default();
    let font_size = config.style.font_size;
    let coordinator = ExportCoordinator::new(config);
    for (doc, variant) in [(election(), ReportVariant::Election), (survey(), ReportVariant::Survey)] {
        for role in [Role::Creator, Role::Viewer] {
            for language in [Language::En, Language::Ar] {
                let model = build_sections(&doc, variant, role, language);
                let artifact = coordinator
                    .export_at(&doc, request(variant, role, language, ExportFormat::Spreadsheet), at())
                    .unwrap();
                assert_sheet_matches_model(&artifact.bytes, &model, font_size);
            }
        }
    }
}

#[test]
fn test_spreadsheet_layout_same_in_windowed_mode() {
    let doc = large_election(300);
    for (threshold, language) in [(5000, Language::En), (50, Language::En), (50, Language::Ar)] {
        let config = ExportConfig {
            windowed_row_threshold: threshold,
            ..ExportConfig::default()
        };
        let font_size = config.style.font_size;
        let model = build_sections(&doc, ReportVariant::Election, Role::Creator, language);
        let artifact = ExportCoordinator::new(config)
            .export_at(
                &doc,
                request(ReportVariant::Election, Role::Creator, language, ExportFormat::Spreadsheet),
                at(),
            )
            .unwrap();

        assert_sheet_matches_model(&artifact.bytes, &model, font_size);
        let sheet = read_sheet(&artifact.bytes);
        let last_row = *sheet.cells.keys().last().unwrap() as usize;
        // The trailing blank separator is the only line with no row.
        assert_eq!(last_row, model.total_lines() - 1);
    }
}

#[test]
fn test_spreadsheet_and_csv_agree() {
    let coordinator = ExportCoordinator::default();
    let doc = election();
    let xlsx = coordinator
        .export_at(&doc, request(ReportVariant::Election, Role::Creator, Language::En, ExportFormat::Spreadsheet), at())
        .unwrap();
    let csv = coordinator
        .export_at(&doc, request(ReportVariant::Election, Role::Creator, Language::En, ExportFormat::DelimitedText), at())
        .unwrap();

    let sheet = read_sheet(&xlsx.bytes);
    let mut rows = sheet.cells.values();
    for section in parse_sections(&csv.bytes, b',').unwrap() {
        for line in section {
            let from_csv: Vec<(usize, String)> = line
                .into_iter()
                .enumerate()
                .filter(|(_, cell)| !cell.is_empty())
                .collect();
            assert_eq!(rows.next(), Some(&from_csv));
        }
    }
    assert_eq!(rows.next(), None);
}
