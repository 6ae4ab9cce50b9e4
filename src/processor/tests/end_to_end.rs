//! End-to-end conversion tests

use super::{Fixture, HEADER};
use crate::models::{FileOutcome, User};
use crate::processor::convert_content;
use std::fs;

fn processed(outcome: FileOutcome) -> crate::models::FileReport {
    match outcome {
        FileOutcome::Processed(report) => report,
        other => panic!("Expected Processed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_clean_file_produces_json_only() {
    let fixture = Fixture::new();
    let source = fixture.drop_csv("people.csv", &["12345678,Jane,,Doe,555-123-4567"]);

    let report = processed(fixture.processor.process_file(&source).await.unwrap());

    assert_eq!(report.identifier, "people");
    assert_eq!(report.rows_processed, 1);
    assert_eq!(report.issue_count, 0);
    assert_eq!(report.error_path, None);
    assert_eq!(
        fs::read_to_string(fixture.json_path("people")).unwrap(),
        r#"[{"id":12345678,"name":{"first":"Jane","last":"Doe"},"phone":"555-123-4567"}]"#
    );
    assert!(!fixture.error_path("people").exists());
    assert!(!source.exists());
}

#[tokio::test]
async fn test_invalid_row_produces_error_report() {
    let fixture = Fixture::new();
    let source = fixture.drop_csv("people.csv", &["1234567,,,Doe,bad-phone"]);

    let report = processed(fixture.processor.process_file(&source).await.unwrap());

    assert_eq!(report.issue_count, 3);
    assert_eq!(report.rows_with_issues, 1);

    let users: Vec<User> =
        serde_json::from_str(&fs::read_to_string(fixture.json_path("people")).unwrap()).unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, 1234567);
    assert_eq!(users[0].name.first, "");
    assert_eq!(users[0].name.middle, None);
    assert_eq!(users[0].name.last, "Doe");

    let json = fs::read_to_string(fixture.json_path("people")).unwrap();
    assert!(!json.contains("middle"));

    assert_eq!(
        fs::read_to_string(fixture.error_path("people")).unwrap(),
        "LINE_NUM,ERROR_MSG\n\
         2,INTERNAL_ID-is-not-8-digits-&-FIRST_NAME-cannot-be-empty-&-PHONE_NUM-not-formatted-correctly\n"
    );
    assert!(!source.exists());
}

#[tokio::test]
async fn test_every_row_is_emitted_and_errors_keep_row_numbers() {
    let fixture = Fixture::new();
    let source = fixture.drop_csv(
        "mixed.csv",
        &[
            "12345678,Jane,,Doe,555-123-4567",
            "87654321,,Q,Roe,555-123-4567",
            "11112222,John,Quincy,Adams,555-000-1111",
            "abc,Bartholomewandrews,,,",
        ],
    );

    let report = processed(fixture.processor.process_file(&source).await.unwrap());
    assert_eq!(report.rows_processed, 4);

    let users: Vec<User> =
        serde_json::from_str(&fs::read_to_string(fixture.json_path("mixed")).unwrap()).unwrap();
    assert_eq!(users.len(), 4);
    assert_eq!(users[1].name.middle.as_deref(), Some("Q"));
    assert_eq!(users[3].id, 0);
    assert_eq!(users[3].name.first, "Bartholomewandr");

    let report_text = fs::read_to_string(fixture.error_path("mixed")).unwrap();
    let lines: Vec<&str> = report_text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "LINE_NUM,ERROR_MSG",
            "3,FIRST_NAME-cannot-be-empty",
            "5,INTERNAL_ID-is-not-8-digits-&-INTERNAL_ID-is-not-an-integer-&-FIRST_NAME-is-longer-than-15-characters-&-LAST_NAME-cannot-be-empty-&-PHONE_NUM-cannot-be-empty-&-PHONE_NUM-not-formatted-correctly",
        ]
    );
}

#[tokio::test]
async fn test_header_only_file_writes_empty_array() {
    let fixture = Fixture::new();
    let source = fixture.drop_csv("empty.csv", &[]);

    let report = processed(fixture.processor.process_file(&source).await.unwrap());

    assert_eq!(report.rows_processed, 0);
    assert_eq!(fs::read_to_string(fixture.json_path("empty")).unwrap(), "[]");
    assert!(!fixture.error_path("empty").exists());
    assert!(!source.exists());
}

#[tokio::test]
async fn test_files_in_subdirectories_use_their_own_stem() {
    let fixture = Fixture::new();
    let nested = fixture.watch_dir().join("incoming");
    fs::create_dir(&nested).unwrap();
    let source = nested.join("batch7.csv");
    fs::write(&source, format!("{}\n12345678,Jane,,Doe,555-123-4567\n", HEADER)).unwrap();

    processed(fixture.processor.process_file(&source).await.unwrap());

    assert!(fixture.json_path("batch7").exists());
    assert!(!source.exists());
}

#[tokio::test]
async fn test_session_stats_accumulate() {
    let fixture = Fixture::new();
    let a = fixture.drop_csv("a.csv", &["12345678,Jane,,Doe,555-123-4567"]);
    let b = fixture.drop_csv("b.csv", &["1234567,,,Doe,bad-phone", "12345678,A,,B,555-123-4567"]);

    fixture.processor.process_file(&a).await.unwrap();
    fixture.processor.process_file(&b).await.unwrap();

    let stats = fixture.processor.session().stats();
    assert_eq!(stats.files_processed, 2);
    assert_eq!(stats.total_rows, 3);
    assert_eq!(stats.total_issues, 3);
}

#[test]
fn test_convert_content_handles_crlf() {
    let content = format!(
        "{}\r\n12345678,Jane,,Doe,555-123-4567\r\n87654321,Ann,,Lee,555-123-4567\r\n",
        HEADER
    );

    let converted = convert_content(&content).unwrap();

    assert_eq!(converted.users.len(), 2);
    assert!(converted.issues.is_empty());
    assert_eq!(converted.users[1].phone, "555-123-4567");
}

#[test]
fn test_convert_content_handles_lone_carriage_returns() {
    let content = format!(
        "{}\r12345678,Jane,,Doe,555-123-4567\r87654321,Ann,,Lee,555-123-4567\r",
        HEADER
    );

    let converted = convert_content(&content).unwrap();

    assert_eq!(converted.users.len(), 2);
    assert_eq!(converted.users[0].name.last, "Doe");
    assert_eq!(converted.users[1].id, 87654321);
    assert!(converted.issues.is_empty());
}

#[test]
fn test_convert_content_mixed_terminators_keep_row_numbers() {
    let content = format!(
        "{}\n12345678,Jane,,Doe,555-123-4567\r\n1234567,Ann,,Lee,555-123-4567\r87654321,Bo,,Kim,555-123-4567",
        HEADER
    );

    let converted = convert_content(&content).unwrap();

    assert_eq!(converted.users.len(), 3);
    assert_eq!(converted.issues.len(), 1);
    assert_eq!(converted.issues[0].row, 3);
    assert_eq!(converted.users[2].name.first, "Bo");
}

#[test]
fn test_convert_content_skips_header_unconditionally() {
    let converted = convert_content("12345678,Jane,,Doe,555-123-4567").unwrap();
    assert!(converted.users.is_empty());
}
