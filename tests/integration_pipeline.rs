//! Integration tests for the conversion pipeline
//!
//! Drive the public API the way the binary does: an armed watcher picks up
//! files from a temporary tree and the artifacts are read back with the
//! same crates that wrote them.

use csvtojson::models::ErrorEntry;
use csvtojson::record::process_row;
use csvtojson::{ConverterConfig, DirectoryWatcher, FileProcessor, SessionState, User};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const HEADER: &str = "INTERNAL_ID,FIRST_NAME,MIDDLE_NAME,LAST_NAME,PHONE_NUM";

struct Dirs {
    _root: TempDir,
    watch: PathBuf,
    json: PathBuf,
    errors: PathBuf,
}

fn create_dirs() -> Dirs {
    let root = TempDir::new().unwrap();
    let watch = root.path().join("incoming");
    let json = root.path().join("json");
    let errors = root.path().join("errors");
    for dir in [&watch, &json, &errors] {
        fs::create_dir(dir).unwrap();
    }
    Dirs {
        _root: root,
        watch,
        json,
        errors,
    }
}

fn processor_for(dirs: &Dirs, session: Arc<SessionState>) -> FileProcessor {
    let config = ConverterConfig::new(&dirs.watch, &dirs.json, &dirs.errors)
        .with_poll_interval(Duration::from_millis(25))
        .with_settle_delay(Duration::from_millis(10));
    config.validate().unwrap();
    FileProcessor::new(config, session)
}

async fn wait_until_gone(path: &Path) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    while path.exists() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "{} was never consumed",
            path.display()
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    // the source is deleted last; give the stats update a moment
    tokio::time::sleep(Duration::from_millis(50)).await;
}

fn read_users(path: &Path) -> Vec<User> {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn read_errors(path: &Path) -> Vec<ErrorEntry> {
    csv::Reader::from_path(path)
        .unwrap()
        .deserialize()
        .collect::<Result<_, _>>()
        .unwrap()
}

#[tokio::test]
async fn test_watcher_converts_dropped_file() {
    let dirs = create_dirs();
    let session = Arc::new(SessionState::new());
    let handle = DirectoryWatcher::new(processor_for(&dirs, session.clone()))
        .unwrap()
        .spawn();

    let source = dirs.watch.join("staff.csv");
    let content = format!(
        "{}\n{}\n{}\n{}\n",
        HEADER,
        "12345678,Jane,Q,Doe,555-123-4567",
        "12345678,,,Smith,5551234567",
        "87654321,Bartholomew,,Higginbotham,555-987-6543",
    );
    fs::write(&source, content).unwrap();

    wait_until_gone(&source).await;
    handle.abort();

    let users = read_users(&dirs.json.join("staff.json"));
    assert_eq!(users.len(), 3);
    assert_eq!(users[0].name.middle.as_deref(), Some("Q"));
    assert_eq!(users[1].id, 12345678);
    assert_eq!(users[1].name.first, "");
    assert_eq!(users[1].name.middle, None);
    assert_eq!(users[2].name.last, "Higginbotham");

    let errors = read_errors(&dirs.errors.join("staff.csv"));
    assert_eq!(
        errors,
        vec![ErrorEntry {
            line_num: 3,
            error_msg: "FIRST_NAME-cannot-be-empty-&-PHONE_NUM-not-formatted-correctly"
                .to_string(),
        }]
    );

    let stats = session.stats();
    assert_eq!(stats.files_processed, 1);
    assert_eq!(stats.total_rows, 3);
    assert_eq!(stats.total_issues, 2);
}

#[tokio::test]
async fn test_second_arrival_is_discarded() {
    let dirs = create_dirs();
    let session = Arc::new(SessionState::new());
    let handle = DirectoryWatcher::new(processor_for(&dirs, session.clone()))
        .unwrap()
        .spawn();

    let source = dirs.watch.join("roster.csv");
    fs::write(&source, format!("{}\n12345678,Jane,,Doe,555-123-4567\n", HEADER)).unwrap();
    wait_until_gone(&source).await;

    let nested = dirs.watch.join("resend");
    fs::create_dir(&nested).unwrap();
    let resend = nested.join("roster.csv");
    fs::write(&resend, format!("{}\n87654321,Ann,,Lee,555-000-1111\n", HEADER)).unwrap();
    wait_until_gone(&resend).await;
    handle.abort();

    let users = read_users(&dirs.json.join("roster.json"));
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].name.first, "Jane");
    assert!(!dirs.errors.join("roster.csv").exists());

    let stats = session.stats();
    assert_eq!(stats.files_processed, 1);
    assert_eq!(stats.files_rejected, 1);
}

#[test]
fn test_row_processing_through_public_api() {
    let result = process_row("12345678,Jane,,Doe,555-123-4567", 2).unwrap();

    assert!(result.issues.is_empty());
    assert_eq!(
        serde_json::to_string(&result.user).unwrap(),
        r#"{"id":12345678,"name":{"first":"Jane","last":"Doe"},"phone":"555-123-4567"}"#
    );

    assert!(process_row("12345678,Jane", 4).is_err());
}
