//! Integration tests for the pipeline steps.
//!
//! Each test builds a project in a temporary directory and drives the step
//! handlers the same way the CLI does.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde_json::{json, Value};

use file_pipeline::config::PipelineConfig;
use file_pipeline::encoding::TextEncoding;
use file_pipeline::outcome::{Step, StepStatus};
use file_pipeline::steps::{self, backup, init, process, restore, validate::ValidateParams};
use file_pipeline::validator::Violation;

fn test_config(root: &Path) -> PipelineConfig {
    PipelineConfig {
        root: root.to_path_buf(),
        step_timeout: Duration::from_secs(30),
    }
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

#[tokio::test]
async fn init_creates_layout_and_samples() {
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path());
    let layout = config.layout();

    let outcome = init::handle(&config).await;
    assert_eq!(outcome.status, StepStatus::Ok, "{:?}", outcome.lines);

    for dir in layout.directories() {
        assert!(dir.is_dir(), "{} should exist", dir.display());
    }
    for sample in &init::SAMPLES {
        assert!(layout.raw_dir().join(sample.name).is_file());
    }

    let latin1 = fs::read(layout.raw_dir().join("file_latin1.txt")).unwrap();
    assert!(!latin1.is_ascii(), "latin-1 sample keeps ÆØÅ");
    assert!(!latin1.windows(3).any(|w| w == "—".as_bytes()));
}

#[tokio::test]
async fn init_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path());

    assert_eq!(init::handle(&config).await.status, StepStatus::Ok);
    assert_eq!(init::handle(&config).await.status, StepStatus::Ok);
    assert_eq!(fs::read_dir(config.layout().raw_dir()).unwrap().count(), 3);
}

// ---------------------------------------------------------------------------
// process
// ---------------------------------------------------------------------------

#[tokio::test]
async fn process_swapcases_samples_and_reports_encodings() {
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path());
    let layout = config.layout();
    init::handle(&config).await;

    let outcome = process::handle(&config).await;
    assert_eq!(outcome.status, StepStatus::Ok, "{:?}", outcome.lines);

    let report = read_json(&layout.processed_report());
    let records = report.as_array().unwrap();
    let summary: Vec<(&str, &str)> = records
        .iter()
        .map(|r| {
            (
                r["file_name"].as_str().unwrap(),
                r["encoding_used"].as_str().unwrap(),
            )
        })
        .collect();

    // The latin-1 sample is not valid UTF-8 and contains no byte cp1251
    // rejects, so the fallback reads it as cp1251.
    assert_eq!(
        summary,
        vec![
            ("file_cp1251_processed.txt", "cp1251"),
            ("file_latin1_processed.txt", "cp1251"),
            ("file_utf8_processed.txt", "utf-8"),
        ]
    );

    let utf8 = fs::read_to_string(layout.processed_dir().join("file_utf8_processed.txt")).unwrap();
    assert_eq!(utf8, "пРИВЕТ, МИР! hELLO WORLD! эТО ФАЙЛ В КОДИРОВКЕ utf-8.");

    for record in records {
        let path = layout.processed_dir().join(record["file_name"].as_str().unwrap());
        assert_eq!(
            record["file_size_bytes"].as_u64().unwrap(),
            fs::metadata(&path).unwrap().len()
        );
    }
}

#[test]
fn process_reads_unknown_bytes_as_latin1() {
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path());
    let layout = config.layout();
    fs::create_dir_all(layout.raw_dir()).unwrap();
    fs::write(layout.raw_dir().join("odd"), [b'A', 0x98, b'b']).unwrap();

    let records = process::process_raw_files(&layout).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].file_name, "odd_processed");
    assert_eq!(records[0].encoding_used, TextEncoding::Latin1);
    assert_eq!(records[0].processed_text, "a\u{98}B");
}

#[tokio::test]
async fn process_without_raw_dir_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path());

    let outcome = process::handle(&config).await;
    assert_eq!(outcome.status, StepStatus::Failed);
    assert_eq!(outcome.step, Step::Process);
}

// ---------------------------------------------------------------------------
// describe / validate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn describe_writes_valid_document_and_schema() {
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path());
    let layout = config.layout();
    init::handle(&config).await;
    process::handle(&config).await;

    let outcome = steps::describe::handle(&config).await;
    assert_eq!(outcome.status, StepStatus::Ok, "{:?}", outcome.lines);
    assert!(outcome.violations.is_empty());

    let document = read_json(&layout.fileinfo_document());
    let records = document.as_array().unwrap();
    assert_eq!(records.len(), 3);
    for record in records {
        let full_path = Path::new(record["full_path"].as_str().unwrap());
        assert!(full_path.is_absolute());
        assert!(record["size"].is_u64());
        assert!(record["modified"].as_str().unwrap().contains('T'));
    }

    let schema = read_json(&layout.fileinfo_schema());
    assert_eq!(schema["items"]["required"], json!(["file_name", "full_path", "size", "modified"]));
}

#[tokio::test]
async fn validate_reports_violations_as_invalid() {
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path());
    let layout = config.layout();
    fs::create_dir_all(layout.output_dir()).unwrap();

    let document = tmp.path().join("broken.json");
    fs::write(
        &document,
        r#"[{"file_name": "a.txt", "size": "12", "modified": "2024-01-01T00:00:00"}]"#,
    )
    .unwrap();
    steps::describe::write_fileinfo_schema(&layout).unwrap();

    let params = ValidateParams {
        document: document.clone(),
        schema: layout.fileinfo_schema(),
    };
    let outcome = steps::validate::handle(params, &config).await;

    assert_eq!(outcome.status, StepStatus::Invalid);
    assert_eq!(outcome.violations.len(), 2);
    assert!(matches!(&outcome.violations[0], Violation::MissingField { index: 0, field } if field == "full_path"));
    assert!(outcome.lines.iter().any(|l| l.contains("[0] missing required field 'full_path'")));
}

#[tokio::test]
async fn validate_unparseable_document_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path());
    let layout = config.layout();
    steps::describe::write_fileinfo_schema(&layout).unwrap();
    fs::write(layout.fileinfo_document(), "[{not json").unwrap();

    let outcome = steps::dispatch(Step::Validate, &config).await;
    assert_eq!(outcome.status, StepStatus::Failed);
    assert!(outcome.lines[0].contains("invalid JSON"), "{:?}", outcome.lines);
}

// ---------------------------------------------------------------------------
// backup / restore
// ---------------------------------------------------------------------------

#[test]
fn archive_name_uses_compact_date() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
    assert_eq!(backup::archive_name(date), "backup_20240309.zip");
}

#[tokio::test]
async fn restore_without_archives_is_not_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path());

    let outcome = restore::handle(&config).await;
    assert_eq!(outcome.status, StepStatus::Ok);
    assert_eq!(outcome.lines, vec!["No archives to restore".to_string()]);
    assert!(!config.layout().restore_dir().exists());
}

#[tokio::test]
async fn restore_picks_newest_archive_by_name() {
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path());
    let layout = config.layout();
    init::create_directories(&layout).unwrap();

    fs::write(layout.raw_dir().join("version.txt"), "old").unwrap();
    backup::create_backup(&layout, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).unwrap();

    fs::write(layout.raw_dir().join("version.txt"), "new").unwrap();
    backup::create_backup(&layout, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()).unwrap();

    // Not an archive; must be ignored.
    fs::write(layout.backups_dir().join("zzz_notes.txt"), "x").unwrap();

    let latest = restore::latest_archive(&layout.backups_dir()).unwrap().unwrap();
    assert_eq!(latest.file_name().unwrap(), "backup_20240102.zip");

    let outcome = restore::handle(&config).await;
    assert_eq!(outcome.status, StepStatus::Ok, "{:?}", outcome.lines);
    assert_eq!(
        fs::read_to_string(layout.restore_dir().join("raw/version.txt")).unwrap(),
        "new"
    );
}

#[test]
fn restore_extracts_zip_written_by_other_tools() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = test_config(tmp.path()).layout();
    fs::create_dir_all(layout.backups_dir()).unwrap();

    // File entries only, no directory entries.
    let archive = layout.backups_dir().join("backup_20231231.zip");
    let mut writer = zip::ZipWriter::new(fs::File::create(&archive).unwrap());
    writer
        .start_file("raw/legacy.txt", zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"legacy").unwrap();
    writer.finish().unwrap();

    assert_eq!(restore::restore_latest(&layout).unwrap(), Some(archive));
    assert_eq!(
        fs::read_to_string(layout.restore_dir().join("raw/legacy.txt")).unwrap(),
        "legacy"
    );
}

// ---------------------------------------------------------------------------
// timeouts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn timed_out_step_fails_while_work_runs_to_completion() {
    let finished = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&finished);

    let outcome = steps::run_blocking(Step::Backup, Duration::from_millis(20), move || {
        std::thread::sleep(Duration::from_millis(200));
        flag.store(true, Ordering::SeqCst);
        Ok(file_pipeline::outcome::StepOutcome::ok(Step::Backup, Vec::new()))
    })
    .await;

    assert_eq!(outcome.status, StepStatus::Failed);
    assert!(outcome.lines[0].contains("timed out"), "{:?}", outcome.lines);
    assert!(!finished.load(Ordering::SeqCst));

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(finished.load(Ordering::SeqCst), "timed-out work is not cancelled");
}

// ---------------------------------------------------------------------------
// full pipeline
// ---------------------------------------------------------------------------

#[tokio::test]
async fn run_pipeline_executes_all_steps() {
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path());

    let outcomes = steps::run_pipeline(&config).await;
    let ran: Vec<Step> = outcomes.iter().map(|o| o.step).collect();
    assert_eq!(ran, steps::PIPELINE.to_vec());
    assert!(
        outcomes.iter().all(|o| o.status == StepStatus::Ok),
        "{outcomes:?}"
    );

    let backups: Vec<_> = fs::read_dir(config.layout().backups_dir())
        .unwrap()
        .collect();
    assert_eq!(backups.len(), 1);
}
