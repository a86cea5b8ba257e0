use std::path::Path;

use serde::Serialize;

use crate::config::{PipelineConfig, ProjectLayout};
use crate::encoding::{self, TextEncoding};
use crate::error::{PipelineError, PipelineResult};
use crate::fileinfo::{self, iso_timestamp};
use crate::outcome::{Step, StepOutcome};

/// One entry of `processed_data.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedRecord {
    pub file_name: String,
    pub encoding_used: TextEncoding,
    pub original_text: String,
    pub processed_text: String,
    pub file_size_bytes: u64,
    pub last_modified: String,
}

/// Handle the `process` step.
pub async fn handle(config: &PipelineConfig) -> StepOutcome {
    let layout = config.layout();
    super::run_blocking(Step::Process, config.step_timeout, move || {
        let records = process_raw_files(&layout)?;
        let report = layout.processed_report();
        fileinfo::write_json(&report, &records)?;

        let mut lines: Vec<String> = records
            .iter()
            .map(|r| format!("Processed {} ({})", r.file_name, r.encoding_used))
            .collect();
        lines.push(format!("Report written: {}", report.display()));
        Ok(StepOutcome::ok(Step::Process, lines))
    })
    .await
}

/// Swapcase every file in `data/raw/` into `data/processed/`.
pub fn process_raw_files(layout: &ProjectLayout) -> PipelineResult<Vec<ProcessedRecord>> {
    let processed_dir = layout.processed_dir();
    std::fs::create_dir_all(&processed_dir).map_err(|e| PipelineError::io(&processed_dir, e))?;

    fileinfo::list_files(&layout.raw_dir())?
        .iter()
        .map(|source| process_file(source, &processed_dir))
        .collect()
}

/// Decode `source`, swap its case and write the UTF-8 result into `dest_dir`.
pub fn process_file(source: &Path, dest_dir: &Path) -> PipelineResult<ProcessedRecord> {
    let bytes = std::fs::read(source).map_err(|e| PipelineError::io(source, e))?;
    let (original_text, encoding_used) = encoding::decode_with_fallback(&bytes)
        .ok_or_else(|| PipelineError::UndetectedEncoding(source.to_path_buf()))?;

    let processed_text = encoding::swapcase(&original_text);

    let file_name = processed_name(source);
    let dest = dest_dir.join(&file_name);
    std::fs::write(&dest, processed_text.as_bytes()).map_err(|e| PipelineError::io(&dest, e))?;

    let metadata = std::fs::metadata(&dest).map_err(|e| PipelineError::io(&dest, e))?;
    let modified = metadata.modified().map_err(|e| PipelineError::io(&dest, e))?;

    tracing::info!(
        source = %fileinfo::file_name(source),
        dest = %file_name,
        encoding = %encoding_used,
        "file processed"
    );

    Ok(ProcessedRecord {
        file_name,
        encoding_used,
        original_text,
        processed_text,
        file_size_bytes: metadata.len(),
        last_modified: iso_timestamp(modified),
    })
}

/// `notes.txt` → `notes_processed.txt`; names without an extension get
/// the suffix only.
pub fn processed_name(source: &Path) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match source.extension() {
        Some(ext) => format!("{stem}_processed.{}", ext.to_string_lossy()),
        None => format!("{stem}_processed"),
    }
}
