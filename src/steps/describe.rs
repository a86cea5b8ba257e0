use crate::config::{PipelineConfig, ProjectLayout};
use crate::error::PipelineResult;
use crate::fileinfo::{self, FileInfo};
use crate::outcome::{Step, StepOutcome};
use crate::schema;

use super::validate;

/// Handle the `describe` step: collect file metadata for `data/processed/`,
/// write it with its schema, then validate the written document.
pub async fn handle(config: &PipelineConfig) -> StepOutcome {
    let layout = config.layout();
    super::run_blocking(Step::Describe, config.step_timeout, move || {
        let infos = write_fileinfo_document(&layout)?;
        write_fileinfo_schema(&layout)?;

        let document = layout.fileinfo_document();
        let violations = validate::validate_files(&document, &layout.fileinfo_schema())?;

        let mut outcome = validate::validation_outcome(Step::Describe, &document, violations);
        outcome.lines.insert(
            0,
            format!("Described {} file(s) in {}", infos.len(), document.display()),
        );
        Ok(outcome)
    })
    .await
}

/// Collect metadata for every processed file and write `fileinfo_data.json`.
pub fn write_fileinfo_document(layout: &ProjectLayout) -> PipelineResult<Vec<FileInfo>> {
    let infos = fileinfo::collect(&layout.processed_dir())?;
    let path = layout.fileinfo_document();
    fileinfo::write_json(&path, &infos)?;
    tracing::info!(path = %path.display(), records = infos.len(), "file info document written");
    Ok(infos)
}

/// Write the fixed schema to `fileinfo_schema.json`.
pub fn write_fileinfo_schema(layout: &ProjectLayout) -> PipelineResult<()> {
    let path = layout.fileinfo_schema();
    fileinfo::write_json(&path, &schema::fileinfo_schema())?;
    tracing::info!(path = %path.display(), "file info schema written");
    Ok(())
}
