use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::config::{PipelineConfig, ProjectLayout};
use crate::error::{PipelineError, PipelineResult};
use crate::outcome::{Step, StepOutcome};

/// Extension of backup archives in `backups/`.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Handle the `backup` step.
pub async fn handle(config: &PipelineConfig) -> StepOutcome {
    let layout = config.layout();
    super::run_blocking(Step::Backup, config.step_timeout, move || {
        let today = Local::now().date_naive();
        let archive = create_backup(&layout, today)?;
        Ok(StepOutcome::ok(
            Step::Backup,
            vec![format!("Archive created: {}", archive.display())],
        ))
    })
    .await
}

/// `backup_YYYYMMDD.zip`
pub fn archive_name(date: NaiveDate) -> String {
    format!("backup_{}.{ARCHIVE_EXTENSION}", date.format("%Y%m%d"))
}

/// Archive the contents of `data/` into `backups/`, named for `date`.
///
/// An archive for the same date is overwritten.
pub fn create_backup(layout: &ProjectLayout, date: NaiveDate) -> PipelineResult<PathBuf> {
    let backups = layout.backups_dir();
    fs::create_dir_all(&backups).map_err(|e| PipelineError::io(&backups, e))?;

    let archive = backups.join(archive_name(date));
    create_zip_archive(&layout.data_dir(), &archive)?;

    tracing::info!(archive = %archive.display(), "backup archive created");
    Ok(archive)
}

/// Write a zip archive of everything under `source_dir`, with entry paths
/// relative to it and sorted by name.
///
/// Entry timestamps are fixed, so unchanged data yields an identical archive.
pub fn create_zip_archive(source_dir: &Path, output_path: &Path) -> PipelineResult<()> {
    let mut entries = Vec::new();
    collect_entries(source_dir, "", &mut entries)?;

    let file = File::create(output_path).map_err(|e| PipelineError::io(output_path, e))?;
    let mut writer = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    for (archive_path, fs_path) in entries {
        if fs_path.is_dir() {
            writer
                .add_directory(archive_path, options)
                .map_err(|e| PipelineError::archive(output_path, e))?;
        } else {
            let mut file = File::open(&fs_path).map_err(|e| PipelineError::io(&fs_path, e))?;
            writer
                .start_file(archive_path, options)
                .map_err(|e| PipelineError::archive(output_path, e))?;
            io::copy(&mut file, &mut writer)
                .map_err(|e| PipelineError::archive(output_path, e.into()))?;
        }
    }

    let buffered = writer
        .finish()
        .map_err(|e| PipelineError::archive(output_path, e))?;
    let file = buffered
        .into_inner()
        .map_err(|e| PipelineError::archive(output_path, e.into_error().into()))?;
    file.sync_all()
        .map_err(|e| PipelineError::io(output_path, e))
}

fn collect_entries(
    current_dir: &Path,
    prefix: &str,
    entries: &mut Vec<(String, PathBuf)>,
) -> PipelineResult<()> {
    let mut dir_entries = fs::read_dir(current_dir)
        .map_err(|e| PipelineError::io(current_dir, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| PipelineError::io(current_dir, e))?;

    dir_entries.sort_by_key(|entry| entry.file_name());

    for entry in dir_entries {
        let fs_path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        let archive_path = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}/{name}")
        };

        let is_dir = fs_path.is_dir();
        entries.push((archive_path.clone(), fs_path.clone()));
        if is_dir {
            collect_entries(&fs_path, &archive_path, entries)?;
        }
    }

    Ok(())
}
