use std::fs::{self, File};
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::config::{PipelineConfig, ProjectLayout};
use crate::error::{PipelineError, PipelineResult};
use crate::outcome::{Step, StepOutcome};

use super::backup::ARCHIVE_EXTENSION;

/// Handle the `restore` step.
///
/// Having no archive to restore is reported, not treated as a failure.
pub async fn handle(config: &PipelineConfig) -> StepOutcome {
    let layout = config.layout();
    super::run_blocking(Step::Restore, config.step_timeout, move || {
        let lines = match restore_latest(&layout)? {
            Some(archive) => vec![
                format!("Files restored from {}", archive.display()),
                format!("Restore directory: {}", layout.restore_dir().display()),
            ],
            None => vec!["No archives to restore".to_string()],
        };
        Ok(StepOutcome::ok(Step::Restore, lines))
    })
    .await
}

/// The newest archive in `backups_dir`, by file name.
///
/// Archive names embed the date as `YYYYMMDD`, so name order is
/// chronological. A missing directory has no archives.
pub fn latest_archive(backups_dir: &Path) -> PipelineResult<Option<PathBuf>> {
    let entries = match fs::read_dir(backups_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(PipelineError::io(backups_dir, e)),
    };

    let mut archives = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| PipelineError::io(backups_dir, e))?.path();
        let is_archive = path
            .extension()
            .is_some_and(|ext| ext == ARCHIVE_EXTENSION);
        if is_archive && path.is_file() {
            archives.push(path);
        }
    }

    archives.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(archives.pop())
}

/// Extract the newest archive into `restored_data/`.
pub fn restore_latest(layout: &ProjectLayout) -> PipelineResult<Option<PathBuf>> {
    let Some(archive) = latest_archive(&layout.backups_dir())? else {
        tracing::info!("no archives to restore");
        return Ok(None);
    };

    let dest = layout.restore_dir();
    fs::create_dir_all(&dest).map_err(|e| PipelineError::io(&dest, e))?;
    extract_archive(&archive, &dest)?;

    tracing::info!(archive = %archive.display(), dest = %dest.display(), "archive restored");
    Ok(Some(archive))
}

/// Unpack a zip archive into `dest_dir`.
pub fn extract_archive(archive_path: &Path, dest_dir: &Path) -> PipelineResult<()> {
    let file = File::open(archive_path).map_err(|e| PipelineError::io(archive_path, e))?;
    ZipArchive::new(file)
        .and_then(|mut archive| archive.extract(dest_dir))
        .map_err(|e| PipelineError::archive(archive_path, e))
}
