use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};

/// Metadata describing one file, as serialized into `fileinfo_data.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub file_name: String,
    pub full_path: String,
    pub size: u64,
    pub created: String,
    pub modified: String,
}

impl FileInfo {
    /// Read metadata for `path`.
    ///
    /// Falls back to the modification time where the platform does not
    /// report a creation time.
    pub fn from_path(path: &Path) -> PipelineResult<Self> {
        let metadata = std::fs::metadata(path).map_err(|e| PipelineError::io(path, e))?;
        let full_path = path
            .canonicalize()
            .map_err(|e| PipelineError::io(path, e))?;

        let modified = metadata
            .modified()
            .map_err(|e| PipelineError::io(path, e))?;
        let created = metadata.created().unwrap_or(modified);

        Ok(Self {
            file_name: file_name(path),
            full_path: full_path.to_string_lossy().into_owned(),
            size: metadata.len(),
            created: iso_timestamp(created),
            modified: iso_timestamp(modified),
        })
    }
}

/// Local-time ISO-8601 timestamp with microsecond precision.
///
/// The fractional part is left out when it is zero.
pub fn iso_timestamp(time: SystemTime) -> String {
    let local: DateTime<Local> = time.into();
    if local.timestamp_subsec_micros() == 0 {
        local.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        local.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Regular files directly inside `dir`, sorted by name.
///
/// Subdirectories and symlinks are skipped.
pub fn list_files(dir: &Path) -> PipelineResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| PipelineError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PipelineError::io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| PipelineError::io(&entry.path(), e))?;
        if file_type.is_file() {
            files.push(entry.path());
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Collect [`FileInfo`] for every regular file in `dir`.
pub fn collect(dir: &Path) -> PipelineResult<Vec<FileInfo>> {
    list_files(dir)?
        .iter()
        .map(|path| -> PipelineResult<FileInfo> {
            let info = FileInfo::from_path(path)?;
            tracing::info!(file = %info.file_name, "added to file info document");
            Ok(info)
        })
        .collect()
}

/// Serialize `value` as pretty JSON to `path`, creating parent directories.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> PipelineResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|e| PipelineError::json(path, e))?;
    std::fs::write(path, json).map_err(|e| PipelineError::io(path, e))
}

/// Read and parse a JSON file.
pub fn read_json(path: &Path) -> PipelineResult<serde_json::Value> {
    let file = std::fs::File::open(path).map_err(|e| PipelineError::io(path, e))?;
    serde_json::from_reader(std::io::BufReader::new(file)).map_err(|e| PipelineError::json(path, e))
}
