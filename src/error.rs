use std::path::{Path, PathBuf};

use crate::encoding::TextEncoding;

/// Errors raised by pipeline steps.
///
/// Validation findings are never reported through this type; they are
/// returned as [`crate::validator::Violation`] values.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not detect the text encoding of {}", .0.display())]
    UndetectedEncoding(PathBuf),

    #[error("character {ch:?} cannot be encoded as {encoding}")]
    Unencodable { ch: char, encoding: TextEncoding },

    #[error("archive error for {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("step timed out after {0} seconds")]
    Timeout(u64),

    #[error("background task failed: {0}")]
    Join(String),
}

impl PipelineError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn archive(path: &Path, source: zip::result::ZipError) -> Self {
        Self::Archive {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
