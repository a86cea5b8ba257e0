use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default timeout for a single pipeline step (30 seconds).
const DEFAULT_STEP_TIMEOUT_SECS: u64 = 30;

/// Pipeline configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub root: PathBuf,
    pub step_timeout: Duration,
}

impl PipelineConfig {
    /// Load configuration from environment.
    ///
    /// - `PIPELINE_ROOT` (optional, default `.`) — project root directory
    /// - `PIPELINE_STEP_TIMEOUT_SECS` (optional, default 30) — max seconds per step
    pub fn from_env() -> Result<Self, String> {
        let root = std::env::var("PIPELINE_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        let step_timeout_secs = match std::env::var("PIPELINE_STEP_TIMEOUT_SECS") {
            Ok(val) => val
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    "PIPELINE_STEP_TIMEOUT_SECS must be a positive integer".to_string()
                })?,
            Err(_) => DEFAULT_STEP_TIMEOUT_SECS,
        };

        Ok(Self {
            root,
            step_timeout: Duration::from_secs(step_timeout_secs),
        })
    }

    /// Configuration rooted at `root` with the default step timeout.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            step_timeout: Duration::from_secs(DEFAULT_STEP_TIMEOUT_SECS),
        }
    }

    pub fn layout(&self) -> ProjectLayout {
        ProjectLayout::new(&self.root)
    }
}

/// Fixed directory convention under the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.data_dir().join("raw")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.data_dir().join("processed")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join("app.log")
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.root.join("backups")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join("output")
    }

    pub fn restore_dir(&self) -> PathBuf {
        self.root.join("restored_data")
    }

    pub fn processed_report(&self) -> PathBuf {
        self.output_dir().join("processed_data.json")
    }

    pub fn fileinfo_document(&self) -> PathBuf {
        self.output_dir().join("fileinfo_data.json")
    }

    pub fn fileinfo_schema(&self) -> PathBuf {
        self.output_dir().join("fileinfo_schema.json")
    }

    /// Directories created by `init`, parents before children.
    pub fn directories(&self) -> Vec<PathBuf> {
        vec![
            self.data_dir(),
            self.raw_dir(),
            self.processed_dir(),
            self.logs_dir(),
            self.backups_dir(),
            self.output_dir(),
        ]
    }
}
