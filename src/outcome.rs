use std::fmt;

use serde::Serialize;

use crate::error::PipelineError;
use crate::validator::Violation;

/// Pipeline steps exposed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Init,
    Process,
    Describe,
    Validate,
    Backup,
    Restore,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Process => "process",
            Self::Describe => "describe",
            Self::Validate => "validate",
            Self::Backup => "backup",
            Self::Restore => "restore",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Ok,
    /// The step ran but schema validation reported violations.
    Invalid,
    Failed,
}

impl StepStatus {
    /// Process exit code for this status.
    ///
    /// ok → 0, failed → 1, invalid → 2
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::Failed => 1,
            Self::Invalid => 2,
        }
    }
}

/// Result of running one step: a status plus human-readable lines.
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub step: Step,
    pub status: StepStatus,
    pub lines: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
}

impl StepOutcome {
    pub fn ok(step: Step, lines: Vec<String>) -> Self {
        Self {
            step,
            status: StepStatus::Ok,
            lines,
            violations: Vec::new(),
        }
    }

    /// Outcome of a validation step. `Invalid` unless `violations` is empty.
    pub fn validated(step: Step, lines: Vec<String>, violations: Vec<Violation>) -> Self {
        let status = if violations.is_empty() {
            StepStatus::Ok
        } else {
            StepStatus::Invalid
        };
        Self {
            step,
            status,
            lines,
            violations,
        }
    }

    pub fn failed(step: Step, err: &PipelineError) -> Self {
        Self {
            step,
            status: StepStatus::Failed,
            lines: vec![err.to_string()],
            violations: Vec::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == StepStatus::Failed
    }
}
