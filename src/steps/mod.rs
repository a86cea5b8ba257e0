pub mod backup;
pub mod describe;
pub mod init;
pub mod process;
pub mod restore;
pub mod validate;

use std::time::Duration;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::outcome::{Step, StepOutcome};

/// Steps executed by [`run_pipeline`], in order.
pub const PIPELINE: [Step; 4] = [Step::Init, Step::Process, Step::Describe, Step::Backup];

/// Dispatch a step to its handler.
///
/// `validate` runs against the layout's default document and schema paths.
pub async fn dispatch(step: Step, config: &PipelineConfig) -> StepOutcome {
    match step {
        Step::Init => init::handle(config).await,
        Step::Process => process::handle(config).await,
        Step::Describe => describe::handle(config).await,
        Step::Validate => {
            let params = validate::ValidateParams::defaults(&config.layout());
            validate::handle(params, config).await
        }
        Step::Backup => backup::handle(config).await,
        Step::Restore => restore::handle(config).await,
    }
}

/// Run the full pipeline, stopping after the first failed step.
///
/// A step that reports validation violations does not stop the run.
pub async fn run_pipeline(config: &PipelineConfig) -> Vec<StepOutcome> {
    let mut outcomes = Vec::with_capacity(PIPELINE.len());
    for step in PIPELINE {
        let outcome = dispatch(step, config).await;
        let failed = outcome.is_failed();
        outcomes.push(outcome);
        if failed {
            tracing::warn!(step = %step, "pipeline stopped after failed step");
            break;
        }
    }
    outcomes
}

/// Run a step's synchronous filesystem work on a blocking thread, bounded
/// by `timeout`.
///
/// A timeout reports the step as failed but does not cancel the work: the
/// blocking thread runs to completion and may keep writing. Every step
/// overwrites its outputs, so re-running a timed-out step is safe.
pub async fn run_blocking<F>(step: Step, timeout: Duration, work: F) -> StepOutcome
where
    F: FnOnce() -> PipelineResult<StepOutcome> + Send + 'static,
{
    let task = tokio::task::spawn_blocking(work);

    let err = match tokio::time::timeout(timeout, task).await {
        Ok(Ok(Ok(outcome))) => return outcome,
        Ok(Ok(Err(err))) => err,
        Ok(Err(join_err)) => PipelineError::Join(join_err.to_string()),
        Err(_) => PipelineError::Timeout(timeout.as_secs()),
    };

    tracing::error!(step = %step, error = %err, "step failed");
    StepOutcome::failed(step, &err)
}
