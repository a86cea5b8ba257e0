use std::path::{Path, PathBuf};

use crate::config::{PipelineConfig, ProjectLayout};
use crate::error::PipelineResult;
use crate::fileinfo;
use crate::outcome::{Step, StepOutcome};
use crate::report;
use crate::schema::{self, Schema};
use crate::validator::{self, Violation};

/// Document/schema pair to validate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateParams {
    pub document: PathBuf,
    pub schema: PathBuf,
}

impl ValidateParams {
    /// `output/fileinfo_data.json` against `output/fileinfo_schema.json`.
    pub fn defaults(layout: &ProjectLayout) -> Self {
        Self {
            document: layout.fileinfo_document(),
            schema: layout.fileinfo_schema(),
        }
    }
}

/// Handle the `validate` step.
pub async fn handle(params: ValidateParams, config: &PipelineConfig) -> StepOutcome {
    super::run_blocking(Step::Validate, config.step_timeout, move || {
        let violations = validate_files(&params.document, &params.schema)?;
        Ok(validation_outcome(Step::Validate, &params.document, violations))
    })
    .await
}

/// Load both files and run the hand-written validator.
///
/// A schema that a standard JSON Schema engine cannot compile is logged as
/// a warning; validation proceeds regardless.
pub fn validate_files(document: &Path, schema_path: &Path) -> PipelineResult<Vec<Violation>> {
    let document_value = fileinfo::read_json(document)?;
    let schema_value = fileinfo::read_json(schema_path)?;

    if let Err(e) = schema::compile_check(&schema_value) {
        tracing::warn!(schema = %schema_path.display(), error = %e, "schema is not valid JSON Schema");
    }

    let violations = validator::validate(&document_value, &Schema::from_value(&schema_value));
    report::log_outcome(&fileinfo::file_name(document), &violations);
    Ok(violations)
}

pub(crate) fn validation_outcome(
    step: Step,
    document: &Path,
    violations: Vec<Violation>,
) -> StepOutcome {
    let name = fileinfo::file_name(document);
    let mut lines = Vec::with_capacity(violations.len() + 1);
    if violations.is_empty() {
        lines.push(format!("{name} is valid against the schema"));
    } else {
        lines.push(format!(
            "{name}: {} schema violation(s) found",
            violations.len()
        ));
        lines.extend(
            report::render(&violations)
                .into_iter()
                .map(|line| format!("  - {line}")),
        );
    }
    StepOutcome::validated(step, lines, violations)
}
