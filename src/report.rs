use crate::validator::Violation;

/// Render one violation as a single human-readable line.
pub fn render_line(violation: &Violation) -> String {
    match violation.index() {
        Some(index) => format!("[{index}] {violation}"),
        None => violation.to_string(),
    }
}

/// Render every violation, in order.
pub fn render(violations: &[Violation]) -> Vec<String> {
    violations.iter().map(render_line).collect()
}

/// Log the outcome of validating `document`.
///
/// A clean result is logged at `info`; otherwise all violations are joined
/// into a single `error` event.
pub fn log_outcome(document: &str, violations: &[Violation]) {
    if violations.is_empty() {
        tracing::info!(document, "document passed schema validation");
    } else {
        let joined = render(violations).join("; ");
        tracing::error!(
            document,
            count = violations.len(),
            "schema validation errors: {joined}"
        );
    }
}
