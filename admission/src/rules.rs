use crate::error::{self, Result};
use crate::field::{FieldError, FieldPath};
use crate::secrets::SecretReader;
use log::trace;
use tokio_util::sync::CancellationToken;

/// Accumulates the findings of a validation pass. The buffer is append-only: rules emit in their
/// documented order and nothing reorders or deduplicates afterwards, so the rendered verdict is
/// stable for a given input.
#[derive(Debug, Default)]
pub struct RuleReport {
    pub errors: Vec<FieldError>,
    pub warnings: Vec<String>,
}

impl RuleReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, error: FieldError) {
        trace!("field error: {}", error);
        self.errors.push(error);
    }

    pub fn warn<S>(&mut self, warning: S)
    where
        S: Into<String>,
    {
        let warning = warning.into();
        trace!("warning: {}", warning);
        self.warnings.push(warning);
    }

    pub fn merge(&mut self, other: RuleReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    pub fn is_allowed(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Emit a `Required value` error when a string field is empty, using the
/// `expected <path> to be populated` wording.
pub(crate) fn require_populated(report: &mut RuleReport, value: &str, path: &FieldPath) {
    if value.is_empty() {
        report.error(FieldError::required(
            path,
            format!("expected {} to be populated", path),
        ));
    }
}

/// Emit a `Required value` error when a reference field is absent, using the
/// `expected <path> to be populated` wording.
pub(crate) fn require_ref<T>(report: &mut RuleReport, reference: Option<&T>, path: &FieldPath) {
    if reference.is_none() {
        report.error(FieldError::required(
            path,
            format!("expected {} to be populated", path),
        ));
    }
}

/// Look up a referenced secret through the cluster-state reader. A missing secret is a warning,
/// never an error: the secret may legitimately be created after the machine is admitted. Reader
/// faults propagate, and cancellation aborts the lookup.
pub(crate) async fn check_secret_exists(
    secrets: &dyn SecretReader,
    cancel: &CancellationToken,
    namespace: &str,
    name: &str,
    path: &FieldPath,
    report: &mut RuleReport,
) -> Result<()> {
    let secret = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(error::CancelledSnafu {}.build().into()),
        result = secrets.get_secret(namespace, name) => result?,
    };
    if secret.is_none() {
        report.warn(
            FieldError::invalid(path, name, "not found. Expected CredentialsSecret to exist")
                .to_string(),
        );
    }
    Ok(())
}
