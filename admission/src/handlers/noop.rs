use crate::context::AdmissionContext;
use crate::error::Result;
use crate::handlers::{Defaulter, Validator};
use crate::rules::RuleReport;
use crate::secrets::SecretReader;
use async_trait::async_trait;
use machine_model::{Machine, TypedProviderSpec};
use tokio_util::sync::CancellationToken;

/// The warning attached to machines on platforms the engine does not recognize.
pub const UNRECOGNIZED_PLATFORM_WARNING: &str = "platform not recognized; machine not validated";

/// Pass-through validator for unrecognized platforms: the machine is admitted unvalidated with a
/// warning saying so.
pub struct NoOpValidator;

#[async_trait]
impl Validator for NoOpValidator {
    async fn validate(
        &self,
        _machine: &Machine,
        _spec: Option<&TypedProviderSpec>,
        _ctx: &AdmissionContext<'_>,
        _secrets: &dyn SecretReader,
        _cancel: &CancellationToken,
    ) -> Result<RuleReport> {
        let mut report = RuleReport::new();
        report.warn(UNRECOGNIZED_PLATFORM_WARNING);
        Ok(report)
    }
}

/// Pass-through defaulter for unrecognized platforms.
pub struct NoOpDefaulter;

impl Defaulter for NoOpDefaulter {
    fn apply_defaults(&self, _spec: &mut TypedProviderSpec, _ctx: &AdmissionContext<'_>) -> bool {
        false
    }
}
