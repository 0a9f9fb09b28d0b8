/*!

The platform handlers. Each platform pairs a validator, which composes the field rules for that
platform in a fixed documented order, with a defaulter, which fills in absent fields. The
handlers are the only site of platform-specific policy; everything reaches them through the
registry's lookup.

!*/

use crate::context::AdmissionContext;
use crate::error::Result;
use crate::rules::RuleReport;
use crate::secrets::SecretReader;
use async_trait::async_trait;
use machine_model::{Machine, TypedProviderSpec};
use tokio_util::sync::CancellationToken;

pub mod aws;
pub mod azure;
pub mod gcp;
pub mod noop;
pub mod vsphere;

/// Validates a machine's decoded provider spec. `spec` is `None` only for platforms the engine
/// does not recognize, where no typed form exists.
#[async_trait]
pub trait Validator: Send + Sync {
    async fn validate(
        &self,
        machine: &Machine,
        spec: Option<&TypedProviderSpec>,
        ctx: &AdmissionContext<'_>,
        secrets: &dyn SecretReader,
        cancel: &CancellationToken,
    ) -> Result<RuleReport>;
}

/// Fills in absent provider-spec fields on create. Returns true when anything was written so the
/// orchestrator knows to re-encode the payload.
pub trait Defaulter: Send + Sync {
    fn apply_defaults(&self, spec: &mut TypedProviderSpec, ctx: &AdmissionContext<'_>) -> bool;
}

/// The validator/defaulter pair the registry hands out for a platform.
pub struct HandlerBundle {
    pub validator: Box<dyn Validator>,
    pub defaulter: Box<dyn Defaulter>,
}
