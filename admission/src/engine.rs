use crate::context::{AdmissionContext, EngineConfig, Operation};
use crate::error::{self, Result};
use crate::field::{join_errors, FieldError, FieldErrorKind, FieldPath};
use crate::policy;
use crate::registry::Registry;
use crate::rules::RuleReport;
use crate::secrets::SecretReader;
use json_patch::Patch;
use log::{debug, error};
use machine_model::{codec, Machine, MachineExt, PlatformType, TypedProviderSpec};
use serde::Serialize;
use snafu::ResultExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A typed admission request: the operation, the machine as submitted, and on update the machine
/// as the cluster currently stores it. The wire envelope that carries these is the host's
/// concern.
#[derive(Clone, Debug)]
pub struct AdmissionRequest {
    pub operation: Operation,
    pub machine: Machine,
    pub old_machine: Option<Machine>,
}

/// The engine's decision about one admission request.
#[derive(Clone, Debug)]
pub struct AdmissionVerdict {
    pub allowed: bool,
    pub errors: Vec<FieldError>,
    pub warnings: Vec<String>,
    /// The machine after defaulting, present only when defaulting changed it.
    pub mutated: Option<Machine>,
}

impl AdmissionVerdict {
    /// The user-visible denial message: one error rendered bare, several joined in brackets.
    pub fn message(&self) -> Option<String> {
        join_errors(&self.errors)
    }
}

/// What goes back across the admission boundary: the verdict, its warnings, and an RFC 6902
/// patch from the submitted machine to the mutated one when defaulting fired.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionResponse {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Patch>,
}

impl AdmissionResponse {
    /// Assemble the boundary response from a verdict, diffing the submitted machine against the
    /// mutated one. A denied response never carries a patch.
    pub fn from_verdict(original: &Machine, verdict: AdmissionVerdict) -> Result<Self> {
        let patch = match verdict.mutated.as_ref().filter(|_| verdict.allowed) {
            None => None,
            Some(mutated) => {
                let left =
                    serde_json::to_value(original).context(error::PatchSerializationSnafu)?;
                let right =
                    serde_json::to_value(mutated).context(error::PatchSerializationSnafu)?;
                Some(json_patch::diff(&left, &right))
            }
        };
        Ok(Self {
            allowed: verdict.allowed,
            message: verdict.message(),
            warnings: verdict.warnings,
            patch,
        })
    }

    fn internal_error(error: &crate::Error) -> Self {
        Self {
            allowed: false,
            message: Some(format!("internal error: {}", error)),
            warnings: Vec::new(),
            patch: None,
        }
    }
}

/// The admission orchestrator. Holds the per-cluster configuration, the platform registry, and
/// the cluster-state reader; everything else is per-request. The engine keeps no state across
/// requests and may be driven concurrently.
pub struct AdmissionEngine {
    config: EngineConfig,
    registry: Registry,
    secrets: Arc<dyn SecretReader>,
}

impl AdmissionEngine {
    pub fn new(config: EngineConfig, secrets: Arc<dyn SecretReader>) -> Self {
        Self {
            config,
            registry: Registry::new(),
            secrets,
        }
    }

    /// Run one admission request through decode, defaulting (create only), the platform
    /// validator, and the cross-platform policy layer. Errors returned here are internal faults;
    /// rule findings land in the verdict.
    pub async fn admit(
        &self,
        request: &AdmissionRequest,
        cancel: &CancellationToken,
    ) -> Result<AdmissionVerdict> {
        let mut machine = request.machine.clone();
        let mut report = RuleReport::new();
        let mut mutated = false;
        debug!(
            "{} of machine '{}/{}' on platform {}",
            request.operation,
            machine.object_namespace(),
            machine.object_name(),
            self.config.platform
        );

        let ctx = AdmissionContext::new(&self.config, request.operation, request.old_machine.as_ref());
        let bundle = self.registry.lookup(&self.config.platform);

        if let PlatformType::Other(_) = &self.config.platform {
            // No typed form exists; the pass-through bundle warns that nothing was validated.
            let platform_report = bundle
                .validator
                .validate(&machine, None, &ctx, self.secrets.as_ref(), cancel)
                .await?;
            report.merge(platform_report);
        } else {
            match self.decode(&machine, &mut report) {
                None => {}
                Some(mut spec) => {
                    if ctx.operation == Operation::Create
                        && bundle.defaulter.apply_defaults(&mut spec, &ctx)
                    {
                        machine.spec.provider_spec.value =
                            Some(codec::encode(&spec).context(error::CodecSnafu)?);
                        mutated = true;
                    }
                    let platform_report = bundle
                        .validator
                        .validate(&machine, Some(&spec), &ctx, self.secrets.as_ref(), cancel)
                        .await?;
                    report.merge(platform_report);
                }
            }
        }

        for policy_error in policy::validate_lifecycle_hooks(&machine, ctx.old_machine) {
            report.error(policy_error);
        }
        if ctx.operation == Operation::Create
            && policy::default_cluster_id_label(&mut machine, ctx.cluster_id)
        {
            mutated = true;
        }

        let allowed = report.is_allowed();
        if !allowed {
            debug!(
                "denying machine '{}': {}",
                machine.object_name(),
                join_errors(&report.errors).unwrap_or_default()
            );
        }
        Ok(AdmissionVerdict {
            allowed,
            errors: report.errors,
            warnings: report.warnings,
            mutated: mutated.then(|| machine),
        })
    }

    /// Run one request end to end and translate internal faults into denied responses, so the
    /// transport always has something well-formed to send back.
    pub async fn handle(
        &self,
        request: &AdmissionRequest,
        cancel: &CancellationToken,
    ) -> AdmissionResponse {
        match self.admit(request, cancel).await {
            Ok(verdict) => match AdmissionResponse::from_verdict(&request.machine, verdict) {
                Ok(response) => response,
                Err(fault) => {
                    error!("unable to assemble admission response: {}", fault);
                    AdmissionResponse::internal_error(&fault)
                }
            },
            Err(fault) => {
                error!(
                    "internal fault admitting machine '{}': {}",
                    request.machine.object_name(),
                    fault
                );
                AdmissionResponse::internal_error(&fault)
            }
        }
    }

    /// Decode the machine's provider-spec payload. An absent payload and a payload that does not
    /// parse both short-circuit platform rules by reporting on `providerSpec.value` and
    /// returning `None`.
    fn decode(&self, machine: &Machine, report: &mut RuleReport) -> Option<TypedProviderSpec> {
        let value_path = FieldPath::new("providerSpec").child("value");
        match codec::decode(
            &self.config.platform,
            machine.spec.provider_spec.value.as_ref(),
        ) {
            Ok(Some(spec)) => Some(spec),
            Ok(None) => {
                report.error(FieldError::required(&value_path, "a value must be provided"));
                None
            }
            Err(source) => {
                report.error(FieldError {
                    path: value_path.to_string(),
                    kind: FieldErrorKind::Invalid,
                    bad_value: None,
                    detail: format!("could not decode provider spec: {}", source),
                });
                None
            }
        }
    }
}
