use crate::context::AdmissionContext;
use crate::error::Result;
use crate::field::{FieldError, FieldPath};
use crate::handlers::{Defaulter, Validator};
use crate::rules::{check_secret_exists, require_populated, require_ref, RuleReport};
use crate::secrets::SecretReader;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::LocalObjectReference;
use machine_model::constants::{
    DEFAULT_AWS_CREDENTIALS_SECRET, DEFAULT_AWS_INSTANCE_TYPE_ARM, DEFAULT_AWS_INSTANCE_TYPE_X86,
    DEFAULT_USER_DATA_SECRET,
};
use machine_model::providers::AwsTag;
use machine_model::{Machine, MachineExt, TypedProviderSpec};
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

const ALLOWED_TENANCIES: [&str; 3] = ["default", "dedicated", "host"];

pub struct AwsValidator;

#[async_trait]
impl Validator for AwsValidator {
    // Rule order is part of this handler's contract: ami, placement.region, instanceType,
    // userDataSecret, credentialsSecret, tenancy, then the non-fatal checks.
    async fn validate(
        &self,
        machine: &Machine,
        spec: Option<&TypedProviderSpec>,
        _ctx: &AdmissionContext<'_>,
        secrets: &dyn SecretReader,
        cancel: &CancellationToken,
    ) -> Result<RuleReport> {
        let mut report = RuleReport::new();
        let aws = match spec {
            Some(TypedProviderSpec::Aws(aws)) => aws,
            _ => return Ok(report),
        };
        let provider_spec = FieldPath::new("providerSpec");

        if aws.ami.id.as_deref().map_or(true, str::is_empty) {
            report.error(FieldError::required(
                &provider_spec.child("ami"),
                format!(
                    "expected {} to be populated",
                    provider_spec.child("ami").child("id")
                ),
            ));
        }
        require_populated(
            &mut report,
            &aws.placement.region,
            &provider_spec.child("placement").child("region"),
        );
        require_populated(
            &mut report,
            &aws.instance_type,
            &provider_spec.child("instanceType"),
        );
        require_ref(
            &mut report,
            aws.user_data_secret.as_ref(),
            &provider_spec.child("userDataSecret"),
        );
        let credentials_secret = provider_spec.child("credentialsSecret");
        match &aws.credentials_secret {
            None => require_ref::<LocalObjectReference>(&mut report, None, &credentials_secret),
            Some(reference) => {
                if let Some(name) = reference.name.as_deref() {
                    check_secret_exists(
                        secrets,
                        cancel,
                        machine.object_namespace(),
                        name,
                        &credentials_secret,
                        &mut report,
                    )
                    .await?;
                }
            }
        }
        let tenancy = aws.placement.tenancy.as_str();
        if !tenancy.is_empty() && !ALLOWED_TENANCIES.contains(&tenancy) {
            report.error(FieldError::invalid(
                &provider_spec.child("tenancy"),
                tenancy,
                "Invalid providerSpec.tenancy, the only allowed options are: \
                 default, dedicated, host",
            ));
        }

        if aws.ami.arn.is_some() {
            report.warn(
                "can't use providerSpec.ami.arn, \
                 only providerSpec.ami.id can be used to reference AMI",
            );
        }
        if !aws.ami.filters.is_empty() {
            report.warn(
                "can't use providerSpec.ami.filters, \
                 only providerSpec.ami.id can be used to reference AMI",
            );
        }
        if aws.subnet.is_unset() {
            report.warn(
                "providerSpec.subnet: No subnet has been provided. Instances may be created in \
                 an unexpected subnet and may not join the cluster.",
            );
        }
        if aws.iam_instance_profile.is_none() {
            report.warn(
                "providerSpec.iamInstanceProfile: no IAM instance profile provided: \
                 nodes may be unable to join the cluster",
            );
        }
        let duplicates = duplicated_tag_names(&aws.tags);
        if !duplicates.is_empty() {
            report.warn(format!(
                "providerSpec.tags: duplicated tag names ({}): \
                 only the first value will be used.",
                duplicates.join(",")
            ));
        }
        Ok(report)
    }
}

/// Tag names that appear more than once, in first-seen order.
fn duplicated_tag_names(tags: &[AwsTag]) -> Vec<String> {
    let mut counts = HashMap::new();
    for tag in tags {
        *counts.entry(tag.name.as_str()).or_insert(0usize) += 1;
    }
    let mut duplicates: Vec<String> = Vec::new();
    for tag in tags {
        if counts.get(tag.name.as_str()).copied().unwrap_or(0) >= 2
            && !duplicates.iter().any(|name| name == &tag.name)
        {
            duplicates.push(tag.name.clone());
        }
    }
    duplicates
}

pub struct AwsDefaulter;

impl Defaulter for AwsDefaulter {
    fn apply_defaults(&self, spec: &mut TypedProviderSpec, ctx: &AdmissionContext<'_>) -> bool {
        let aws = match spec {
            TypedProviderSpec::Aws(aws) => aws,
            _ => return false,
        };
        let mut changed = false;
        if aws.instance_type.is_empty() {
            aws.instance_type = default_instance_type().to_string();
            changed = true;
        }
        if aws.placement.region.is_empty() {
            if let Some(status) = &ctx.platform_status.aws {
                aws.placement.region = status.region.clone();
                changed = true;
            }
        }
        if aws.user_data_secret.is_none() {
            aws.user_data_secret = Some(LocalObjectReference {
                name: Some(DEFAULT_USER_DATA_SECRET.to_string()),
            });
            changed = true;
        }
        if aws.credentials_secret.is_none() {
            aws.credentials_secret = Some(LocalObjectReference {
                name: Some(DEFAULT_AWS_CREDENTIALS_SECRET.to_string()),
            });
            changed = true;
        }
        changed
    }
}

fn default_instance_type() -> &'static str {
    if cfg!(target_arch = "aarch64") {
        DEFAULT_AWS_INSTANCE_TYPE_ARM
    } else {
        DEFAULT_AWS_INSTANCE_TYPE_X86
    }
}
