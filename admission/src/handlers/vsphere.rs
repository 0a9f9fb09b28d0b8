use crate::context::AdmissionContext;
use crate::error::Result;
use crate::field::{FieldError, FieldPath};
use crate::handlers::{Defaulter, Validator};
use crate::rules::{check_secret_exists, RuleReport};
use crate::secrets::SecretReader;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::LocalObjectReference;
use machine_model::constants::{
    DEFAULT_USER_DATA_SECRET, DEFAULT_VSPHERE_CREDENTIALS_SECRET, VSPHERE_MIN_DISK_GIB,
    VSPHERE_MIN_MEMORY_MIB, VSPHERE_MIN_NUM_CPUS,
};
use machine_model::{Machine, MachineExt, TypedProviderSpec};
use tokio_util::sync::CancellationToken;

pub struct VSphereValidator;

#[async_trait]
impl Validator for VSphereValidator {
    // Rule order is part of this handler's contract: template, workspace, network devices, the
    // machine sizing warnings, userDataSecret, credentialsSecret.
    async fn validate(
        &self,
        machine: &Machine,
        spec: Option<&TypedProviderSpec>,
        _ctx: &AdmissionContext<'_>,
        secrets: &dyn SecretReader,
        cancel: &CancellationToken,
    ) -> Result<RuleReport> {
        let mut report = RuleReport::new();
        let vsphere = match spec {
            Some(TypedProviderSpec::VSphere(vsphere)) => vsphere,
            _ => return Ok(report),
        };
        let provider_spec = FieldPath::new("providerSpec");

        if vsphere.template.is_empty() {
            report.error(FieldError::required(
                &provider_spec.child("template"),
                "template must be provided",
            ));
        }

        let workspace = provider_spec.child("workspace");
        match &vsphere.workspace {
            None => report.error(FieldError::required(
                &workspace,
                "workspace must be provided",
            )),
            Some(space) => {
                if space.server.is_empty() {
                    report.error(FieldError::required(
                        &workspace.child("server"),
                        "server must be provided",
                    ));
                }
                if space.datacenter.is_empty() {
                    report.warn(format!(
                        "{}: datacenter is unset: if more than one datacenter is present, \
                         VMs cannot be created",
                        workspace.child("datacenter")
                    ));
                }
                if !space.folder.is_empty() && !space.datacenter.is_empty() {
                    let expected_prefix = format!("/{}/vm/", space.datacenter);
                    if !space.folder.starts_with(&expected_prefix) {
                        report.error(FieldError::invalid(
                            &workspace.child("folder"),
                            space.folder.as_str(),
                            format!(
                                "folder must be absolute path: expected prefix \"{}\"",
                                expected_prefix
                            ),
                        ));
                    }
                }
            }
        }

        let devices = provider_spec.child("network").child("devices");
        if vsphere.network.devices.is_empty() {
            report.error(FieldError::required(
                &devices,
                "at least 1 network device must be provided",
            ));
        }
        for (i, device) in vsphere.network.devices.iter().enumerate() {
            if device.network_name.is_empty() {
                report.error(FieldError::required(
                    &devices.index(i).child("networkName"),
                    "networkName must be provided",
                ));
            }
        }

        if vsphere.num_cpus < VSPHERE_MIN_NUM_CPUS {
            report.warn(format!(
                "{}: {} is missing or less than the minimum value ({}): \
                 nodes may not boot correctly",
                provider_spec.child("numCPUs"),
                vsphere.num_cpus,
                VSPHERE_MIN_NUM_CPUS
            ));
        }
        if vsphere.memory_mib < VSPHERE_MIN_MEMORY_MIB {
            report.warn(format!(
                "{}: {} is missing or less than the minimum value ({}): \
                 nodes may not boot correctly",
                provider_spec.child("memoryMiB"),
                vsphere.memory_mib,
                VSPHERE_MIN_MEMORY_MIB
            ));
        }
        if vsphere.disk_gib < VSPHERE_MIN_DISK_GIB {
            report.warn(format!(
                "{}: {} is missing or less than the minimum value ({}): \
                 nodes may not boot correctly",
                provider_spec.child("diskGiB"),
                vsphere.disk_gib,
                VSPHERE_MIN_DISK_GIB
            ));
        }

        let user_data_secret = provider_spec.child("userDataSecret");
        match &vsphere.user_data_secret {
            None => report.error(FieldError::required(
                &user_data_secret,
                "userDataSecret must be provided",
            )),
            Some(reference) => {
                if reference.name.as_deref().map_or(true, str::is_empty) {
                    report.error(FieldError::required(
                        &user_data_secret.child("name"),
                        "name must be provided",
                    ));
                }
            }
        }

        let credentials_secret = provider_spec.child("credentialsSecret");
        match &vsphere.credentials_secret {
            None => report.error(FieldError::required(
                &credentials_secret,
                "credentialsSecret must be provided",
            )),
            Some(reference) => match reference.name.as_deref() {
                None | Some("") => report.error(FieldError::required(
                    &credentials_secret.child("name"),
                    "name must be provided",
                )),
                Some(name) => {
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
            },
        }

        Ok(report)
    }
}

pub struct VSphereDefaulter;

impl Defaulter for VSphereDefaulter {
    fn apply_defaults(&self, spec: &mut TypedProviderSpec, _ctx: &AdmissionContext<'_>) -> bool {
        let vsphere = match spec {
            TypedProviderSpec::VSphere(vsphere) => vsphere,
            _ => return false,
        };
        let mut changed = false;
        if vsphere.user_data_secret.is_none() {
            vsphere.user_data_secret = Some(LocalObjectReference {
                name: Some(DEFAULT_USER_DATA_SECRET.to_string()),
            });
            changed = true;
        }
        if vsphere.credentials_secret.is_none() {
            vsphere.credentials_secret = Some(LocalObjectReference {
                name: Some(DEFAULT_VSPHERE_CREDENTIALS_SECRET.to_string()),
            });
            changed = true;
        }
        changed
    }
}
