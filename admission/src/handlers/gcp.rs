use crate::context::AdmissionContext;
use crate::error::Result;
use crate::field::{FieldError, FieldPath};
use crate::handlers::{Defaulter, Validator};
use crate::rules::{check_secret_exists, RuleReport};
use crate::secrets::SecretReader;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::LocalObjectReference;
use machine_model::constants::{
    DEFAULT_GCP_CREDENTIALS_SECRET, DEFAULT_GCP_DISK_SIZE_GB, DEFAULT_GCP_DISK_TYPE,
    DEFAULT_GCP_MACHINE_TYPE, DEFAULT_USER_DATA_SECRET, GCP_A2_MACHINE_PREFIX,
    GCP_MAX_DISK_SIZE_GB, GCP_MIN_DISK_SIZE_GB,
};
use machine_model::providers::{GcpDisk, GcpNetworkInterface};
use machine_model::{Machine, MachineExt, TypedProviderSpec};
use tokio_util::sync::CancellationToken;

const ALLOWED_DISK_TYPES: [&str; 2] = ["pd-ssd", "pd-standard"];
const ALLOWED_HOST_MAINTENANCE: [&str; 2] = ["Migrate", "Terminate"];
const ALLOWED_RESTART_POLICIES: [&str; 2] = ["Always", "Never"];
const A100_GPU_TYPE: &str = "nvidia-tesla-a100";

pub struct GcpValidator;

#[async_trait]
impl Validator for GcpValidator {
    // Rule order is part of this handler's contract: region, zone, machineType,
    // networkInterfaces, disks, serviceAccounts, userDataSecret, credentialsSecret, gpus, then
    // the maintenance policies.
    async fn validate(
        &self,
        machine: &Machine,
        spec: Option<&TypedProviderSpec>,
        _ctx: &AdmissionContext<'_>,
        secrets: &dyn SecretReader,
        cancel: &CancellationToken,
    ) -> Result<RuleReport> {
        let mut report = RuleReport::new();
        let gcp = match spec {
            Some(TypedProviderSpec::Gcp(gcp)) => gcp,
            _ => return Ok(report),
        };
        let provider_spec = FieldPath::new("providerSpec");

        if gcp.region.is_empty() {
            report.error(FieldError::required(
                &provider_spec.child("region"),
                "region is required",
            ));
        }
        // Without a region there is nothing to check the zone against, and the missing region
        // already has its own error.
        if !gcp.region.is_empty() && !gcp.zone.starts_with(&format!("{}-", gcp.region)) {
            report.error(FieldError::invalid(
                &provider_spec.child("zone"),
                gcp.zone.as_str(),
                format!("zone not in configured region ({})", gcp.region),
            ));
        }
        if gcp.machine_type.is_empty() {
            report.error(FieldError::required(
                &provider_spec.child("machineType"),
                "machineType should be set to one of the supported GCP machine types",
            ));
        }

        let network_interfaces = provider_spec.child("networkInterfaces");
        if gcp.network_interfaces.is_empty() {
            report.error(FieldError::required(
                &network_interfaces,
                "at least 1 network interface is required",
            ));
        }
        for (i, interface) in gcp.network_interfaces.iter().enumerate() {
            if interface.network.is_empty() {
                report.error(FieldError::required(
                    &network_interfaces.index(i).child("network"),
                    "network is required",
                ));
            }
            if interface.subnetwork.is_empty() {
                report.error(FieldError::required(
                    &network_interfaces.index(i).child("subnetwork"),
                    "subnetwork is required",
                ));
            }
        }

        let disks = provider_spec.child("disks");
        if gcp.disks.is_empty() {
            report.error(FieldError::required(&disks, "at least 1 disk is required"));
        }
        for (i, disk) in gcp.disks.iter().enumerate() {
            if disk.size_gb < GCP_MIN_DISK_SIZE_GB {
                report.error(FieldError::invalid(
                    &disks.index(i).child("sizeGb"),
                    disk.size_gb,
                    "must be at least 16GB in size",
                ));
            } else if disk.size_gb > GCP_MAX_DISK_SIZE_GB {
                report.error(FieldError::invalid(
                    &disks.index(i).child("sizeGb"),
                    disk.size_gb,
                    "exceeding maximum GCP disk size limit, must be below 65536",
                ));
            }
            if !disk.type_.is_empty() && !ALLOWED_DISK_TYPES.contains(&disk.type_.as_str()) {
                report.error(FieldError::unsupported(
                    &disks.index(i).child("type"),
                    disk.type_.as_str(),
                    &ALLOWED_DISK_TYPES,
                ));
            }
        }

        let service_accounts = provider_spec.child("serviceAccounts");
        match gcp.service_accounts.as_slice() {
            [] => report.warn(format!(
                "{}: no service account provided: nodes may be unable to join the cluster",
                service_accounts
            )),
            [account] => {
                if account.email.is_empty() {
                    report.error(FieldError::required(
                        &service_accounts.index(0).child("email"),
                        "email is required",
                    ));
                }
                if account.scopes.is_empty() {
                    report.error(FieldError::required(
                        &service_accounts.index(0).child("scopes"),
                        "at least 1 scope is required",
                    ));
                }
            }
            many => report.error(FieldError::invalid(
                &service_accounts,
                format!("{} service accounts supplied", many.len()),
                "exactly 1 service account must be supplied",
            )),
        }

        let user_data_secret = provider_spec.child("userDataSecret");
        match &gcp.user_data_secret {
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
        match &gcp.credentials_secret {
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

        let gpus = provider_spec.child("gpus");
        let a2_machine = gcp.machine_type.starts_with(GCP_A2_MACHINE_PREFIX);
        if gcp.gpus.len() > 1 {
            report.error(FieldError::too_many(&gpus, gcp.gpus.len(), 1));
        }
        for (i, gpu) in gcp.gpus.iter().enumerate() {
            if gpu.type_.is_empty() {
                report.error(FieldError::required(
                    &gpus.index(i).child("type"),
                    "type is required",
                ));
            } else if a2_machine {
                report.error(FieldError::invalid(
                    &gpus.index(i).child("type"),
                    gpu.type_.as_str(),
                    "A2 machine types have already attached gpus, \
                     additional gpus cannot be specified",
                ));
            } else if gpu.type_ == A100_GPU_TYPE {
                report.error(FieldError::invalid(
                    &gpus.index(i).child("type"),
                    gpu.type_.as_str(),
                    "nvidia-tesla-a100 gpus, are only attached to the A2 machine types",
                ));
            }
        }

        let on_host_maintenance = provider_spec.child("onHostMaintenance");
        if !gcp.on_host_maintenance.is_empty()
            && !ALLOWED_HOST_MAINTENANCE.contains(&gcp.on_host_maintenance.as_str())
        {
            report.error(FieldError::unsupported(
                &on_host_maintenance,
                gcp.on_host_maintenance.as_str(),
                &ALLOWED_HOST_MAINTENANCE,
            ));
        }
        if !gcp.restart_policy.is_empty()
            && !ALLOWED_RESTART_POLICIES.contains(&gcp.restart_policy.as_str())
        {
            report.error(FieldError::unsupported(
                &provider_spec.child("restartPolicy"),
                gcp.restart_policy.as_str(),
                &ALLOWED_RESTART_POLICIES,
            ));
        }
        if (!gcp.gpus.is_empty() || a2_machine) && gcp.on_host_maintenance != "Terminate" {
            report.error(FieldError::forbidden(
                &on_host_maintenance,
                "when GPUs are specified or the machine type has pre-attached GPUs, \
                 onHostMaintenance must be set to Terminate",
            ));
        }

        Ok(report)
    }
}

pub struct GcpDefaulter;

impl Defaulter for GcpDefaulter {
    fn apply_defaults(&self, spec: &mut TypedProviderSpec, ctx: &AdmissionContext<'_>) -> bool {
        let gcp = match spec {
            TypedProviderSpec::Gcp(gcp) => gcp,
            _ => return false,
        };
        let cluster_id = ctx.cluster_id;
        let mut changed = false;

        if gcp.machine_type.is_empty() {
            gcp.machine_type = DEFAULT_GCP_MACHINE_TYPE.to_string();
            changed = true;
        }
        if gcp.network_interfaces.is_empty() {
            gcp.network_interfaces = vec![GcpNetworkInterface {
                network: format!("{}-network", cluster_id),
                subnetwork: format!("{}-worker-subnet", cluster_id),
                ..GcpNetworkInterface::default()
            }];
            changed = true;
        }
        let default_image = format!("{}-rhcos-image", cluster_id);
        if gcp.disks.is_empty() {
            gcp.disks = vec![GcpDisk {
                auto_delete: true,
                boot: true,
                size_gb: DEFAULT_GCP_DISK_SIZE_GB,
                type_: DEFAULT_GCP_DISK_TYPE.to_string(),
                image: default_image,
                ..GcpDisk::default()
            }];
            changed = true;
        } else {
            // Existing disks are preserved field by field; only unset subfields are filled.
            for disk in &mut gcp.disks {
                if disk.type_.is_empty() {
                    disk.type_ = DEFAULT_GCP_DISK_TYPE.to_string();
                    changed = true;
                }
                if disk.image.is_empty() {
                    disk.image = default_image.clone();
                    changed = true;
                }
            }
        }
        if gcp.tags.is_empty() {
            gcp.tags = vec![format!("{}-worker", cluster_id)];
            changed = true;
        }
        if gcp.user_data_secret.is_none() {
            gcp.user_data_secret = Some(LocalObjectReference {
                name: Some(DEFAULT_USER_DATA_SECRET.to_string()),
            });
            changed = true;
        }
        if gcp.credentials_secret.is_none() {
            gcp.credentials_secret = Some(LocalObjectReference {
                name: Some(DEFAULT_GCP_CREDENTIALS_SECRET.to_string()),
            });
            changed = true;
        }
        for gpu in &mut gcp.gpus {
            if gpu.count == 0 {
                gpu.count = 1;
                changed = true;
            }
        }

        changed
    }
}

#[cfg(test)]
mod test {
    use super::{GcpDefaulter, GcpValidator};
    use crate::context::{AdmissionContext, EngineConfig, Operation};
    use crate::handlers::{Defaulter, Validator};
    use crate::rules::RuleReport;
    use crate::secrets::InMemorySecretReader;
    use k8s_openapi::api::core::v1::LocalObjectReference;
    use machine_model::providers::{
        GcpDisk, GcpGpuConfig, GcpNetworkInterface, GcpProviderSpec, GcpServiceAccount,
    };
    use machine_model::{
        DnsConfig, GcpPlatformStatus, Machine, MachineSpec, PlatformStatus, PlatformType,
        TypedProviderSpec,
    };
    use tokio_util::sync::CancellationToken;

    fn config() -> EngineConfig {
        EngineConfig {
            platform: PlatformType::Gcp,
            platform_status: PlatformStatus {
                gcp: Some(GcpPlatformStatus {
                    project_id: "gcp-project".to_string(),
                }),
                ..PlatformStatus::default()
            },
            cluster_id: "gcp-cluster".to_string(),
            dns: DnsConfig {
                public_zone_present: true,
            },
        }
    }

    fn machine() -> Machine {
        let mut machine = Machine::new("gcp-machine", MachineSpec::default());
        machine.metadata.namespace = Some("openshift-machine-api".to_string());
        machine
    }

    fn gpu(type_: &str, count: i32) -> GcpGpuConfig {
        GcpGpuConfig {
            count,
            type_: type_.to_string(),
            ..GcpGpuConfig::default()
        }
    }

    fn valid_spec() -> GcpProviderSpec {
        GcpProviderSpec {
            region: "us-central1".to_string(),
            zone: "us-central1-a".to_string(),
            machine_type: "n1-standard-4".to_string(),
            network_interfaces: vec![GcpNetworkInterface {
                network: "gcp-cluster-network".to_string(),
                subnetwork: "gcp-cluster-worker-subnet".to_string(),
                ..GcpNetworkInterface::default()
            }],
            disks: vec![GcpDisk {
                auto_delete: true,
                boot: true,
                size_gb: 128,
                type_: "pd-standard".to_string(),
                image: "gcp-cluster-rhcos-image".to_string(),
                ..GcpDisk::default()
            }],
            service_accounts: vec![GcpServiceAccount {
                email: "worker@gcp-project.iam.gserviceaccount.com".to_string(),
                scopes: vec!["https://www.googleapis.com/auth/cloud-platform".to_string()],
            }],
            user_data_secret: Some(LocalObjectReference {
                name: Some("worker-user-data".to_string()),
            }),
            credentials_secret: Some(LocalObjectReference {
                name: Some("gcp-cloud-credentials".to_string()),
            }),
            ..GcpProviderSpec::default()
        }
    }

    async fn validate(spec: GcpProviderSpec) -> RuleReport {
        let config = config();
        let ctx = AdmissionContext::new(&config, Operation::Create, None);
        let reader = InMemorySecretReader::new()
            .with_secret("openshift-machine-api", "gcp-cloud-credentials");
        GcpValidator
            .validate(
                &machine(),
                Some(&TypedProviderSpec::Gcp(spec)),
                &ctx,
                &reader,
                &CancellationToken::new(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn valid_spec_is_allowed_without_warnings() {
        let report = validate(valid_spec()).await;
        assert!(report.is_allowed());
        assert!(report.warnings.is_empty());
    }

    #[tokio::test]
    async fn zone_must_match_region() {
        let mut spec = valid_spec();
        spec.zone = "zone".to_string();
        spec.region = "region".to_string();
        let report = validate(spec).await;
        assert_eq!(report.errors.len(), 1);
        assert_eq!(
            report.errors[0].to_string(),
            "providerSpec.zone: Invalid value: \"zone\": \
             zone not in configured region (region)"
        );
    }

    #[tokio::test]
    async fn empty_region_does_not_also_emit_a_zone_error() {
        let mut spec = valid_spec();
        spec.region = String::new();
        spec.zone = String::new();
        let report = validate(spec).await;
        assert_eq!(report.errors.len(), 1);
        assert_eq!(
            report.errors[0].to_string(),
            "providerSpec.region: Required value: region is required"
        );
    }

    #[tokio::test]
    async fn network_interfaces_require_network_and_subnetwork() {
        let mut spec = valid_spec();
        spec.network_interfaces.push(GcpNetworkInterface::default());
        let report = validate(spec).await;
        let paths: Vec<&str> = report
            .errors
            .iter()
            .map(|error| error.path.as_str())
            .collect();
        assert_eq!(
            paths,
            vec![
                "providerSpec.networkInterfaces[1].network",
                "providerSpec.networkInterfaces[1].subnetwork",
            ]
        );
    }

    #[tokio::test]
    async fn disk_sizes_are_bounded() {
        let mut spec = valid_spec();
        spec.disks[0].size_gb = 12;
        let report = validate(spec).await;
        assert_eq!(
            report.errors[0].to_string(),
            "providerSpec.disks[0].sizeGb: Invalid value: 12: must be at least 16GB in size"
        );

        let mut spec = valid_spec();
        spec.disks[0].size_gb = 100000;
        let report = validate(spec).await;
        assert_eq!(
            report.errors[0].to_string(),
            "providerSpec.disks[0].sizeGb: Invalid value: 100000: \
             exceeding maximum GCP disk size limit, must be below 65536"
        );
    }

    #[tokio::test]
    async fn disk_type_must_be_supported() {
        let mut spec = valid_spec();
        spec.disks[0].type_ = "pd-extreme".to_string();
        let report = validate(spec).await;
        assert_eq!(
            report.errors[0].to_string(),
            "providerSpec.disks[0].type: Unsupported value: \"pd-extreme\": \
             supported values: \"pd-ssd\", \"pd-standard\""
        );
    }

    #[tokio::test]
    async fn missing_service_account_only_warns() {
        let mut spec = valid_spec();
        spec.service_accounts = Vec::new();
        let report = validate(spec).await;
        assert!(report.is_allowed());
        assert_eq!(
            report.warnings,
            vec![
                "providerSpec.serviceAccounts: no service account provided: \
                 nodes may be unable to join the cluster"
                    .to_string()
            ]
        );
    }

    #[tokio::test]
    async fn multiple_service_accounts_are_invalid() {
        let mut spec = valid_spec();
        spec.service_accounts.push(GcpServiceAccount::default());
        let report = validate(spec).await;
        assert_eq!(
            report.errors[0].to_string(),
            "providerSpec.serviceAccounts: Invalid value: \"2 service accounts supplied\": \
             exactly 1 service account must be supplied"
        );
    }

    #[tokio::test]
    async fn single_service_account_requires_email_and_scopes() {
        let mut spec = valid_spec();
        spec.service_accounts = vec![GcpServiceAccount::default()];
        let report = validate(spec).await;
        let paths: Vec<&str> = report
            .errors
            .iter()
            .map(|error| error.path.as_str())
            .collect();
        assert_eq!(
            paths,
            vec![
                "providerSpec.serviceAccounts[0].email",
                "providerSpec.serviceAccounts[0].scopes",
            ]
        );
    }

    #[tokio::test]
    async fn at_most_one_gpu_may_be_attached() {
        let mut spec = valid_spec();
        spec.on_host_maintenance = "Terminate".to_string();
        spec.gpus = vec![gpu("nvidia-tesla-t4", 1), gpu("nvidia-tesla-t4", 1)];
        let report = validate(spec).await;
        assert_eq!(
            report.errors[0].to_string(),
            "providerSpec.gpus: Too many: 2: must have at most 1 items"
        );
    }

    #[tokio::test]
    async fn a100_gpus_require_a2_machine_types() {
        let mut spec = valid_spec();
        spec.on_host_maintenance = "Terminate".to_string();
        spec.gpus = vec![gpu("nvidia-tesla-a100", 1)];
        let report = validate(spec).await;
        assert_eq!(
            report.errors[0].to_string(),
            "providerSpec.gpus[0].type: Invalid value: \"nvidia-tesla-a100\": \
             nvidia-tesla-a100 gpus, are only attached to the A2 machine types"
        );
    }

    #[tokio::test]
    async fn a2_machine_types_reject_additional_gpus() {
        let mut spec = valid_spec();
        spec.machine_type = "a2-highgpu-1g".to_string();
        spec.on_host_maintenance = "Terminate".to_string();
        spec.gpus = vec![gpu("nvidia-tesla-t4", 1)];
        let report = validate(spec).await;
        assert_eq!(
            report.errors[0].to_string(),
            "providerSpec.gpus[0].type: Invalid value: \"nvidia-tesla-t4\": \
             A2 machine types have already attached gpus, additional gpus cannot be specified"
        );
    }

    #[tokio::test]
    async fn gpus_force_terminate_host_maintenance() {
        let mut spec = valid_spec();
        spec.gpus = vec![gpu("nvidia-tesla-t4", 1)];
        let report = validate(spec).await;
        assert_eq!(report.errors.len(), 1);
        assert_eq!(
            report.errors[0].to_string(),
            "providerSpec.onHostMaintenance: Forbidden: when GPUs are specified or the machine \
             type has pre-attached GPUs, onHostMaintenance must be set to Terminate"
        );
    }

    #[tokio::test]
    async fn maintenance_policies_must_use_supported_values() {
        let mut spec = valid_spec();
        spec.on_host_maintenance = "migrate".to_string();
        spec.restart_policy = "Sometimes".to_string();
        let report = validate(spec).await;
        let rendered: Vec<String> = report
            .errors
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            rendered,
            vec![
                "providerSpec.onHostMaintenance: Unsupported value: \"migrate\": \
                 supported values: \"Migrate\", \"Terminate\""
                    .to_string(),
                "providerSpec.restartPolicy: Unsupported value: \"Sometimes\": \
                 supported values: \"Always\", \"Never\""
                    .to_string(),
            ]
        );
    }

    #[test]
    fn defaulter_fills_absent_fields() {
        let config = config();
        let ctx = AdmissionContext::new(&config, Operation::Create, None);
        let mut spec = TypedProviderSpec::Gcp(GcpProviderSpec::default());
        assert!(GcpDefaulter.apply_defaults(&mut spec, &ctx));
        let gcp = match &spec {
            TypedProviderSpec::Gcp(gcp) => gcp,
            _ => unreachable!(),
        };
        assert_eq!(gcp.machine_type, "n1-standard-4");
        assert_eq!(gcp.network_interfaces.len(), 1);
        assert_eq!(gcp.network_interfaces[0].network, "gcp-cluster-network");
        assert_eq!(
            gcp.network_interfaces[0].subnetwork,
            "gcp-cluster-worker-subnet"
        );
        assert_eq!(gcp.disks.len(), 1);
        assert!(gcp.disks[0].auto_delete);
        assert!(gcp.disks[0].boot);
        assert_eq!(gcp.disks[0].size_gb, 128);
        assert_eq!(gcp.disks[0].type_, "pd-standard");
        assert_eq!(gcp.disks[0].image, "gcp-cluster-rhcos-image");
        assert_eq!(gcp.tags, vec!["gcp-cluster-worker".to_string()]);
        // A second pass changes nothing.
        assert!(!GcpDefaulter.apply_defaults(&mut spec, &ctx));
    }

    #[test]
    fn defaulter_fills_unset_subfields_of_existing_disks() {
        let config = config();
        let ctx = AdmissionContext::new(&config, Operation::Create, None);
        let mut inner = valid_spec();
        inner.disks = vec![GcpDisk {
            auto_delete: false,
            boot: true,
            size_gb: 256,
            ..GcpDisk::default()
        }];
        let mut spec = TypedProviderSpec::Gcp(inner);
        assert!(GcpDefaulter.apply_defaults(&mut spec, &ctx));
        let gcp = match &spec {
            TypedProviderSpec::Gcp(gcp) => gcp,
            _ => unreachable!(),
        };
        assert_eq!(gcp.disks.len(), 1);
        assert!(!gcp.disks[0].auto_delete);
        assert_eq!(gcp.disks[0].size_gb, 256);
        assert_eq!(gcp.disks[0].type_, "pd-standard");
        assert_eq!(gcp.disks[0].image, "gcp-cluster-rhcos-image");
    }

    #[test]
    fn defaulter_fills_gpu_counts() {
        let config = config();
        let ctx = AdmissionContext::new(&config, Operation::Create, None);
        let mut inner = valid_spec();
        inner.gpus = vec![gpu("nvidia-tesla-t4", 0)];
        let mut spec = TypedProviderSpec::Gcp(inner);
        assert!(GcpDefaulter.apply_defaults(&mut spec, &ctx));
        let gcp = match &spec {
            TypedProviderSpec::Gcp(gcp) => gcp,
            _ => unreachable!(),
        };
        assert_eq!(gcp.gpus[0].count, 1);
    }
}
