use crate::context::AdmissionContext;
use crate::error::Result;
use crate::field::{FieldError, FieldPath};
use crate::handlers::{Defaulter, Validator};
use crate::rules::{check_secret_exists, RuleReport};
use crate::secrets::SecretReader;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::SecretReference;
use machine_model::constants::{
    AZURE_MAX_DISK_SIZE_GB, DEFAULT_AZURE_CREDENTIALS_SECRET, DEFAULT_AZURE_VM_SIZE,
    DEFAULT_SECRET_NAMESPACE, DEFAULT_USER_DATA_SECRET,
};
use machine_model::{AzureCloudEnvironment, Machine, TypedProviderSpec};
use tokio_util::sync::CancellationToken;

pub struct AzureValidator;

#[async_trait]
impl Validator for AzureValidator {
    // Rule order is part of this handler's contract: vmSize, the vnet/subnet pair, image,
    // userDataSecret, credentialsSecret, osDisk, then the disconnected-install and spot checks.
    async fn validate(
        &self,
        _machine: &Machine,
        spec: Option<&TypedProviderSpec>,
        ctx: &AdmissionContext<'_>,
        secrets: &dyn SecretReader,
        cancel: &CancellationToken,
    ) -> Result<RuleReport> {
        let mut report = RuleReport::new();
        let azure = match spec {
            Some(TypedProviderSpec::Azure(azure)) => azure,
            _ => return Ok(report),
        };
        let provider_spec = FieldPath::new("providerSpec");

        if azure.vm_size.is_empty() {
            report.error(FieldError::required(
                &provider_spec.child("vmSize"),
                "vmSize should be set to one of the supported Azure VM sizes",
            ));
        }

        if !azure.vnet.is_empty() && azure.subnet.is_empty() {
            report.error(FieldError::required(
                &provider_spec.child("subnet"),
                "must provide a subnet when a virtual network is specified",
            ));
        }
        if !azure.subnet.is_empty() && azure.vnet.is_empty() {
            report.error(FieldError::required(
                &provider_spec.child("vnet"),
                "must provide a virtual network when supplying subnets",
            ));
        }

        let image = provider_spec.child("image");
        if azure.image.is_unset() {
            report.error(FieldError::required(
                &image,
                "an image reference must be provided",
            ));
        } else if !azure.image.resource_id.is_empty() {
            let marketplace_fields_set = !azure.image.offer.is_empty()
                || !azure.image.publisher.is_empty()
                || !azure.image.sku.is_empty()
                || !azure.image.version.is_empty();
            if marketplace_fields_set {
                report.error(FieldError::required(
                    &image,
                    "resourceID is already specified, other fields such as \
                     [Offer, Publisher, SKU, Version] should not be set",
                ));
            }
        } else {
            for (value, name) in [
                (&azure.image.offer, "offer"),
                (&azure.image.sku, "sku"),
                (&azure.image.version, "version"),
                (&azure.image.publisher, "publisher"),
            ] {
                if value.is_empty() {
                    report.error(FieldError::required(
                        &image.child(name),
                        format!("{} must be provided", name),
                    ));
                }
            }
        }

        let user_data_secret = provider_spec.child("userDataSecret");
        match &azure.user_data_secret {
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
        match &azure.credentials_secret {
            None => report.error(FieldError::required(
                &credentials_secret,
                "credentialsSecret must be provided",
            )),
            Some(reference) => {
                let namespace = reference.namespace.as_deref().unwrap_or("");
                let name = reference.name.as_deref().unwrap_or("");
                if namespace.is_empty() {
                    report.error(FieldError::required(
                        &credentials_secret.child("namespace"),
                        "namespace must be provided",
                    ));
                }
                if name.is_empty() {
                    report.error(FieldError::required(
                        &credentials_secret.child("name"),
                        "name must be provided",
                    ));
                }
                if !namespace.is_empty() && !name.is_empty() {
                    check_secret_exists(
                        secrets,
                        cancel,
                        namespace,
                        name,
                        &credentials_secret,
                        &mut report,
                    )
                    .await?;
                }
            }
        }

        if azure.os_disk.disk_size_gb <= 0 || azure.os_disk.disk_size_gb >= AZURE_MAX_DISK_SIZE_GB
        {
            report.error(FieldError::invalid(
                &provider_spec.child("osDisk").child("diskSizeGB"),
                azure.os_disk.disk_size_gb,
                "diskSizeGB must be greater than zero and less than 32768",
            ));
        }

        if !ctx.dns.public_zone_present && azure.public_ip {
            report.error(FieldError::forbidden(
                &provider_spec.child("publicIP"),
                "publicIP is not allowed in Azure disconnected installation",
            ));
        }

        let gov_cloud = ctx
            .platform_status
            .azure
            .as_ref()
            .map(|status| status.cloud_name == AzureCloudEnvironment::AzureUSGovernmentCloud)
            .unwrap_or(false);
        if azure.spot_vm_options.is_some() && gov_cloud {
            report.warn("spot VMs may not be supported when using GovCloud region");
        }

        Ok(report)
    }
}

pub struct AzureDefaulter;

impl Defaulter for AzureDefaulter {
    // Only fields left unset are filled; anything the user supplied survives untouched.
    fn apply_defaults(&self, spec: &mut TypedProviderSpec, ctx: &AdmissionContext<'_>) -> bool {
        let azure = match spec {
            TypedProviderSpec::Azure(azure) => azure,
            _ => return false,
        };
        let cluster_id = ctx.cluster_id;
        let mut changed = false;

        if azure.vm_size.is_empty() {
            azure.vm_size = DEFAULT_AZURE_VM_SIZE.to_string();
            changed = true;
        }
        if azure.vnet.is_empty() {
            azure.vnet = format!("{}-vnet", cluster_id);
            changed = true;
        }
        if azure.subnet.is_empty() {
            azure.subnet = format!("{}-worker-subnet", cluster_id);
            changed = true;
        }
        if azure.network_resource_group.is_empty() {
            azure.network_resource_group = format!("{}-rg", cluster_id);
            changed = true;
        }
        if azure.resource_group.is_empty() {
            azure.resource_group = format!("{}-rg", cluster_id);
            changed = true;
        }
        if azure.managed_identity.is_empty() {
            azure.managed_identity = format!("{}-identity", cluster_id);
            changed = true;
        }
        if azure.image.is_unset() {
            azure.image.resource_id = format!(
                "/resourceGroups/{}-rg/providers/Microsoft.Compute/images/{}",
                cluster_id, cluster_id
            );
            changed = true;
        }

        let user_data = azure.user_data_secret.get_or_insert_with(SecretReference::default);
        if user_data.name.as_deref().map_or(true, str::is_empty) {
            user_data.name = Some(DEFAULT_USER_DATA_SECRET.to_string());
            changed = true;
        }
        if user_data.namespace.as_deref().map_or(true, str::is_empty) {
            user_data.namespace = Some(DEFAULT_SECRET_NAMESPACE.to_string());
            changed = true;
        }

        let credentials = azure
            .credentials_secret
            .get_or_insert_with(SecretReference::default);
        if credentials.name.as_deref().map_or(true, str::is_empty) {
            credentials.name = Some(DEFAULT_AZURE_CREDENTIALS_SECRET.to_string());
            changed = true;
        }
        if credentials.namespace.as_deref().map_or(true, str::is_empty) {
            credentials.namespace = Some(DEFAULT_SECRET_NAMESPACE.to_string());
            changed = true;
        }

        changed
    }
}
