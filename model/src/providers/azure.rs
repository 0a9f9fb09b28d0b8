use k8s_openapi::api::core::v1::SecretReference;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The Azure portion of a machine's provider spec.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureProviderSpec {
    #[serde(default)]
    pub vm_size: String,
    #[serde(default)]
    pub image: AzureImage,
    #[serde(default)]
    pub os_disk: AzureOsDisk,
    #[serde(default, rename = "publicIP")]
    pub public_ip: bool,
    #[serde(
        default,
        rename = "spotVMOptions",
        skip_serializing_if = "Option::is_none"
    )]
    pub spot_vm_options: Option<AzureSpotVmOptions>,
    #[serde(default)]
    pub vnet: String,
    #[serde(default)]
    pub subnet: String,
    #[serde(default)]
    pub network_resource_group: String,
    #[serde(default)]
    pub resource_group: String,
    #[serde(default)]
    pub managed_identity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data_secret: Option<SecretReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_secret: Option<SecretReference>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The image the OS disk is created from: either a marketplace tuple or a resource id, never
/// both.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureImage {
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub offer: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, rename = "resourceID")]
    pub resource_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AzureImage {
    /// True when no image reference form is populated.
    pub fn is_unset(&self) -> bool {
        self.publisher.is_empty()
            && self.offer.is_empty()
            && self.sku.is_empty()
            && self.version.is_empty()
            && self.resource_id.is_empty()
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureOsDisk {
    #[serde(default)]
    pub os_type: String,
    #[serde(default, rename = "diskSizeGB")]
    pub disk_size_gb: i32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureSpotVmOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<String>,
}
