use k8s_openapi::api::core::v1::LocalObjectReference;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The vSphere portion of a machine's provider spec.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VSphereProviderSpec {
    /// The template VM the machine is cloned from.
    #[serde(default)]
    pub template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<VSphereWorkspace>,
    #[serde(default)]
    pub network: VSphereNetworkSpec,
    #[serde(default, rename = "numCPUs")]
    pub num_cpus: i32,
    #[serde(default)]
    pub num_cores_per_socket: i32,
    #[serde(default, rename = "memoryMiB")]
    pub memory_mib: i64,
    #[serde(default, rename = "diskGiB")]
    pub disk_gib: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data_secret: Option<LocalObjectReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_secret: Option<LocalObjectReference>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Where in the vCenter inventory the machine is created.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VSphereWorkspace {
    #[serde(default)]
    pub server: String,
    #[serde(default)]
    pub datacenter: String,
    #[serde(default)]
    pub folder: String,
    #[serde(default)]
    pub datastore: String,
    #[serde(default)]
    pub resource_pool: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VSphereNetworkSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub devices: Vec<VSphereNetworkDevice>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VSphereNetworkDevice {
    #[serde(default)]
    pub network_name: String,
}
