use crate::machine_ext::MachineExt;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::CustomResource;
use schemars::schema::{InstanceType, SchemaObject};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// A Machine is a declarative request for a compute instance in the cluster. The `CustomResource`
/// derive also produces a struct named `Machine` which represents a machine CRD object in the k8s
/// API.
#[derive(Clone, CustomResource, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[kube(
    derive = "Default",
    derive = "PartialEq",
    group = "machine.openshift.io",
    kind = "Machine",
    namespaced,
    plural = "machines",
    singular = "machine",
    status = "MachineStatus",
    version = "v1beta1",
    printcolumn = r#"{"name":"Phase", "type":"string", "jsonPath":".status.phase"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct MachineSpec {
    /// Hooks that pause machine deletion until cleared by their owners.
    #[serde(default)]
    pub lifecycle_hooks: LifecycleHooks,
    /// The platform-specific configuration. Only the codec understands its layout.
    #[serde(default)]
    pub provider_spec: ProviderSpec,
    /// The provider's identifier for the instance backing this machine, once one exists.
    #[serde(rename = "providerID")]
    pub provider_id: Option<String>,
}

/// The status field of the Machine CRD. The admission engine passes this through untouched.
#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineStatus {
    pub phase: Option<String>,
    pub error_message: Option<String>,
}

/// The opaque, encoded provider configuration embedded in a machine's spec.
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSpec {
    #[schemars(schema_with = "provider_spec_value_schema")]
    pub value: Option<Map<String, Value>>,
}

/// Lifecycle hooks attached to a machine, grouped by the deletion phase they gate.
#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleHooks {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pre_drain: Vec<LifecycleHook>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pre_terminate: Vec<LifecycleHook>,
}

/// A named marker that pauses machine deletion until cleared by its owner.
#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleHook {
    pub name: String,
    pub owner: String,
}

// This rendering appears verbatim in admission messages, so it is part of the API surface.
impl Display for LifecycleHook {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{Name:{} Owner:{}}}", self.name, self.owner)
    }
}

pub fn provider_spec_value_schema(
    _: &mut schemars::gen::SchemaGenerator,
) -> schemars::schema::Schema {
    let mut extensions = BTreeMap::<String, Value>::new();
    extensions.insert("nullable".to_string(), Value::Bool(true));
    extensions.insert(
        "x-kubernetes-preserve-unknown-fields".to_string(),
        Value::Bool(true),
    );
    let schema = SchemaObject {
        instance_type: Some(InstanceType::Object.into()),
        extensions,
        ..SchemaObject::default()
    };
    schema.into()
}

impl MachineExt for Machine {
    fn object_meta(&self) -> &ObjectMeta {
        &self.metadata
    }
}
