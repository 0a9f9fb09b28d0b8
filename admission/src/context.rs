use machine_model::{DnsConfig, Machine, PlatformStatus, PlatformType};
use serde::{Deserialize, Serialize};

/// The admission operation being performed on a machine.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Create,
    Update,
}

serde_plain::derive_display_from_serialize!(Operation);

/// The per-cluster inputs the hosting control plane provides when the engine is constructed.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub platform: PlatformType,
    pub platform_status: PlatformStatus,
    pub cluster_id: String,
    pub dns: DnsConfig,
}

/// The immutable per-request view handed to platform handlers and policy rules.
#[derive(Clone, Copy, Debug)]
pub struct AdmissionContext<'a> {
    pub platform: &'a PlatformType,
    pub platform_status: &'a PlatformStatus,
    pub cluster_id: &'a str,
    pub dns: &'a DnsConfig,
    pub operation: Operation,
    pub old_machine: Option<&'a Machine>,
}

impl<'a> AdmissionContext<'a> {
    pub fn new(
        config: &'a EngineConfig,
        operation: Operation,
        old_machine: Option<&'a Machine>,
    ) -> Self {
        Self {
            platform: &config.platform,
            platform_status: &config.platform_status,
            cluster_id: &config.cluster_id,
            dns: &config.dns,
            operation,
            old_machine,
        }
    }
}
