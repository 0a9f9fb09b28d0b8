use crate::handlers::aws::{AwsDefaulter, AwsValidator};
use crate::handlers::azure::{AzureDefaulter, AzureValidator};
use crate::handlers::gcp::{GcpDefaulter, GcpValidator};
use crate::handlers::noop::{NoOpDefaulter, NoOpValidator};
use crate::handlers::vsphere::{VSphereDefaulter, VSphereValidator};
use crate::handlers::HandlerBundle;
use machine_model::PlatformType;

/// The static mapping from platform to handler bundle. Lookup is the sole path to
/// platform-specific logic; every unrecognized identifier resolves to the shared pass-through
/// bundle. The registry is built once and never mutated.
pub struct Registry {
    aws: HandlerBundle,
    azure: HandlerBundle,
    gcp: HandlerBundle,
    vsphere: HandlerBundle,
    unrecognized: HandlerBundle,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            aws: HandlerBundle {
                validator: Box::new(AwsValidator),
                defaulter: Box::new(AwsDefaulter),
            },
            azure: HandlerBundle {
                validator: Box::new(AzureValidator),
                defaulter: Box::new(AzureDefaulter),
            },
            gcp: HandlerBundle {
                validator: Box::new(GcpValidator),
                defaulter: Box::new(GcpDefaulter),
            },
            vsphere: HandlerBundle {
                validator: Box::new(VSphereValidator),
                defaulter: Box::new(VSphereDefaulter),
            },
            unrecognized: HandlerBundle {
                validator: Box::new(NoOpValidator),
                defaulter: Box::new(NoOpDefaulter),
            },
        }
    }

    pub fn lookup(&self, platform: &PlatformType) -> &HandlerBundle {
        match platform {
            PlatformType::Aws => &self.aws,
            PlatformType::Azure => &self.azure,
            PlatformType::Gcp => &self.gcp,
            PlatformType::VSphere => &self.vsphere,
            PlatformType::Other(_) => &self.unrecognized,
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
