/*!

The typed forms of the per-platform provider specs. These structs model the fields the admission
engine reads or writes; everything else a payload carries rides along in the `extra` catch-alls so
that a defaulting pass does not drop what it does not understand.

!*/

pub use aws::{AwsFilter, AwsPlacement, AwsProviderSpec, AwsResourceReference, AwsTag};
pub use azure::{AzureImage, AzureOsDisk, AzureProviderSpec, AzureSpotVmOptions};
pub use gcp::{GcpDisk, GcpGpuConfig, GcpNetworkInterface, GcpProviderSpec, GcpServiceAccount};
pub use vsphere::{
    VSphereNetworkDevice, VSphereNetworkSpec, VSphereProviderSpec, VSphereWorkspace,
};

mod aws;
mod azure;
mod gcp;
mod vsphere;
