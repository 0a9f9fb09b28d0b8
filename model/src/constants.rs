/// Helper macro to avoid retyping the base domain-like name of the machine API when creating
/// further string constants from it. When given no parameters, this returns the base domain-like
/// name. When given a string literal parameter it adds `/parameter` to the end.
macro_rules! machine_api {
    () => {
        "machine.openshift.io"
    };
    ($s:literal) => {
        concat!(machine_api!(), "/", $s)
    };
}

// System identifiers
pub const API_GROUP: &str = machine_api!();
pub const API_VERSION: &str = machine_api!("v1beta1");

// Label keys
pub const CLUSTER_ID_LABEL: &str = machine_api!("cluster-api-cluster");

// Finalizers
pub const FINALIZER_MACHINE: &str = machine_api!("machine");

// The namespace that holds the defaulted secrets below.
pub const DEFAULT_SECRET_NAMESPACE: &str = "openshift-machine-api";

// Secret names written by the defaulters when a machine omits its references.
pub const DEFAULT_USER_DATA_SECRET: &str = "worker-user-data";
pub const DEFAULT_AWS_CREDENTIALS_SECRET: &str = "aws-cloud-credentials";
pub const DEFAULT_AZURE_CREDENTIALS_SECRET: &str = "azure-cloud-credentials";
pub const DEFAULT_GCP_CREDENTIALS_SECRET: &str = "gcp-cloud-credentials";
pub const DEFAULT_VSPHERE_CREDENTIALS_SECRET: &str = "vsphere-cloud-credentials";

// Instance shape defaults
pub const DEFAULT_AWS_INSTANCE_TYPE_X86: &str = "m5.large";
pub const DEFAULT_AWS_INSTANCE_TYPE_ARM: &str = "m6g.large";
pub const DEFAULT_AZURE_VM_SIZE: &str = "Standard_D4s_V3";
pub const DEFAULT_GCP_MACHINE_TYPE: &str = "n1-standard-4";
pub const DEFAULT_GCP_DISK_SIZE_GB: i64 = 128;
pub const DEFAULT_GCP_DISK_TYPE: &str = "pd-standard";

// Validation bounds
pub const AZURE_MAX_DISK_SIZE_GB: i32 = 32768;
pub const GCP_MIN_DISK_SIZE_GB: i64 = 16;
pub const GCP_MAX_DISK_SIZE_GB: i64 = 65536;
pub const VSPHERE_MIN_NUM_CPUS: i32 = 2;
pub const VSPHERE_MIN_MEMORY_MIB: i64 = 2048;
pub const VSPHERE_MIN_DISK_GIB: i32 = 120;

// GCP machine types starting with this prefix ship with pre-attached GPUs.
pub const GCP_A2_MACHINE_PREFIX: &str = "a2-";

#[test]
fn machine_api_constants_macro_test() {
    assert_eq!("machine.openshift.io", machine_api!());
    assert_eq!("machine.openshift.io/v1beta1", API_VERSION);
    assert_eq!("machine.openshift.io/foo", machine_api!("foo"));
}
