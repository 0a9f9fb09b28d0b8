use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The cluster's infrastructure platform. Unrecognized identifiers are preserved verbatim in
/// `Other` so that the admission engine can report what it skipped.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum PlatformType {
    Aws,
    Azure,
    Gcp,
    VSphere,
    Other(String),
}

impl FromStr for PlatformType {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Infallible> {
        Ok(match s {
            "AWS" => Self::Aws,
            "Azure" => Self::Azure,
            "GCP" => Self::Gcp,
            "VSphere" => Self::VSphere,
            other => Self::Other(other.to_string()),
        })
    }
}

impl Display for PlatformType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Aws => write!(f, "AWS"),
            Self::Azure => write!(f, "Azure"),
            Self::Gcp => write!(f, "GCP"),
            Self::VSphere => write!(f, "VSphere"),
            Self::Other(platform) => write!(f, "{}", platform),
        }
    }
}

serde_plain::derive_serialize_from_display!(PlatformType);
serde_plain::derive_deserialize_from_fromstr!(PlatformType, "platform type");

/// The Azure cloud environment names used by the cluster configuration.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum AzureCloudEnvironment {
    AzurePublicCloud,
    AzureUSGovernmentCloud,
    AzureChinaCloud,
    AzureGermanCloud,
}

impl Default for AzureCloudEnvironment {
    fn default() -> Self {
        Self::AzurePublicCloud
    }
}

serde_plain::derive_display_from_serialize!(AzureCloudEnvironment);

/// Per-platform configuration owned by the cluster, provided to the admission engine by the
/// hosting control plane. Only the sub-record matching the cluster's platform is populated.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStatus {
    pub aws: Option<AwsPlatformStatus>,
    pub azure: Option<AzurePlatformStatus>,
    pub gcp: Option<GcpPlatformStatus>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsPlatformStatus {
    /// The region new instances are placed in when a machine does not name one.
    pub region: String,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AzurePlatformStatus {
    pub cloud_name: AzureCloudEnvironment,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GcpPlatformStatus {
    #[serde(rename = "projectID")]
    pub project_id: String,
}

/// Whether the cluster has a public DNS zone. A cluster without one is a disconnected install
/// and some platform features are forbidden there.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsConfig {
    pub public_zone_present: bool,
}

#[cfg(test)]
mod test {
    use super::PlatformType;
    use std::str::FromStr;

    #[test]
    fn platform_type_round_trip() {
        for (input, expected) in [
            ("AWS", PlatformType::Aws),
            ("Azure", PlatformType::Azure),
            ("GCP", PlatformType::Gcp),
            ("VSphere", PlatformType::VSphere),
            ("BareMetal", PlatformType::Other("BareMetal".to_string())),
        ] {
            let parsed = PlatformType::from_str(input).unwrap();
            assert_eq!(parsed, expected);
            assert_eq!(parsed.to_string(), input);
        }
    }
}
