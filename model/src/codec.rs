/*!

The codec is the only boundary that understands the layout of a machine's encoded provider-spec
payload. Decoding turns the payload into the platform's typed form; encoding turns a typed value
back into a payload. The orchestrator re-encodes only when defaulting changed something, so a
payload the engine did not touch is returned to the caller byte-identical.

!*/

use crate::error::{self, Result};
use crate::providers::{AwsProviderSpec, AzureProviderSpec, GcpProviderSpec, VSphereProviderSpec};
use crate::PlatformType;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use snafu::ResultExt;

/// A provider spec decoded into the typed form of the cluster's platform.
#[derive(Clone, Debug, PartialEq)]
pub enum TypedProviderSpec {
    Aws(AwsProviderSpec),
    Azure(AzureProviderSpec),
    Gcp(GcpProviderSpec),
    VSphere(VSphereProviderSpec),
}

impl TypedProviderSpec {
    pub fn platform(&self) -> PlatformType {
        match self {
            Self::Aws(_) => PlatformType::Aws,
            Self::Azure(_) => PlatformType::Azure,
            Self::Gcp(_) => PlatformType::Gcp,
            Self::VSphere(_) => PlatformType::VSphere,
        }
    }
}

/// Decode a machine's provider-spec payload according to `platform`. A missing payload yields
/// `Ok(None)`; a payload that does not parse into the platform's schema is an error.
pub fn decode(
    platform: &PlatformType,
    value: Option<&Map<String, Value>>,
) -> Result<Option<TypedProviderSpec>> {
    let map = match value {
        None => return Ok(None),
        Some(map) => map.clone(),
    };
    let spec = match platform {
        PlatformType::Aws => TypedProviderSpec::Aws(parse(platform, map)?),
        PlatformType::Azure => TypedProviderSpec::Azure(parse(platform, map)?),
        PlatformType::Gcp => TypedProviderSpec::Gcp(parse(platform, map)?),
        PlatformType::VSphere => TypedProviderSpec::VSphere(parse(platform, map)?),
        PlatformType::Other(_) => {
            return Err(error::UnknownPlatformSnafu {
                platform: platform.to_string(),
            }
            .build()
            .into())
        }
    };
    Ok(Some(spec))
}

/// Encode a typed provider spec back into payload form. Encoding is deterministic: the same
/// typed value always produces the same map.
pub fn encode(spec: &TypedProviderSpec) -> Result<Map<String, Value>> {
    let value = match spec {
        TypedProviderSpec::Aws(spec) => to_value(spec)?,
        TypedProviderSpec::Azure(spec) => to_value(spec)?,
        TypedProviderSpec::Gcp(spec) => to_value(spec)?,
        TypedProviderSpec::VSphere(spec) => to_value(spec)?,
    };
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(error::EncodeWrongValueTypeSnafu {}.build().into()),
    }
}

fn parse<T>(platform: &PlatformType, map: Map<String, Value>) -> Result<T>
where
    T: DeserializeOwned,
{
    Ok(
        serde_json::from_value(Value::Object(map)).context(error::InvalidProviderSpecSnafu {
            platform: platform.to_string(),
        })?,
    )
}

fn to_value<T>(spec: &T) -> Result<Value>
where
    T: Serialize,
{
    Ok(serde_json::to_value(spec).context(error::EncodeProviderSpecSnafu)?)
}
