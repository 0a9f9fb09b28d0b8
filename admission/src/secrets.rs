use crate::error::{self, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Api;
use snafu::ResultExt;
use std::collections::BTreeMap;

/// Read-only view of the cluster's secrets. The engine only ever asks whether a referenced
/// secret exists; implementations must be safe for concurrent use.
#[async_trait]
pub trait SecretReader: Send + Sync {
    /// Get a secret by namespace and name. Returns `None` when the secret does not exist and an
    /// error only for faults talking to the cluster.
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>>;
}

/// A `SecretReader` backed by the cluster's API server.
pub struct KubeSecretReader {
    client: kube::Client,
}

impl KubeSecretReader {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretReader for KubeSecretReader {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>> {
        let api = Api::<Secret>::namespaced(self.client.clone(), namespace);
        match api.get(name).await {
            Ok(secret) => Ok(Some(secret)),
            Err(kube::Error::Api(response)) if response.code == 404 => Ok(None),
            Err(source) => Err(source)
                .context(error::SecretLookupSnafu { namespace, name })
                .map_err(Into::into),
        }
    }
}

/// A `SecretReader` over a fixed set of secrets, for tests and local fixtures.
#[derive(Debug, Default)]
pub struct InMemorySecretReader {
    secrets: BTreeMap<(String, String), Secret>,
}

impl InMemorySecretReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty secret with the given coordinates.
    pub fn with_secret<S1, S2>(mut self, namespace: S1, name: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        let namespace = namespace.into();
        let name = name.into();
        let secret = Secret {
            metadata: ObjectMeta {
                name: Some(name.clone()),
                namespace: Some(namespace.clone()),
                ..ObjectMeta::default()
            },
            ..Secret::default()
        };
        self.secrets.insert((namespace, name), secret);
        self
    }
}

#[async_trait]
impl SecretReader for InMemorySecretReader {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>> {
        let key = (namespace.to_string(), name.to_string());
        Ok(self.secrets.get(&key).cloned())
    }
}

#[cfg(test)]
mod test {
    use super::{InMemorySecretReader, SecretReader};

    #[tokio::test]
    async fn in_memory_reader_finds_inserted_secrets() {
        let reader = InMemorySecretReader::new().with_secret("team-a", "aws-cloud-credentials");
        assert!(reader
            .get_secret("team-a", "aws-cloud-credentials")
            .await
            .unwrap()
            .is_some());
        assert!(reader
            .get_secret("team-a", "missing")
            .await
            .unwrap()
            .is_none());
        assert!(reader
            .get_secret("team-b", "aws-cloud-credentials")
            .await
            .unwrap()
            .is_none());
    }
}
