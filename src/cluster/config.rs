// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Derives connection settings for a remote cluster from its `ToolchainCluster`
//! and the referenced secret, and builds remote clients from them.
//!
//! # Modes
//!
//! The secret selects one of two mutually exclusive modes:
//!
//! - **Kubeconfig mode** - `data["kubeconfig"]` holds a complete kubeconfig.
//!   Server, credentials and TLS settings come from its current context, as
//!   does the operator namespace. Only the timeout is overridden.
//! - **Legacy token mode** - `data["token"]` holds a bearer token used against
//!   `spec.apiEndpoint`. TLS verification is skipped only when
//!   `spec.disabledTLSValidations` is exactly `["*"]`, and the client is
//!   throttled at 20 QPS with a burst of 30.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use kube::{
    client::ClientBuilder,
    config::{KubeConfigOptions, Kubeconfig},
    Client, ResourceExt,
};
use tower::limit::RateLimitLayer;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use super::client::ToolchainClusterClient;
use crate::constants::{
    LEGACY_CLIENT_BURST, LEGACY_CLIENT_QPS, SECRET_KEY_KUBECONFIG, SECRET_KEY_TOKEN,
};
use crate::crd::{TLSValidation, ToolchainCluster};
use crate::errors::ClusterError;
use crate::labels::{
    CLUSTER_TYPE_HOST, CLUSTER_TYPE_MEMBER, LABEL_NAMESPACE, LABEL_OWNER_CLUSTER_NAME, LABEL_TYPE,
};

/// Client-side rate limit applied to a remote client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Throttle {
    /// Sustained requests per second
    pub qps: u32,
    /// Requests allowed in a single burst
    pub burst: u32,
}

impl Throttle {
    /// Window over which `burst` requests are admitted so that the average
    /// rate stays at `qps`.
    #[must_use]
    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(f64::from(self.burst) / f64::from(self.qps.max(1)))
    }
}

/// Plain description of how to reach a remote API server.
///
/// Two values compare equal exactly when a client built from one can be used
/// in place of a client built from the other.
#[derive(Clone, PartialEq, Eq)]
pub struct RestConfig {
    /// API server URL
    pub host: String,
    /// Bearer token (legacy token mode)
    pub bearer_token: Option<String>,
    /// Skip TLS verification
    pub insecure: bool,
    /// Client-side rate limit (legacy token mode)
    pub throttle: Option<Throttle>,
    /// Connect, read and write timeout
    pub timeout: Duration,
    /// Raw kubeconfig (kubeconfig mode)
    pub kubeconfig: Option<String>,
}

impl fmt::Debug for RestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestConfig")
            .field("host", &self.host)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .field("insecure", &self.insecure)
            .field("throttle", &self.throttle)
            .field("timeout", &self.timeout)
            .field("kubeconfig", &self.kubeconfig.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl RestConfig {
    /// Build the `kube::Config` this value describes.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::InvalidKubeconfig`] when the kubeconfig cannot
    /// be parsed or resolved.
    pub async fn to_kube_config(&self, cluster: &str) -> Result<kube::Config, ClusterError> {
        let invalid = |reason: String| ClusterError::InvalidKubeconfig {
            cluster: cluster.to_string(),
            reason,
        };

        let kubeconfig = match &self.kubeconfig {
            Some(raw) => Kubeconfig::from_yaml(raw).map_err(|e| invalid(e.to_string()))?,
            None => self.token_kubeconfig().map_err(|e| invalid(e.to_string()))?,
        };

        let mut config = kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .map_err(|e| invalid(e.to_string()))?;
        config.connect_timeout = Some(self.timeout);
        config.read_timeout = Some(self.timeout);
        config.write_timeout = Some(self.timeout);
        Ok(config)
    }

    /// Single-context kubeconfig for the legacy token mode.
    fn token_kubeconfig(&self) -> Result<Kubeconfig, serde_json::Error> {
        let mut user = serde_json::Map::new();
        if let Some(token) = &self.bearer_token {
            user.insert("token".to_string(), serde_json::Value::String(token.clone()));
        }

        serde_json::from_value(serde_json::json!({
            "clusters": [{
                "name": "remote",
                "cluster": {
                    "server": self.host,
                    "insecure-skip-tls-verify": self.insecure,
                },
            }],
            "users": [{ "name": "remote", "user": user }],
            "contexts": [{
                "name": "remote",
                "context": { "cluster": "remote", "user": "remote" },
            }],
            "current-context": "remote",
        }))
    }
}

/// Role of a registered cluster, taken from its `type` label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClusterType {
    Host,
    Member,
}

impl ClusterType {
    /// Parse a `type` label value.
    #[must_use]
    pub fn from_label(value: &str) -> Option<Self> {
        match value {
            CLUSTER_TYPE_HOST => Some(Self::Host),
            CLUSTER_TYPE_MEMBER => Some(Self::Member),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Host => CLUSTER_TYPE_HOST,
            Self::Member => CLUSTER_TYPE_MEMBER,
        }
    }
}

/// Everything derived from a `ToolchainCluster` and its secret.
///
/// Recomputed on every add/update and never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterConfig {
    /// Name of the `ToolchainCluster`
    pub name: String,
    /// API server URL of the remote cluster
    pub api_endpoint: String,
    /// Connection settings for the remote client
    pub rest_config: RestConfig,
    /// Namespace the operator runs in on the remote cluster
    pub operator_namespace: String,
    /// Name of the cluster owning this registration
    pub owner_cluster_name: String,
    /// Labels of the `ToolchainCluster`
    pub labels: BTreeMap<String, String>,
}

impl ClusterConfig {
    /// Cluster type from the `type` label, if it carries a known value.
    #[must_use]
    pub fn cluster_type(&self) -> Option<ClusterType> {
        self.labels
            .get(LABEL_TYPE)
            .and_then(|value| ClusterType::from_label(value))
    }
}

/// Namespace of the kubeconfig's current context.
fn current_context_namespace(kubeconfig: &Kubeconfig) -> Option<String> {
    let current = kubeconfig.current_context.as_ref()?;
    kubeconfig
        .contexts
        .iter()
        .find(|named| &named.name == current)
        .and_then(|named| named.context.as_ref())
        .and_then(|context| context.namespace.clone())
        .filter(|namespace| !namespace.is_empty())
}

/// Derive the [`ClusterConfig`] of a `ToolchainCluster`.
///
/// The only side effect is reading the referenced secret.
///
/// # Errors
///
/// Fails when the secret reference is empty, the secret cannot be fetched,
/// it carries neither a `kubeconfig` nor a non-empty `token`, the legacy
/// mode has no API endpoint, or the kubeconfig is invalid or has no
/// namespace in its current context.
pub async fn new_cluster_config(
    client: &dyn ToolchainClusterClient,
    toolchain_cluster: &ToolchainCluster,
    timeout: Duration,
) -> Result<ClusterConfig, ClusterError> {
    let name = toolchain_cluster.name_any();
    let namespace = toolchain_cluster.namespace().unwrap_or_default();
    let secret_name = toolchain_cluster.spec.secret_ref.name.clone();

    if secret_name.is_empty() {
        return Err(ClusterError::MissingSecretRef { cluster: name });
    }

    let secret = match client.get_secret(&namespace, &secret_name).await {
        Ok(Some(secret)) => secret,
        Ok(None) => {
            return Err(ClusterError::SecretNotFound {
                cluster: name,
                namespace,
                secret: secret_name,
            })
        }
        Err(ClusterError::Kube(source)) => {
            return Err(ClusterError::SecretUnavailable {
                cluster: name,
                namespace,
                secret: secret_name,
                source,
            })
        }
        Err(e) => return Err(e),
    };

    let data = secret.data.unwrap_or_default();
    let labels = toolchain_cluster.labels().clone();
    let owner_cluster_name = labels
        .get(LABEL_OWNER_CLUSTER_NAME)
        .cloned()
        .unwrap_or_default();

    if let Some(raw) = data.get(SECRET_KEY_KUBECONFIG) {
        debug!(cluster = %name, secret = %secret_name, "Using kubeconfig mode");
        let raw = String::from_utf8(raw.0.clone()).map_err(|e| ClusterError::InvalidKubeconfig {
            cluster: name.clone(),
            reason: e.to_string(),
        })?;
        let kubeconfig = Kubeconfig::from_yaml(&raw).map_err(|e| ClusterError::InvalidKubeconfig {
            cluster: name.clone(),
            reason: e.to_string(),
        })?;
        let operator_namespace = current_context_namespace(&kubeconfig)
            .ok_or_else(|| ClusterError::UndeterminedNamespace {
                cluster: name.clone(),
            })?;
        let resolved = kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .map_err(|e| ClusterError::InvalidKubeconfig {
                cluster: name.clone(),
                reason: e.to_string(),
            })?;
        let host = resolved.cluster_url.to_string();

        return Ok(ClusterConfig {
            name,
            api_endpoint: host.clone(),
            rest_config: RestConfig {
                host,
                bearer_token: None,
                insecure: resolved.accept_invalid_certs,
                throttle: None,
                timeout,
                kubeconfig: Some(raw),
            },
            operator_namespace,
            owner_cluster_name,
            labels,
        });
    }

    let token = data
        .get(SECRET_KEY_TOKEN)
        .map(|token| String::from_utf8_lossy(&token.0).into_owned())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ClusterError::MissingCredentials {
            cluster: name.clone(),
            secret: secret_name.clone(),
        })?;

    let api_endpoint = toolchain_cluster.spec.api_endpoint.clone();
    if api_endpoint.is_empty() {
        return Err(ClusterError::MissingApiEndpoint { cluster: name });
    }

    debug!(cluster = %name, api_endpoint = %api_endpoint, "Using legacy token mode");
    let insecure = toolchain_cluster.spec.disabled_tls_validations == [TLSValidation::All];

    Ok(ClusterConfig {
        name,
        api_endpoint: api_endpoint.clone(),
        rest_config: RestConfig {
            host: api_endpoint,
            bearer_token: Some(token),
            insecure,
            throttle: Some(Throttle {
                qps: LEGACY_CLIENT_QPS,
                burst: LEGACY_CLIENT_BURST,
            }),
            timeout,
            kubeconfig: None,
        },
        operator_namespace: labels.get(LABEL_NAMESPACE).cloned().unwrap_or_default(),
        owner_cluster_name,
        labels,
    })
}

/// Derive the configuration of every `ToolchainCluster` in a namespace.
///
/// # Errors
///
/// Fails as soon as listing fails or any single cluster cannot be resolved;
/// no partial result is returned.
pub async fn list_toolchain_cluster_configs(
    client: &dyn ToolchainClusterClient,
    namespace: &str,
    timeout: Duration,
) -> Result<Vec<ClusterConfig>, ClusterError> {
    let toolchain_clusters = client.list_toolchain_clusters(namespace).await?;
    let mut configs = Vec::with_capacity(toolchain_clusters.len());
    for toolchain_cluster in &toolchain_clusters {
        configs.push(new_cluster_config(client, toolchain_cluster, timeout).await?);
    }
    Ok(configs)
}

/// Builds remote clients from a [`RestConfig`].
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn new_client(&self, cluster: &str, rest_config: &RestConfig)
        -> Result<Client, ClusterError>;
}

/// [`ClientFactory`] producing real kube clients via [`new_remote_client`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultClientFactory;

#[async_trait]
impl ClientFactory for DefaultClientFactory {
    async fn new_client(
        &self,
        cluster: &str,
        rest_config: &RestConfig,
    ) -> Result<Client, ClusterError> {
        new_remote_client(cluster, rest_config).await
    }
}

/// Build a kube client for a remote cluster, rate limited when the
/// configuration carries a [`Throttle`].
///
/// # Errors
///
/// Returns an error when the configuration is invalid or the HTTP stack
/// cannot be assembled.
pub async fn new_remote_client(
    cluster: &str,
    rest_config: &RestConfig,
) -> Result<Client, ClusterError> {
    let config = rest_config.to_kube_config(cluster).await?;
    let builder = ClientBuilder::try_from(config).map_err(|e| ClusterError::ClientConstruction {
        cluster: cluster.to_string(),
        reason: e.to_string(),
    })?;

    let client = match rest_config.throttle {
        Some(throttle) => builder
            .with_layer(&RateLimitLayer::new(
                u64::from(throttle.burst),
                throttle.period(),
            ))
            .build(),
        None => builder.build(),
    };
    Ok(client)
}
