// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Populates the [`ClusterCache`] from `ToolchainCluster` resources.

use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use kube::ResourceExt;
use tracing::{debug, info, warn};

use super::cache::{CacheRefresher, CachedToolchainCluster, ClusterCache};
use super::client::ToolchainClusterClient;
use super::config::{
    list_toolchain_cluster_configs, new_cluster_config, ClientFactory, ClusterConfig,
    DefaultClientFactory,
};
use crate::crd::ToolchainCluster;
use crate::errors::ClusterError;
use crate::metrics;

/// Single writer of the cluster cache.
///
/// Owns the cache it populates and acts as that cache's refresher.
pub struct ToolchainClusterService {
    client: Arc<dyn ToolchainClusterClient>,
    factory: Arc<dyn ClientFactory>,
    cache: Arc<ClusterCache>,
    namespace: String,
    timeout: Duration,
}

impl ToolchainClusterService {
    /// Service building real remote clients for the `ToolchainCluster`
    /// resources of `namespace`.
    #[must_use]
    pub fn new(
        client: Arc<dyn ToolchainClusterClient>,
        namespace: impl Into<String>,
        timeout: Duration,
    ) -> Arc<Self> {
        Self::with_client_factory(client, Arc::new(DefaultClientFactory), namespace, timeout)
    }

    /// Service building remote clients through `factory`.
    #[must_use]
    pub fn with_client_factory(
        client: Arc<dyn ToolchainClusterClient>,
        factory: Arc<dyn ClientFactory>,
        namespace: impl Into<String>,
        timeout: Duration,
    ) -> Arc<Self> {
        let namespace = namespace.into();
        Arc::new_cyclic(|service: &Weak<Self>| {
            let refresher: Weak<dyn CacheRefresher> = service.clone();
            Self {
                client,
                factory,
                cache: Arc::new(ClusterCache::with_refresher(refresher)),
                namespace,
                timeout,
            }
        })
    }

    /// The registry this service populates.
    #[must_use]
    pub fn cache(&self) -> &Arc<ClusterCache> {
        &self.cache
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Derive the configuration of `toolchain_cluster` and store it in the
    /// cache, reusing the cached client when the connection settings did not
    /// change.
    ///
    /// # Errors
    ///
    /// Fails when the configuration cannot be derived, has no operator
    /// namespace, or a new client cannot be built. The cache is left
    /// untouched on failure.
    pub async fn add_or_update_toolchain_cluster(
        &self,
        toolchain_cluster: &ToolchainCluster,
    ) -> Result<(), ClusterError> {
        self.add_or_update(toolchain_cluster, None).await
    }

    /// With `listed_at` set, the entry is dropped if its cluster was evicted
    /// after that delete epoch.
    async fn add_or_update(
        &self,
        toolchain_cluster: &ToolchainCluster,
        listed_at: Option<u64>,
    ) -> Result<(), ClusterError> {
        let config = new_cluster_config(self.client.as_ref(), toolchain_cluster, self.timeout).await?;
        if config.operator_namespace.is_empty() {
            return Err(ClusterError::MissingOperatorNamespace {
                cluster: config.name,
            });
        }

        let client = match self.cache.get(&config.name, false).await {
            Some(cached) if cached.config.rest_config == config.rest_config => {
                debug!(cluster = %config.name, "Connection settings unchanged, reusing client");
                cached.client.clone()
            }
            _ => self.build_client(&config).await?,
        };

        let entry = CachedToolchainCluster {
            config,
            client,
            cluster_status: toolchain_cluster.status.clone(),
        };
        match listed_at {
            Some(epoch) => {
                self.cache.add_if_not_deleted_since(entry, epoch).await;
            }
            None => self.cache.add(entry).await,
        }
        Ok(())
    }

    async fn build_client(&self, config: &ClusterConfig) -> Result<kube::Client, ClusterError> {
        info!(
            cluster = %config.name,
            api_endpoint = %config.api_endpoint,
            "Creating client for cluster"
        );
        let client = self.factory.new_client(&config.name, &config.rest_config).await?;
        metrics::record_client_created(&config.name);
        Ok(client)
    }

    /// Evict a cluster from the cache. Idempotent.
    pub async fn delete_toolchain_cluster(&self, name: &str) {
        info!(cluster = %name, "Removing cluster from cache");
        self.cache.delete(name).await;
    }

    /// Derive the configuration of every `ToolchainCluster` in `namespace`.
    ///
    /// # Errors
    ///
    /// Fails if any single cluster cannot be resolved.
    pub async fn list_toolchain_cluster_configs(
        &self,
        namespace: &str,
        timeout: Duration,
    ) -> Result<Vec<ClusterConfig>, ClusterError> {
        list_toolchain_cluster_configs(self.client.as_ref(), namespace, timeout).await
    }
}

#[async_trait]
impl CacheRefresher for ToolchainClusterService {
    async fn refresh_all(&self) -> Result<(), ClusterError> {
        let listed_at = self.cache.delete_epoch().await;
        let toolchain_clusters = self.client.list_toolchain_clusters(&self.namespace).await?;
        debug!(
            namespace = %self.namespace,
            count = toolchain_clusters.len(),
            "Refreshing cluster cache"
        );
        for toolchain_cluster in &toolchain_clusters {
            if let Err(e) = self.add_or_update(toolchain_cluster, Some(listed_at)).await {
                warn!(
                    cluster = %toolchain_cluster.name_any(),
                    error = %e,
                    "Failed to cache cluster during refresh"
                );
            }
        }
        Ok(())
    }
}
