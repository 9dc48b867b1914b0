// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory registry of remote cluster clients, keyed by cluster name.
//!
//! The registry is written by [`ToolchainClusterService`](super::service::ToolchainClusterService)
//! and read by anyone holding a reference to it. A lookup that misses can ask
//! the [`CacheRefresher`] it was built with to re-list every `ToolchainCluster`
//! and repopulate the map. The map lock is never held while refreshing.
//!
//! Every eviction bumps a delete epoch and leaves a tombstone. A refresh
//! captures the epoch before it lists, and its inserts are dropped for any
//! name evicted after that point, so a refresh racing with an eviction cannot
//! bring the evicted cluster back.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use kube::Client;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::config::{ClusterConfig, ClusterType};
use crate::crd::ToolchainClusterStatus;
use crate::errors::ClusterError;
use crate::labels::role_label;
use crate::metrics;
use crate::status_reasons::{CONDITION_STATUS_TRUE, CONDITION_TYPE_READY};

/// A cache entry: derived configuration, live client, and the latest status
/// observed for the cluster.
#[derive(Clone)]
pub struct CachedToolchainCluster {
    pub config: ClusterConfig,
    pub client: Client,
    pub cluster_status: Option<ToolchainClusterStatus>,
}

impl CachedToolchainCluster {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }
}

/// Repopulates a [`ClusterCache`] from the `ToolchainCluster` resources.
#[async_trait]
pub trait CacheRefresher: Send + Sync {
    async fn refresh_all(&self) -> Result<(), ClusterError>;
}

/// Predicate over cache entries, used by the lookup helpers.
pub type ClusterFilter = dyn Fn(&CachedToolchainCluster) -> bool + Send + Sync;

/// Selects clusters whose cached status carries `Ready=True`.
#[must_use]
pub fn is_ready(cluster: &CachedToolchainCluster) -> bool {
    cluster.cluster_status.as_ref().is_some_and(|status| {
        status
            .conditions
            .iter()
            .any(|c| c.r#type == CONDITION_TYPE_READY && c.status == CONDITION_STATUS_TRUE)
    })
}

/// Selects clusters labelled with the given cluster role.
pub fn has_cluster_role(role: &str) -> impl Fn(&CachedToolchainCluster) -> bool + Send + Sync {
    let label = role_label(role);
    move |cluster: &CachedToolchainCluster| cluster.config.labels.contains_key(&label)
}

/// Entries plus the eviction bookkeeping, guarded by one lock.
#[derive(Default)]
struct Registry {
    clusters: HashMap<String, Arc<CachedToolchainCluster>>,
    /// Incremented on every eviction
    delete_epoch: u64,
    /// Epoch at which each name was last evicted
    tombstones: HashMap<String, u64>,
}

/// Process-wide registry of remote cluster clients.
#[derive(Default)]
pub struct ClusterCache {
    registry: RwLock<Registry>,
    refresher: Option<Weak<dyn CacheRefresher>>,
}

impl ClusterCache {
    /// Registry without a refresher; misses are never refreshed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that refreshes through `refresher` on lookup misses.
    #[must_use]
    pub fn with_refresher(refresher: Weak<dyn CacheRefresher>) -> Self {
        Self {
            registry: RwLock::new(Registry::default()),
            refresher: Some(refresher),
        }
    }

    /// Insert or replace the entry for `cluster.config.name`.
    pub(crate) async fn add(&self, cluster: CachedToolchainCluster) {
        let name = cluster.config.name.clone();
        let size = {
            let mut registry = self.registry.write().await;
            registry.tombstones.remove(&name);
            registry.clusters.insert(name.clone(), Arc::new(cluster));
            registry.clusters.len()
        };
        debug!(cluster = %name, "Stored cluster in cache");
        metrics::set_cached_clusters(size);
    }

    /// Current delete epoch. Pass it to [`Self::add_if_not_deleted_since`]
    /// for entries derived from a listing taken after this call.
    pub(crate) async fn delete_epoch(&self) -> u64 {
        self.registry.read().await.delete_epoch
    }

    /// Insert or replace the entry unless its name was evicted after `epoch`.
    /// Returns whether the entry was stored.
    pub(crate) async fn add_if_not_deleted_since(
        &self,
        cluster: CachedToolchainCluster,
        epoch: u64,
    ) -> bool {
        let name = cluster.config.name.clone();
        let size = {
            let mut registry = self.registry.write().await;
            if registry
                .tombstones
                .get(&name)
                .is_some_and(|deleted_at| *deleted_at > epoch)
            {
                debug!(cluster = %name, "Cluster evicted during refresh, not re-adding it");
                return false;
            }
            registry.clusters.insert(name.clone(), Arc::new(cluster));
            registry.clusters.len()
        };
        debug!(cluster = %name, "Stored cluster in cache");
        metrics::set_cached_clusters(size);
        true
    }

    /// Remove the entry for `name`; removing a missing entry is a no-op.
    pub(crate) async fn delete(&self, name: &str) {
        let (removed, size) = {
            let mut registry = self.registry.write().await;
            registry.delete_epoch += 1;
            let epoch = registry.delete_epoch;
            registry.tombstones.insert(name.to_string(), epoch);
            let removed = registry.clusters.remove(name).is_some();
            (removed, registry.clusters.len())
        };
        if removed {
            debug!(cluster = %name, "Evicted cluster from cache");
            metrics::remove_cluster(name);
        }
        metrics::set_cached_clusters(size);
    }

    /// Look up a cluster by name.
    ///
    /// With `allow_refresh`, a miss triggers a full refresh before looking
    /// again.
    pub async fn get(&self, name: &str, allow_refresh: bool) -> Option<Arc<CachedToolchainCluster>> {
        let cached = self.registry.read().await.clusters.get(name).cloned();
        if cached.is_some() || !allow_refresh {
            return cached;
        }

        debug!(cluster = %name, "Cluster not cached, refreshing");
        self.refresh().await;
        self.registry.read().await.clusters.get(name).cloned()
    }

    /// Look up a cluster by name, refreshing the registry on a miss.
    pub async fn get_cached_toolchain_cluster(&self, name: &str) -> Option<Arc<CachedToolchainCluster>> {
        self.get(name, true).await
    }

    /// Replace the cached status of a cluster. Returns `false` when the
    /// cluster is not cached.
    pub async fn update_cluster_status(&self, name: &str, status: ToolchainClusterStatus) -> bool {
        let mut registry = self.registry.write().await;
        match registry.clusters.get_mut(name) {
            Some(entry) => {
                let mut updated = CachedToolchainCluster::clone(entry);
                updated.cluster_status = Some(status);
                *entry = Arc::new(updated);
                true
            }
            None => false,
        }
    }

    /// All cached clusters matching every filter, sorted by name.
    ///
    /// An empty registry is refreshed first.
    pub async fn get_clusters(&self, filters: &[&ClusterFilter]) -> Vec<Arc<CachedToolchainCluster>> {
        if self.is_empty().await {
            self.refresh().await;
        }

        let mut clusters: Vec<_> = self
            .registry
            .read()
            .await
            .clusters
            .values()
            .filter(|cluster| {
                let cluster: &CachedToolchainCluster = cluster;
                filters.iter().all(|filter| filter(cluster))
            })
            .cloned()
            .collect();
        clusters.sort_by(|a, b| a.config.name.cmp(&b.config.name));
        clusters
    }

    /// Cached member clusters matching every filter.
    pub async fn get_member_clusters(&self, filters: &[&ClusterFilter]) -> Vec<Arc<CachedToolchainCluster>> {
        self.get_clusters(filters)
            .await
            .into_iter()
            .filter(|cluster| cluster.config.cluster_type() == Some(ClusterType::Member))
            .collect()
    }

    /// The cached host cluster, if any.
    pub async fn get_host_cluster(&self) -> Option<Arc<CachedToolchainCluster>> {
        self.get_clusters(&[])
            .await
            .into_iter()
            .find(|cluster| cluster.config.cluster_type() == Some(ClusterType::Host))
    }

    /// Names of the cached clusters, sorted.
    pub async fn cluster_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registry.read().await.clusters.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn len(&self) -> usize {
        self.registry.read().await.clusters.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.registry.read().await.clusters.is_empty()
    }

    async fn refresh(&self) {
        let Some(refresher) = self.refresher.as_ref().and_then(Weak::upgrade) else {
            return;
        };
        if let Err(e) = refresher.refresh_all().await {
            warn!(error = %e, "Failed to refresh the cluster cache");
        }
    }
}
