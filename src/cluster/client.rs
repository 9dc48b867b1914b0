// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Local object client used by the cluster subsystem.
//!
//! The loader, service and reconciler only need a handful of calls against the
//! local API server. They go through [`ToolchainClusterClient`] so tests can
//! substitute a mock.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{
    api::{ListParams, PostParams},
    Api, Client, ResourceExt,
};

#[cfg(test)]
use mockall::automock;

use crate::constants::FIELD_MANAGER;
use crate::crd::ToolchainCluster;
use crate::errors::ClusterError;

/// Reads and writes `ToolchainCluster` resources and their secrets on the
/// local cluster.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ToolchainClusterClient: Send + Sync {
    /// Fetch a secret; `Ok(None)` when it does not exist.
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>, ClusterError>;

    /// Fetch a `ToolchainCluster`; `Ok(None)` when it does not exist.
    async fn get_toolchain_cluster(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ToolchainCluster>, ClusterError>;

    /// List every `ToolchainCluster` in a namespace.
    async fn list_toolchain_clusters(
        &self,
        namespace: &str,
    ) -> Result<Vec<ToolchainCluster>, ClusterError>;

    /// Replace a `ToolchainCluster` (metadata and spec).
    async fn update_toolchain_cluster(
        &self,
        toolchain_cluster: &ToolchainCluster,
    ) -> Result<ToolchainCluster, ClusterError>;

    /// Replace the status subresource of a `ToolchainCluster`.
    async fn update_toolchain_cluster_status(
        &self,
        toolchain_cluster: &ToolchainCluster,
    ) -> Result<ToolchainCluster, ClusterError>;
}

/// [`ToolchainClusterClient`] backed by a `kube::Client`.
#[derive(Clone)]
pub struct KubeToolchainClusterClient {
    client: Client,
}

impl KubeToolchainClusterClient {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn toolchain_clusters(&self, namespace: &str) -> Api<ToolchainCluster> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

fn post_params() -> PostParams {
    PostParams {
        field_manager: Some(FIELD_MANAGER.to_string()),
        ..PostParams::default()
    }
}

#[async_trait]
impl ToolchainClusterClient for KubeToolchainClusterClient {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>, ClusterError> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.get_opt(name).await?)
    }

    async fn get_toolchain_cluster(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ToolchainCluster>, ClusterError> {
        Ok(self.toolchain_clusters(namespace).get_opt(name).await?)
    }

    async fn list_toolchain_clusters(
        &self,
        namespace: &str,
    ) -> Result<Vec<ToolchainCluster>, ClusterError> {
        let list = self
            .toolchain_clusters(namespace)
            .list(&ListParams::default())
            .await?;
        Ok(list.items)
    }

    async fn update_toolchain_cluster(
        &self,
        toolchain_cluster: &ToolchainCluster,
    ) -> Result<ToolchainCluster, ClusterError> {
        let namespace = toolchain_cluster.namespace().unwrap_or_default();
        let name = toolchain_cluster.name_any();
        Ok(self
            .toolchain_clusters(&namespace)
            .replace(&name, &post_params(), toolchain_cluster)
            .await?)
    }

    async fn update_toolchain_cluster_status(
        &self,
        toolchain_cluster: &ToolchainCluster,
    ) -> Result<ToolchainCluster, ClusterError> {
        let namespace = toolchain_cluster.namespace().unwrap_or_default();
        let name = toolchain_cluster.name_any();
        Ok(self
            .toolchain_clusters(&namespace)
            .replace_status(&name, &post_params(), toolchain_cluster)
            .await?)
    }
}
