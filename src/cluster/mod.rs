// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Multi-cluster client cache.
//!
//! - [`client`] - local object client used to read `ToolchainCluster` resources and secrets
//! - [`config`] - derives remote connection settings and builds remote clients
//! - [`cache`] - registry of remote clients keyed by cluster name
//! - [`service`] - keeps the registry in sync with the `ToolchainCluster` resources

pub mod cache;
pub mod client;
pub mod config;
pub mod service;

pub use cache::{
    has_cluster_role, is_ready, CacheRefresher, CachedToolchainCluster, ClusterCache, ClusterFilter,
};
pub use client::{KubeToolchainClusterClient, ToolchainClusterClient};
pub use config::{
    list_toolchain_cluster_configs, new_cluster_config, new_remote_client, ClientFactory,
    ClusterConfig, ClusterType, DefaultClientFactory, RestConfig, Throttle,
};
pub use service::ToolchainClusterService;

#[cfg(test)]
mod config_tests;
