// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # toolchain-common - Multi-cluster client cache for Kubernetes operators
//!
//! Operators that span a host cluster and a set of member clusters register
//! each remote cluster with a `ToolchainCluster` resource. This library turns
//! those resources into ready-to-use Kubernetes clients, keeps them in a
//! shared cache, and tracks the health of every remote API server.
//!
//! ## Modules
//!
//! - [`crd`] - The `ToolchainCluster` Custom Resource Definition
//! - [`cluster`] - Connection settings, the client cache and the service maintaining it
//! - [`reconcilers`] - The `ToolchainCluster` reconciler and the `/healthz` health checker
//! - [`context`] - Shared state handed to every reconcile
//! - [`config`] - Operator command-line and environment settings
//! - [`metrics`] - Prometheus metrics
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use toolchain_common::cluster::{
//!     KubeToolchainClusterClient, ToolchainClusterClient, ToolchainClusterService,
//! };
//!
//! # async fn run() -> anyhow::Result<()> {
//! let client = kube::Client::try_default().await?;
//! let client: Arc<dyn ToolchainClusterClient> = Arc::new(KubeToolchainClusterClient::new(client));
//! let service = ToolchainClusterService::new(client, "toolchain-host-operator", Duration::from_secs(3));
//!
//! for member in service.cache().get_member_clusters(&[]).await {
//!     println!("{} -> {}", member.name(), member.config.api_endpoint);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cluster;
pub mod config;
pub mod constants;
pub mod context;
pub mod crd;
pub mod duration;
pub mod errors;
pub mod labels;
pub mod metrics;
pub mod reconcilers;
pub mod status_reasons;

#[cfg(test)]
pub(crate) mod test_support;

#[cfg(test)]
mod duration_tests;
