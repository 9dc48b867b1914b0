// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context for the `ToolchainCluster` controller.
//!
//! The controller receives an `Arc<Context>` holding the local object client,
//! the service that owns the cluster cache, and the health-check period.

use std::sync::Arc;
use std::time::Duration;

use crate::cluster::{ClusterCache, ToolchainClusterClient, ToolchainClusterService};

/// Shared context passed to the reconciler.
#[derive(Clone)]
pub struct Context {
    /// Client for the local cluster holding the `ToolchainCluster` resources
    pub client: Arc<dyn ToolchainClusterClient>,

    /// Service populating the cluster cache
    pub service: Arc<ToolchainClusterService>,

    /// Period between health checks; `None` disables health checking
    pub health_check_period: Option<Duration>,
}

impl Context {
    #[must_use]
    pub fn new(
        client: Arc<dyn ToolchainClusterClient>,
        service: Arc<ToolchainClusterService>,
        health_check_period: Option<Duration>,
    ) -> Self {
        Self {
            client,
            service,
            health_check_period,
        }
    }

    /// The cluster cache owned by the service.
    #[must_use]
    pub fn cache(&self) -> &Arc<ClusterCache> {
        self.service.cache()
    }
}
