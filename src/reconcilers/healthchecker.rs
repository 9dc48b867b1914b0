// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Health probing of remote clusters.
//!
//! A probe issues `GET /healthz` through the cached remote client and maps the
//! result to `Ready`/`Offline` conditions:
//!
//! | Outcome                         | Conditions                          |
//! |---------------------------------|-------------------------------------|
//! | request failed                  | `Offline=True`                      |
//! | answered, body not `ok`         | `Ready=False`, `Offline=False`      |
//! | answered `ok` (any case)        | `Ready=True`                        |
//!
//! The path is resolved against the API endpoint of the remote client, path
//! included. A cluster registered behind a proxy such as
//! `https://rancher.example.com/k8s/clusters/c-1` is checked at
//! `https://rancher.example.com/k8s/clusters/c-1/healthz`, which is the health
//! endpoint of the proxied API server.
//!
//! Transition times are carried over from the previous status for conditions
//! whose type and status did not change. The status is then written through
//! the local client.

use std::sync::Arc;

use chrono::Utc;
use kube::{Client, ResourceExt};
use tracing::{debug, info, warn};

use crate::cluster::ToolchainClusterClient;
use crate::constants::{HEALTHZ_OK, HEALTHZ_PATH};
use crate::crd::{Condition, ToolchainCluster, ToolchainClusterStatus};
use crate::errors::ClusterError;
use crate::metrics;
use crate::reconcilers::status::{conditions_equal, create_condition_at, preserve_transition_times};
use crate::status_reasons::{
    CONDITION_STATUS_FALSE, CONDITION_STATUS_TRUE, CONDITION_TYPE_OFFLINE, CONDITION_TYPE_READY,
    MESSAGE_CLUSTER_NOT_REACHABLE, MESSAGE_CLUSTER_REACHABLE, MESSAGE_HEALTHZ_NOT_OK,
    MESSAGE_HEALTHZ_OK, REASON_CLUSTER_NOT_READY, REASON_CLUSTER_NOT_REACHABLE,
    REASON_CLUSTER_REACHABLE, REASON_CLUSTER_READY,
};

/// Result of a single `/healthz` request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The API server answered `ok`.
    Healthy,
    /// The API server answered with anything else.
    Unhealthy,
    /// The request failed.
    Unreachable,
}

impl ProbeOutcome {
    #[must_use]
    pub fn is_ready(self) -> bool {
        self == Self::Healthy
    }

    #[must_use]
    pub fn is_offline(self) -> bool {
        self == Self::Unreachable
    }
}

/// Conditions describing `outcome`, stamped with `now`.
#[must_use]
pub fn health_conditions(outcome: ProbeOutcome, now: &str) -> Vec<Condition> {
    match outcome {
        ProbeOutcome::Healthy => vec![create_condition_at(
            CONDITION_TYPE_READY,
            CONDITION_STATUS_TRUE,
            REASON_CLUSTER_READY,
            MESSAGE_HEALTHZ_OK,
            now,
        )],
        ProbeOutcome::Unhealthy => vec![
            create_condition_at(
                CONDITION_TYPE_READY,
                CONDITION_STATUS_FALSE,
                REASON_CLUSTER_NOT_READY,
                MESSAGE_HEALTHZ_NOT_OK,
                now,
            ),
            create_condition_at(
                CONDITION_TYPE_OFFLINE,
                CONDITION_STATUS_FALSE,
                REASON_CLUSTER_REACHABLE,
                MESSAGE_CLUSTER_REACHABLE,
                now,
            ),
        ],
        ProbeOutcome::Unreachable => vec![offline_condition(MESSAGE_CLUSTER_NOT_REACHABLE, now)],
    }
}

/// `Offline=True` condition with a custom message.
#[must_use]
pub fn offline_condition(message: &str, now: &str) -> Condition {
    create_condition_at(
        CONDITION_TYPE_OFFLINE,
        CONDITION_STATUS_TRUE,
        REASON_CLUSTER_NOT_REACHABLE,
        message,
        now,
    )
}

/// Probes one remote cluster and records the result on its `ToolchainCluster`.
pub struct HealthChecker {
    local_client: Arc<dyn ToolchainClusterClient>,
    remote_client: Client,
    cluster_name: String,
}

impl HealthChecker {
    #[must_use]
    pub fn new(
        local_client: Arc<dyn ToolchainClusterClient>,
        remote_client: Client,
        cluster_name: impl Into<String>,
    ) -> Self {
        Self {
            local_client,
            remote_client,
            cluster_name: cluster_name.into(),
        }
    }

    /// Issue `GET /healthz` against the remote cluster, below any path prefix
    /// of its API endpoint.
    ///
    /// Bounded by the timeout configured on the remote client.
    pub async fn probe(&self) -> ProbeOutcome {
        let request = match http::Request::get(HEALTHZ_PATH).body(Vec::new()) {
            Ok(request) => request,
            Err(e) => {
                warn!(cluster = %self.cluster_name, error = %e, "Failed to build health request");
                return ProbeOutcome::Unreachable;
            }
        };

        match self.remote_client.request_text(request).await {
            Ok(body) if body.eq_ignore_ascii_case(HEALTHZ_OK) => ProbeOutcome::Healthy,
            Ok(body) => {
                debug!(cluster = %self.cluster_name, body = %body, "/healthz did not respond with ok");
                ProbeOutcome::Unhealthy
            }
            Err(e) => {
                warn!(cluster = %self.cluster_name, error = %e, "Failed to reach cluster");
                ProbeOutcome::Unreachable
            }
        }
    }

    /// Probe the cluster, merge the resulting conditions with the previous
    /// status, and write the new status through the local client.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::StatusUpdateFailed`] when the status cannot be
    /// written. Probe failures are reported as conditions, not errors.
    pub async fn update_individual_cluster_status(
        &self,
        toolchain_cluster: &ToolchainCluster,
    ) -> Result<ToolchainClusterStatus, ClusterError> {
        let outcome = self.probe().await;
        let mut conditions = health_conditions(outcome, &Utc::now().to_rfc3339());

        let previous = toolchain_cluster
            .status
            .as_ref()
            .map(|status| status.conditions.as_slice())
            .unwrap_or_default();
        preserve_transition_times(previous, &mut conditions);

        if conditions_equal(previous, &conditions) {
            debug!(cluster = %self.cluster_name, ?outcome, "Cluster health unchanged");
        } else {
            info!(cluster = %self.cluster_name, ?outcome, "Cluster health changed");
        }

        let status = ToolchainClusterStatus { conditions };
        let mut updated = toolchain_cluster.clone();
        updated.status = Some(status.clone());

        self.local_client
            .update_toolchain_cluster_status(&updated)
            .await
            .map_err(|source| ClusterError::StatusUpdateFailed {
                cluster: toolchain_cluster.name_any(),
                source: Box::new(source),
            })?;

        metrics::record_cluster_health(&self.cluster_name, outcome.is_ready(), outcome.is_offline());
        Ok(status)
    }
}
