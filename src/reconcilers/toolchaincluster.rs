// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `ToolchainCluster` reconciliation logic.
//!
//! Each reconcile re-reads the resource, then:
//!
//! 1. evicts the cache entry when the resource is gone,
//! 2. adds the tenant cluster-role label to member clusters that lack one,
//! 3. refreshes the cache entry through the [`ToolchainClusterService`](crate::cluster::ToolchainClusterService),
//! 4. when health checking is enabled, probes the cluster, writes its status
//!    and requeues after the health-check period.
//!
//! The decision of what to do is made by [`plan_reconcile`]; the driver
//! [`reconcile_toolchaincluster`] performs the I/O.

use anyhow::{Context as _, Result};
use chrono::Utc;
use kube::runtime::controller::Action;
use kube::ResourceExt;
use tracing::{debug, info, warn};

use crate::context::Context;
use crate::crd::{ToolchainCluster, ToolchainClusterStatus};
use crate::errors::ClusterError;
use crate::labels::{role_label, CLUSTER_TYPE_MEMBER, LABEL_TYPE, ROLE_TENANT};
use crate::reconcilers::healthchecker::{offline_condition, HealthChecker};

/// What a reconcile has to do for one `ToolchainCluster`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconcileAction {
    /// The resource is gone; drop its cache entry.
    EvictCache,
    /// Member cluster without a role label; add it, persist, then sync.
    AddRoleLabelAndSync,
    /// Sync the cache entry as is.
    Sync,
}

/// Decide what to do from the freshly fetched resource.
#[must_use]
pub fn plan_reconcile(toolchain_cluster: Option<&ToolchainCluster>) -> ReconcileAction {
    match toolchain_cluster {
        None => ReconcileAction::EvictCache,
        Some(tc) if needs_role_label(tc) => ReconcileAction::AddRoleLabelAndSync,
        Some(_) => ReconcileAction::Sync,
    }
}

/// A member cluster needs the tenant role label when it does not carry it yet.
#[must_use]
pub fn needs_role_label(toolchain_cluster: &ToolchainCluster) -> bool {
    let labels = toolchain_cluster.labels();
    labels.get(LABEL_TYPE).map(String::as_str) == Some(CLUSTER_TYPE_MEMBER)
        && !labels.contains_key(&role_label(ROLE_TENANT))
}

/// Add the tenant role label without touching any other label.
pub fn add_role_label(toolchain_cluster: &mut ToolchainCluster) {
    toolchain_cluster
        .labels_mut()
        .entry(role_label(ROLE_TENANT))
        .or_default();
}

/// Reconcile the `ToolchainCluster` `namespace/name`.
///
/// # Returns
///
/// - `await_change` when the resource is gone or health checking is disabled
/// - `requeue(period)` after a successful health check
///
/// # Errors
///
/// Returns an error when the resource cannot be read or updated, the cache
/// entry cannot be built, or the health status cannot be written.
pub async fn reconcile_toolchaincluster(ctx: &Context, namespace: &str, name: &str) -> Result<Action> {
    debug!(cluster = %name, namespace = %namespace, "Reconciling ToolchainCluster");

    let fetched = ctx
        .client
        .get_toolchain_cluster(namespace, name)
        .await
        .with_context(|| format!("failed to get ToolchainCluster {namespace}/{name}"))?;

    let toolchain_cluster = match (plan_reconcile(fetched.as_ref()), fetched) {
        (ReconcileAction::AddRoleLabelAndSync, Some(mut tc)) => {
            add_role_label(&mut tc);
            info!(cluster = %name, label = %role_label(ROLE_TENANT), "Adding cluster-role label");
            ctx.client
                .update_toolchain_cluster(&tc)
                .await
                .with_context(|| format!("failed to add cluster-role label to ToolchainCluster {name}"))?
        }
        (ReconcileAction::Sync, Some(tc)) => tc,
        _ => {
            info!(cluster = %name, "ToolchainCluster not found, removing it from cache");
            ctx.service.delete_toolchain_cluster(name).await;
            return Ok(Action::await_change());
        }
    };

    ctx.service
        .add_or_update_toolchain_cluster(&toolchain_cluster)
        .await
        .with_context(|| format!("failed to cache ToolchainCluster {name}"))?;

    let Some(period) = ctx.health_check_period else {
        return Ok(Action::await_change());
    };

    check_health(ctx, &toolchain_cluster).await?;
    Ok(Action::requeue(period))
}

/// Probe the cached cluster and record its status in the resource and the cache.
pub(crate) async fn check_health(ctx: &Context, toolchain_cluster: &ToolchainCluster) -> Result<()> {
    let name = toolchain_cluster.name_any();

    let Some(cached) = ctx.cache().get(&name, false).await else {
        warn!(cluster = %name, "Cluster missing from cache, marking it offline");
        let message = format!("cluster {name} not found in cache");
        let mut offline = toolchain_cluster.clone();
        offline.status = Some(ToolchainClusterStatus {
            conditions: vec![offline_condition(&message, &Utc::now().to_rfc3339())],
        });
        ctx.client
            .update_toolchain_cluster_status(&offline)
            .await
            .map_err(|source| ClusterError::StatusUpdateFailed {
                cluster: name.clone(),
                source: Box::new(source),
            })?;
        return Err(ClusterError::ClusterNotCached { cluster: name }.into());
    };

    let checker = HealthChecker::new(ctx.client.clone(), cached.client.clone(), name.as_str());
    let status = checker.update_individual_cluster_status(toolchain_cluster).await?;
    ctx.cache().update_cluster_status(&name, status).await;
    Ok(())
}
