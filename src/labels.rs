// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Label keys and values carried by `ToolchainCluster` resources.
//!
//! Cluster registration tooling writes the `type`, `namespace` and
//! `ownerClusterName` labels; the controller adds the cluster-role label.

// ============================================================================
// Registration Labels
// ============================================================================

/// Label holding the cluster type (`host` or `member`)
pub const LABEL_TYPE: &str = "type";

/// Label holding the namespace the operator runs in on the remote cluster
pub const LABEL_NAMESPACE: &str = "namespace";

/// Label holding the name of the cluster that owns this `ToolchainCluster`
pub const LABEL_OWNER_CLUSTER_NAME: &str = "ownerClusterName";

// ============================================================================
// Cluster Type Values
// ============================================================================

/// Value of the `type` label for host clusters
pub const CLUSTER_TYPE_HOST: &str = "host";

/// Value of the `type` label for member clusters
pub const CLUSTER_TYPE_MEMBER: &str = "member";

// ============================================================================
// Cluster Roles
// ============================================================================

/// Prefix shared by all cluster-role labels
pub const CLUSTER_ROLE_LABEL_PREFIX: &str = "cluster-role.toolchain.dev.openshift.com";

/// Role of member clusters that accept tenant workloads
pub const ROLE_TENANT: &str = "tenant";

/// Build the cluster-role label key for a role.
///
/// ```
/// use toolchain_common::labels::{role_label, ROLE_TENANT};
///
/// assert_eq!(
///     role_label(ROLE_TENANT),
///     "cluster-role.toolchain.dev.openshift.com/tenant"
/// );
/// ```
#[must_use]
pub fn role_label(role: &str) -> String {
    format!("{CLUSTER_ROLE_LABEL_PREFIX}/{role}")
}
