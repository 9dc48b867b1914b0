// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Condition types, reasons and messages written to `ToolchainCluster` status.
//!
//! Reasons are programmatic identifiers in CamelCase that explain why a
//! condition has a particular status. A health probe produces one of three
//! condition sets:
//!
//! ```yaml
//! # /healthz answered "ok"
//! status:
//!   conditions:
//!     - type: Ready
//!       status: "True"
//!       reason: ClusterReady
//!       message: /healthz responded with ok
//!
//! # /healthz answered something else
//! status:
//!   conditions:
//!     - type: Ready
//!       status: "False"
//!       reason: ClusterNotReady
//!       message: /healthz responded without ok
//!     - type: Offline
//!       status: "False"
//!       reason: ClusterReachable
//!       message: cluster is reachable
//!
//! # /healthz could not be reached
//! status:
//!   conditions:
//!     - type: Offline
//!       status: "True"
//!       reason: ClusterNotReachable
//!       message: cluster is not reachable
//! ```

// ============================================================================
// Condition Types
// ============================================================================

/// The remote API server answered its health endpoint.
pub const CONDITION_TYPE_READY: &str = "Ready";

/// Reachability of the remote API server.
pub const CONDITION_TYPE_OFFLINE: &str = "Offline";

// ============================================================================
// Condition Status Values
// ============================================================================

pub const CONDITION_STATUS_TRUE: &str = "True";
pub const CONDITION_STATUS_FALSE: &str = "False";
pub const CONDITION_STATUS_UNKNOWN: &str = "Unknown";

// ============================================================================
// Reasons
// ============================================================================

/// `/healthz` responded with `ok`.
pub const REASON_CLUSTER_READY: &str = "ClusterReady";

/// `/healthz` responded, but not with `ok`.
pub const REASON_CLUSTER_NOT_READY: &str = "ClusterNotReady";

/// The health request itself failed (connection, TLS, timeout, non-2xx).
pub const REASON_CLUSTER_NOT_REACHABLE: &str = "ClusterNotReachable";

/// The API server answered, so it is reachable.
pub const REASON_CLUSTER_REACHABLE: &str = "ClusterReachable";

// ============================================================================
// Messages
// ============================================================================

pub const MESSAGE_HEALTHZ_OK: &str = "/healthz responded with ok";
pub const MESSAGE_HEALTHZ_NOT_OK: &str = "/healthz responded without ok";
pub const MESSAGE_CLUSTER_NOT_REACHABLE: &str = "cluster is not reachable";
pub const MESSAGE_CLUSTER_REACHABLE: &str = "cluster is reachable";
