// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the toolchain cluster subsystem.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Resource Kinds
// ============================================================================

/// Kind name for `ToolchainCluster` resource
pub const KIND_TOOLCHAIN_CLUSTER: &str = "ToolchainCluster";

// ============================================================================
// Secret Keys
// ============================================================================

/// Secret data key holding a complete kubeconfig for the remote cluster
pub const SECRET_KEY_KUBECONFIG: &str = "kubeconfig";

/// Secret data key holding a legacy bearer token for the remote cluster
pub const SECRET_KEY_TOKEN: &str = "token";

// ============================================================================
// Remote Client Constants
// ============================================================================

/// Requests per second allowed for clients built in legacy token mode
pub const LEGACY_CLIENT_QPS: u32 = 20;

/// Burst allowance for clients built in legacy token mode
pub const LEGACY_CLIENT_BURST: u32 = 30;

/// Default timeout for requests against remote clusters
pub const DEFAULT_CLUSTER_TIMEOUT: &str = "3s";

/// Path of the API server health endpoint
pub const HEALTHZ_PATH: &str = "/healthz";

/// Body returned by a healthy API server on `/healthz`
pub const HEALTHZ_OK: &str = "ok";

// ============================================================================
// Controller Constants
// ============================================================================

/// Default period between two health checks of the same cluster
pub const DEFAULT_HEALTH_CHECK_PERIOD: &str = "10s";

/// Requeue duration for controller errors (30 seconds)
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

/// Field manager name used for writes made by the controller
pub const FIELD_MANAGER: &str = "toolchaincluster-controller";

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

// ============================================================================
// Metrics Server Constants
// ============================================================================

/// Port for Prometheus metrics HTTP server
pub const METRICS_SERVER_PORT: u16 = 8080;

/// Path for Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Bind address for metrics HTTP server
pub const METRICS_SERVER_BIND_ADDRESS: [u8; 4] = [0, 0, 0, 0];
