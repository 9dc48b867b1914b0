// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes reconciliation for `ToolchainCluster` resources.
//!
//! # Reconciliation Architecture
//!
//! The controller follows the standard Kubernetes controller pattern:
//!
//! 1. **Watch** - Monitor `ToolchainCluster` changes via the Kubernetes API
//! 2. **Reconcile** - Derive the remote connection settings and refresh the client cache
//! 3. **Probe** - Call `/healthz` on the remote API server
//! 4. **Status** - Report `Ready`/`Offline` conditions back to Kubernetes
//!
//! # Available Reconcilers
//!
//! - [`reconcile_toolchaincluster`] - Keeps the cluster cache in sync and drives health checks
//!
//! # Example: Using the Reconciler
//!
//! ```rust,no_run
//! use toolchain_common::context::Context;
//! use toolchain_common::reconcilers::reconcile_toolchaincluster;
//!
//! async fn reconcile(ctx: &Context) -> anyhow::Result<()> {
//!     let action = reconcile_toolchaincluster(ctx, "toolchain-host-operator", "member-1").await?;
//!     println!("next: {action:?}");
//!     Ok(())
//! }
//! ```

pub mod healthchecker;
pub mod status;
pub mod toolchaincluster;

pub use healthchecker::{health_conditions, HealthChecker, ProbeOutcome};
pub use toolchaincluster::{plan_reconcile, reconcile_toolchaincluster, ReconcileAction};
