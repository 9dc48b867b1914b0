// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the `ToolchainCluster` controller and client cache.
//!
//! All metrics carry the namespace prefix `toolchain_dev_openshift_com_`
//! (prometheus-safe version of "toolchain.dev.openshift.com").
//!
//! # Metrics Categories
//!
//! - **Reconciliation Metrics** - Track reconciliation operations and their outcomes
//! - **Cluster Cache Metrics** - Track cached clusters and client rebuilds
//! - **Health Metrics** - Last observed health of each remote cluster
//! - **Error Metrics** - Track error conditions and types
//!
//! # Example
//!
//! ```rust,no_run
//! use toolchain_common::metrics::record_reconciliation_success;
//!
//! record_reconciliation_success("ToolchainCluster", std::time::Duration::from_secs(1));
//! ```

use prometheus::{
    CounterVec, Encoder, Gauge, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry,
    TextEncoder,
};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all metrics (prometheus-safe)
const METRICS_NAMESPACE: &str = "toolchain_dev_openshift_com";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
///
/// All metrics are registered in this registry and exposed via `/metrics` endpoint.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Reconciliation Metrics
// ============================================================================

/// Total number of reconciliations by resource type and status
///
/// Labels:
/// - `resource_type`: Kind of resource (`ToolchainCluster`)
/// - `status`: Outcome (`success`, `error`)
pub static RECONCILIATION_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_reconciliations_total"),
        "Total number of reconciliations by resource type and status",
    );
    let counter = CounterVec::new(opts, &["resource_type", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of reconciliations in seconds
pub static RECONCILIATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_reconciliation_duration_seconds"),
        "Duration of reconciliations in seconds by resource type",
    )
    .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]);
    let histogram = HistogramVec::new(opts, &["resource_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

// ============================================================================
// Cluster Cache Metrics
// ============================================================================

/// Number of clusters currently held in the cache
pub static CACHED_CLUSTERS: LazyLock<Gauge> = LazyLock::new(|| {
    let gauge = Gauge::new(
        format!("{METRICS_NAMESPACE}_cached_clusters"),
        "Number of remote clusters held in the client cache",
    )
    .unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

/// Total number of remote clients built
///
/// Labels:
/// - `cluster`: Name of the `ToolchainCluster`
pub static CLUSTER_CLIENTS_CREATED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_cluster_clients_created_total"),
        "Total number of remote cluster clients built, by cluster",
    );
    let counter = CounterVec::new(opts, &["cluster"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Health Metrics
// ============================================================================

/// 1 when the last probe of a cluster answered `ok`, 0 otherwise
pub static CLUSTER_READY: LazyLock<GaugeVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_cluster_ready"),
        "Whether the last /healthz probe of the cluster answered ok",
    );
    let gauge = GaugeVec::new(opts, &["cluster"]).unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

/// 1 when the last probe of a cluster could not reach it, 0 otherwise
pub static CLUSTER_OFFLINE: LazyLock<GaugeVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_cluster_offline"),
        "Whether the last /healthz probe of the cluster failed to reach it",
    );
    let gauge = GaugeVec::new(opts, &["cluster"]).unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

// ============================================================================
// Error Metrics
// ============================================================================

/// Total number of errors by resource type and error category
pub static ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_errors_total"),
        "Total number of errors by resource type and category",
    );
    let counter = CounterVec::new(opts, &["resource_type", "error_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a successful reconciliation
pub fn record_reconciliation_success(resource_type: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[resource_type, "success"])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[resource_type])
        .observe(duration.as_secs_f64());
}

/// Record a failed reconciliation
pub fn record_reconciliation_error(resource_type: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[resource_type, "error"])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[resource_type])
        .observe(duration.as_secs_f64());
}

/// Record the current size of the cluster cache
#[allow(clippy::cast_precision_loss)]
pub fn set_cached_clusters(count: usize) {
    CACHED_CLUSTERS.set(count as f64);
}

/// Record that a new remote client was built for `cluster`
pub fn record_client_created(cluster: &str) {
    CLUSTER_CLIENTS_CREATED_TOTAL
        .with_label_values(&[cluster])
        .inc();
}

/// Record the outcome of a health probe
pub fn record_cluster_health(cluster: &str, ready: bool, offline: bool) {
    CLUSTER_READY
        .with_label_values(&[cluster])
        .set(if ready { 1.0 } else { 0.0 });
    CLUSTER_OFFLINE
        .with_label_values(&[cluster])
        .set(if offline { 1.0 } else { 0.0 });
}

/// Drop every per-cluster series of `cluster`. Missing series are ignored.
pub fn remove_cluster(cluster: &str) {
    let _ = CLUSTER_READY.remove_label_values(&[cluster]);
    let _ = CLUSTER_OFFLINE.remove_label_values(&[cluster]);
    let _ = CLUSTER_CLIENTS_CREATED_TOTAL.remove_label_values(&[cluster]);
}

/// Record an error
pub fn record_error(resource_type: &str, error_type: &str) {
    ERRORS_TOTAL
        .with_label_values(&[resource_type, error_type])
        .inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
