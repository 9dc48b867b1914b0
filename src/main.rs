// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use clap::Parser;
use futures::StreamExt;
use kube::{
    runtime::{controller, controller::Action, watcher::Config, Controller},
    Api, Client, ResourceExt,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use toolchain_common::{
    cluster::{KubeToolchainClusterClient, ToolchainClusterClient, ToolchainClusterService},
    config::{LogFormat, OperatorConfig},
    constants::{
        ERROR_REQUEUE_DURATION_SECS, KIND_TOOLCHAIN_CLUSTER, METRICS_SERVER_PATH,
        TOKIO_WORKER_THREADS,
    },
    context::Context,
    crd::ToolchainCluster,
    errors::ClusterError,
    metrics,
    reconcilers::reconcile_toolchaincluster,
};
use tracing::{debug, error, info, warn};

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
struct ReconcileError(#[from] anyhow::Error);

fn main() -> Result<()> {
    let config = OperatorConfig::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("toolchaincluster-controller")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(config))
}

async fn async_main(config: OperatorConfig) -> Result<()> {
    init_tracing(config.log_format);

    info!(
        namespace = %config.watch_namespace,
        cluster_timeout = ?config.cluster_timeout(),
        health_check_period = ?config.health_check_period(),
        "Starting ToolchainCluster controller"
    );

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;

    let cluster_client: Arc<dyn ToolchainClusterClient> =
        Arc::new(KubeToolchainClusterClient::new(client.clone()));
    let service = ToolchainClusterService::new(
        cluster_client.clone(),
        config.watch_namespace.clone(),
        config.cluster_timeout(),
    );
    let ctx = Context::new(cluster_client, service, config.health_check_period());

    // Both tasks should run forever; whichever exits first takes the process down
    tokio::select! {
        result = run_toolchaincluster_controller(client, config.watch_namespace.clone(), ctx) => {
            error!("CRITICAL: ToolchainCluster controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("ToolchainCluster controller exited unexpectedly without error")
        }
        result = run_metrics_server(config.metrics_bind_address) => {
            error!("CRITICAL: metrics server exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("metrics server exited unexpectedly without error")
        }
    }
}

/// Initialize logging.
///
/// Respects `RUST_LOG` if set, otherwise defaults to INFO level.
fn init_tracing(log_format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match log_format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

/// Run the `ToolchainCluster` controller
async fn run_toolchaincluster_controller(
    client: Client,
    namespace: String,
    ctx: Context,
) -> Result<()> {
    info!(namespace = %namespace, "Starting ToolchainCluster controller");

    let api = Api::<ToolchainCluster>::namespaced(client, &namespace);
    let service = ctx.service.clone();

    Controller::new(api, Config::default())
        .run(reconcile_toolchaincluster_wrapper, error_policy, Arc::new(ctx))
        .for_each(|result| {
            let service = service.clone();
            async move {
                match result {
                    Ok((obj_ref, action)) => {
                        debug!(cluster = %obj_ref.name, ?action, "Reconciled ToolchainCluster");
                    }
                    // Deleted between being queued and reconciled
                    Err(controller::Error::ObjectNotFound(obj_ref)) => {
                        info!(cluster = %obj_ref.name, "ToolchainCluster deleted, removing it from cache");
                        service.delete_toolchain_cluster(&obj_ref.name).await;
                    }
                    Err(e) => {
                        warn!("ToolchainCluster controller error: {e}");
                    }
                }
            }
        })
        .await;

    Ok(())
}

/// Reconcile wrapper for `ToolchainCluster`
async fn reconcile_toolchaincluster_wrapper(
    cluster: Arc<ToolchainCluster>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let start = Instant::now();
    let name = cluster.name_any();
    let namespace = cluster
        .namespace()
        .unwrap_or_else(|| ctx.service.namespace().to_string());

    debug!(
        cluster_name = %name,
        namespace = %namespace,
        "Reconcile wrapper called for ToolchainCluster"
    );

    match reconcile_toolchaincluster(&ctx, &namespace, &name).await {
        Ok(action) => {
            debug!("Successfully reconciled ToolchainCluster: {name}");
            metrics::record_reconciliation_success(KIND_TOOLCHAIN_CLUSTER, start.elapsed());
            Ok(action)
        }
        Err(e) => {
            error!("Failed to reconcile ToolchainCluster {name}: {e:#}");
            metrics::record_reconciliation_error(KIND_TOOLCHAIN_CLUSTER, start.elapsed());
            let error_type = e
                .downcast_ref::<ClusterError>()
                .map_or("reconcile", ClusterError::metric_label);
            metrics::record_error(KIND_TOOLCHAIN_CLUSTER, error_type);
            Err(e.into())
        }
    }
}

/// Error policy for controller
fn error_policy(
    _resource: Arc<ToolchainCluster>,
    _err: &ReconcileError,
    _ctx: Arc<Context>,
) -> Action {
    Action::requeue(Duration::from_secs(ERROR_REQUEUE_DURATION_SECS))
}

/// Serve Prometheus metrics over HTTP
async fn run_metrics_server(addr: SocketAddr) -> Result<()> {
    let app = Router::new().route(METRICS_SERVER_PATH, get(metrics_handler));

    info!(%addr, path = METRICS_SERVER_PATH, "Starting metrics server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn metrics_handler() -> impl IntoResponse {
    match metrics::gather_metrics() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to gather metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
