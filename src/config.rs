// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Command-line and environment configuration of the operator binary.

use std::net::SocketAddr;
use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};

use crate::constants::{
    DEFAULT_CLUSTER_TIMEOUT, DEFAULT_HEALTH_CHECK_PERIOD, METRICS_SERVER_BIND_ADDRESS,
    METRICS_SERVER_PORT,
};
use crate::duration::parse_duration;

/// Log output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Settings of the `ToolchainCluster` controller.
#[derive(Clone, Debug, Parser)]
#[command(name = "toolchain-cluster-operator", version, about)]
pub struct OperatorConfig {
    /// Namespace holding the `ToolchainCluster` resources
    #[arg(long, env = "WATCH_NAMESPACE")]
    pub watch_namespace: String,

    /// Timeout applied to every request against a remote cluster
    #[arg(
        long,
        env = "TOOLCHAIN_CLUSTER_TIMEOUT",
        default_value = DEFAULT_CLUSTER_TIMEOUT,
        value_parser = parse_duration_arg,
    )]
    cluster_timeout: Duration,

    /// Period between two health checks of the same cluster
    #[arg(
        long,
        env = "TOOLCHAIN_CLUSTER_HEALTH_CHECK_PERIOD",
        default_value = DEFAULT_HEALTH_CHECK_PERIOD,
        value_parser = parse_duration_arg,
    )]
    health_check_period: Duration,

    /// Probe remote clusters and write their status
    #[arg(
        long,
        env = "TOOLCHAIN_CLUSTER_HEALTH_CHECK",
        default_value_t = true,
        action = ArgAction::Set,
    )]
    pub health_check: bool,

    /// Address the metrics server listens on
    #[arg(
        long,
        env = "METRICS_BIND_ADDRESS",
        default_value_t = SocketAddr::from((METRICS_SERVER_BIND_ADDRESS, METRICS_SERVER_PORT)),
    )]
    pub metrics_bind_address: SocketAddr,

    /// Log output format
    #[arg(long, env = "RUST_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text, ignore_case = true)]
    pub log_format: LogFormat,
}

fn parse_duration_arg(value: &str) -> Result<Duration, String> {
    parse_duration(value).map_err(|e| e.to_string())
}

impl OperatorConfig {
    #[must_use]
    pub fn cluster_timeout(&self) -> Duration {
        self.cluster_timeout
    }

    /// Health-check period, or `None` when health checking is disabled.
    #[must_use]
    pub fn health_check_period(&self) -> Option<Duration> {
        self.health_check.then_some(self.health_check_period)
    }
}
