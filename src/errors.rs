// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the multi-cluster client cache and health checking.
//!
//! Every variant names the `ToolchainCluster` it concerns so that a failure
//! surfaced by the controller can be traced back to one registration.

use thiserror::Error;

/// Errors raised while turning a `ToolchainCluster` into a cached client,
/// or while writing its health status.
#[derive(Error, Debug)]
pub enum ClusterError {
    /// Kubernetes API error from the local cluster
    #[error(transparent)]
    Kube(#[from] kube::Error),

    /// The `ToolchainCluster` has no `spec.secretRef.name`
    #[error("ToolchainCluster '{cluster}' does not reference a secret (spec.secretRef.name is empty)")]
    MissingSecretRef {
        /// Name of the `ToolchainCluster`
        cluster: String,
    },

    /// The referenced secret does not exist
    #[error("secret '{namespace}/{secret}' referenced by ToolchainCluster '{cluster}' was not found")]
    SecretNotFound {
        /// Name of the `ToolchainCluster`
        cluster: String,
        /// Namespace of the secret
        namespace: String,
        /// Name of the secret
        secret: String,
    },

    /// The referenced secret could not be read
    #[error("unable to get secret '{namespace}/{secret}' for ToolchainCluster '{cluster}': {source}")]
    SecretUnavailable {
        /// Name of the `ToolchainCluster`
        cluster: String,
        /// Namespace of the secret
        namespace: String,
        /// Name of the secret
        secret: String,
        /// Underlying API error
        #[source]
        source: kube::Error,
    },

    /// The secret has neither a `kubeconfig` nor a non-empty `token`
    #[error("secret '{secret}' for ToolchainCluster '{cluster}' contains neither a 'kubeconfig' nor a non-empty 'token'")]
    MissingCredentials {
        /// Name of the `ToolchainCluster`
        cluster: String,
        /// Name of the secret
        secret: String,
    },

    /// Legacy token mode requires `spec.apiEndpoint`
    #[error("ToolchainCluster '{cluster}' has an empty spec.apiEndpoint")]
    MissingApiEndpoint {
        /// Name of the `ToolchainCluster`
        cluster: String,
    },

    /// The `kubeconfig` in the secret could not be parsed or loaded
    #[error("invalid kubeconfig for ToolchainCluster '{cluster}': {reason}")]
    InvalidKubeconfig {
        /// Name of the `ToolchainCluster`
        cluster: String,
        /// Parser or loader message
        reason: String,
    },

    /// The kubeconfig's current context does not carry a namespace
    #[error("unable to determine the operator namespace from the kubeconfig of ToolchainCluster '{cluster}'")]
    UndeterminedNamespace {
        /// Name of the `ToolchainCluster`
        cluster: String,
    },

    /// The derived configuration has no operator namespace
    #[error("the operator namespace of ToolchainCluster '{cluster}' is empty")]
    MissingOperatorNamespace {
        /// Name of the `ToolchainCluster`
        cluster: String,
    },

    /// Building the remote client failed
    #[error("unable to create a client for ToolchainCluster '{cluster}': {reason}")]
    ClientConstruction {
        /// Name of the `ToolchainCluster`
        cluster: String,
        /// Builder message
        reason: String,
    },

    /// Writing the status subresource failed
    #[error("failed to update the status of ToolchainCluster '{cluster}': {source}")]
    StatusUpdateFailed {
        /// Name of the `ToolchainCluster`
        cluster: String,
        /// Underlying error
        #[source]
        source: Box<ClusterError>,
    },

    /// No cache entry exists for the cluster
    #[error("cluster '{cluster}' not found in the cache")]
    ClusterNotCached {
        /// Name of the `ToolchainCluster`
        cluster: String,
    },
}

impl ClusterError {
    /// Short, stable label for the error, used as a metrics label value.
    #[must_use]
    pub fn metric_label(&self) -> &'static str {
        match self {
            Self::Kube(_) => "kube",
            Self::MissingSecretRef { .. } => "missing_secret_ref",
            Self::SecretNotFound { .. } => "secret_not_found",
            Self::SecretUnavailable { .. } => "secret_unavailable",
            Self::MissingCredentials { .. } => "missing_credentials",
            Self::MissingApiEndpoint { .. } => "missing_api_endpoint",
            Self::InvalidKubeconfig { .. } => "invalid_kubeconfig",
            Self::UndeterminedNamespace { .. } => "undetermined_namespace",
            Self::MissingOperatorNamespace { .. } => "missing_operator_namespace",
            Self::ClientConstruction { .. } => "client_construction",
            Self::StatusUpdateFailed { .. } => "status_update_failed",
            Self::ClusterNotCached { .. } => "cluster_not_cached",
        }
    }
}
