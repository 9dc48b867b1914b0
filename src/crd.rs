// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definitions (CRDs) for multi-cluster registration.
//!
//! # Resource Types
//!
//! - [`ToolchainCluster`] - Registers a remote Kubernetes cluster (host or member)
//!   together with the secret holding the credentials used to reach it.
//!
//! # Example: Registering a Member Cluster
//!
//! ```rust,no_run
//! use toolchain_common::crd::{LocalSecretReference, ToolchainClusterSpec};
//!
//! let spec = ToolchainClusterSpec {
//!     api_endpoint: "https://api.member-1.example.com:6443".to_string(),
//!     secret_ref: LocalSecretReference {
//!         name: "member-1-secret".to_string(),
//!     },
//!     disabled_tls_validations: vec![],
//! };
//! ```

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Condition represents an observation of a resource's current state.
///
/// `ToolchainCluster` conditions are written by the health checker; the
/// condition types in use are `Ready` and `Offline`.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition (`Ready` or `Offline`).
    pub r#type: String,

    /// Status of the condition: True, False, or Unknown.
    pub status: String,

    /// Brief CamelCase reason for the condition's last transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message indicating details about the transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Last time the condition transitioned from one status to another (RFC3339 format).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,

    /// Last time the condition was probed, whether or not it changed (RFC3339 format).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated_time: Option<String>,
}

/// A reference to a `Secret` in the same namespace as the referencing object.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq, JsonSchema)]
pub struct LocalSecretReference {
    /// Name of the secret.
    pub name: String,
}

/// TLS validations that can be disabled when talking to a remote cluster.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub enum TLSValidation {
    /// Disable every TLS validation.
    #[serde(rename = "*")]
    All,
    /// Disable validation of the certificate subject name.
    SubjectName,
    /// Disable validation of the certificate validity period.
    ValidityPeriod,
}

/// `ToolchainCluster` registers a remote cluster with the operator.
///
/// # Example
///
/// ```yaml
/// apiVersion: toolchain.dev.openshift.com/v1alpha1
/// kind: ToolchainCluster
/// metadata:
///   name: member-1
///   namespace: toolchain-host-operator
///   labels:
///     type: member
///     namespace: toolchain-member-operator
///     ownerClusterName: host
/// spec:
///   apiEndpoint: https://api.member-1.example.com:6443
///   secretRef:
///     name: member-1-secret
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[kube(
    group = "toolchain.dev.openshift.com",
    version = "v1alpha1",
    kind = "ToolchainCluster",
    namespaced,
    doc = "ToolchainCluster registers a remote Kubernetes cluster and the secret holding the credentials used to reach it."
)]
#[kube(status = "ToolchainClusterStatus")]
#[kube(printcolumn = r#"{"name":"Endpoint","type":"string","jsonPath":".spec.apiEndpoint"}"#)]
#[kube(
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ToolchainClusterSpec {
    /// Kubernetes API server endpoint of the remote cluster.
    ///
    /// Only consulted when the secret carries a legacy `token`; a `kubeconfig`
    /// in the secret supplies its own server URL.
    #[serde(default)]
    pub api_endpoint: String,

    /// Secret holding either a `kubeconfig` or a `token` for the remote cluster.
    #[serde(default)]
    pub secret_ref: LocalSecretReference,

    /// TLS validations to skip when using a legacy `token`.
    ///
    /// Only the exact list `["*"]` disables verification.
    #[serde(
        default,
        rename = "disabledTLSValidations",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub disabled_tls_validations: Vec<TLSValidation>,
}

/// `ToolchainCluster` status
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq, JsonSchema)]
pub struct ToolchainClusterStatus {
    /// Latest health observations for the cluster.
    #[serde(default)]
    pub conditions: Vec<Condition>,
}
