// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Builders shared by the unit tests.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use kube::Client;

use crate::crd::{Condition, LocalSecretReference, ToolchainCluster, ToolchainClusterSpec};
use crate::labels::{LABEL_NAMESPACE, LABEL_OWNER_CLUSTER_NAME, LABEL_TYPE};

pub const TEST_NAMESPACE: &str = "toolchain-host-operator";
pub const TEST_OPERATOR_NAMESPACE: &str = "toolchain-member-operator";
pub const TEST_API_ENDPOINT: &str = "https://api.member-1.example.com:6443";

pub const TEST_KUBECONFIG: &str = r"apiVersion: v1
kind: Config
clusters:
- name: member
  cluster:
    server: https://api.member-1.example.com:6443
    insecure-skip-tls-verify: true
users:
- name: sa
  user:
    token: kubeconfig-token
contexts:
- name: member
  context:
    cluster: member
    user: sa
    namespace: toolchain-member-operator
current-context: member
";

pub const TEST_KUBECONFIG_WITHOUT_NAMESPACE: &str = r"apiVersion: v1
kind: Config
clusters:
- name: member
  cluster:
    server: https://api.member-1.example.com:6443
users:
- name: sa
  user:
    token: kubeconfig-token
contexts:
- name: member
  context:
    cluster: member
    user: sa
current-context: member
";

/// Member `ToolchainCluster` in legacy token mode, referencing `<name>-secret`.
pub fn create_test_toolchain_cluster(name: &str) -> ToolchainCluster {
    let mut labels = BTreeMap::new();
    labels.insert(LABEL_TYPE.to_string(), "member".to_string());
    labels.insert(LABEL_NAMESPACE.to_string(), TEST_OPERATOR_NAMESPACE.to_string());
    labels.insert(LABEL_OWNER_CLUSTER_NAME.to_string(), "host".to_string());

    ToolchainCluster {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(TEST_NAMESPACE.to_string()),
            labels: Some(labels),
            ..Default::default()
        },
        spec: ToolchainClusterSpec {
            api_endpoint: TEST_API_ENDPOINT.to_string(),
            secret_ref: LocalSecretReference {
                name: format!("{name}-secret"),
            },
            disabled_tls_validations: vec![],
        },
        status: None,
    }
}

pub fn create_test_secret(name: &str, data: &[(&str, &str)]) -> Secret {
    let data = data
        .iter()
        .map(|(key, value)| ((*key).to_string(), ByteString(value.as_bytes().to_vec())))
        .collect::<BTreeMap<_, _>>();

    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(TEST_NAMESPACE.to_string()),
            ..Default::default()
        },
        data: Some(data),
        ..Default::default()
    }
}

pub fn create_test_condition(
    r#type: &str,
    status: &str,
    last_transition_time: &str,
) -> Condition {
    Condition {
        r#type: r#type.to_string(),
        status: status.to_string(),
        reason: None,
        message: None,
        last_transition_time: Some(last_transition_time.to_string()),
        last_updated_time: Some(last_transition_time.to_string()),
    }
}

/// Kube client pointed at `url`. Must be called from within a Tokio runtime.
pub fn create_test_kube_client(url: &str) -> Client {
    let config = kube::Config::new(url.parse().expect("valid test url"));
    Client::try_from(config).expect("test client")
}

/// A `kube::Error` that does not come from an API response.
pub fn create_test_kube_error() -> kube::Error {
    let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    kube::Error::SerdeError(source)
}
