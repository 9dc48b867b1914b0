// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use k8s_openapi::api::core::v1::{Namespace, Secret};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use k8s_openapi::ByteString;
use kube::api::{Api, DeleteParams, ObjectMeta, PostParams};
use kube::client::Client;
use std::collections::BTreeMap;
use toolchain_common::crd::{LocalSecretReference, ToolchainCluster, ToolchainClusterSpec};
use toolchain_common::labels::{
    CLUSTER_TYPE_MEMBER, LABEL_NAMESPACE, LABEL_OWNER_CLUSTER_NAME, LABEL_TYPE,
};

/// Get a Kubernetes client or skip the test if not in a cluster
pub async fn get_kube_client_or_skip() -> Option<Client> {
    match Client::try_default().await {
        Ok(client) => Some(client),
        Err(e) => {
            eprintln!("Skipping integration test: not running in Kubernetes cluster: {e}");
            None
        }
    }
}

/// Whether the `ToolchainCluster` CRD is installed
pub async fn toolchaincluster_crd_installed(client: &Client) -> bool {
    let crds: Api<CustomResourceDefinition> = Api::all(client.clone());
    crds.get_opt("toolchainclusters.toolchain.dev.openshift.com")
        .await
        .ok()
        .flatten()
        .is_some()
}

/// URL of the API server the tests run against
pub async fn current_cluster_url() -> Result<String, Box<dyn std::error::Error>> {
    let config = kube::Config::infer().await?;
    Ok(config.cluster_url.to_string())
}

/// Create a test namespace
pub async fn create_test_namespace(
    client: &Client,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    let mut labels = BTreeMap::new();
    labels.insert("test".to_string(), "integration".to_string());
    labels.insert("managed-by".to_string(), "toolchain-common-test".to_string());

    let ns = Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: Some(labels),
            ..Default::default()
        },
        ..Default::default()
    };

    match namespaces.create(&PostParams::default(), &ns).await {
        Ok(_) => {
            println!("Created test namespace: {name}");
            Ok(())
        }
        Err(kube::Error::Api(ae)) if ae.code == 409 => {
            println!("Test namespace already exists: {name}");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

/// Cleanup test namespace
pub async fn cleanup_test_namespace(
    client: &Client,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    match namespaces.delete(name, &DeleteParams::default()).await {
        Ok(_) => {
            println!("Deleted test namespace: {name}");
            Ok(())
        }
        Err(kube::Error::Api(ae)) if ae.code == 404 => {
            println!("Test namespace already deleted: {name}");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

/// Create a secret holding a legacy `token`
pub async fn create_token_secret(
    client: &Client,
    namespace: &str,
    name: &str,
    token: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let secrets: Api<Secret> = Api::namespaced(client.clone(), namespace);

    let mut data = BTreeMap::new();
    data.insert("token".to_string(), ByteString(token.as_bytes().to_vec()));

    let secret = Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        data: Some(data),
        ..Default::default()
    };

    secrets.create(&PostParams::default(), &secret).await?;
    println!("Created Secret: {namespace}/{name}");
    Ok(())
}

/// Create a member `ToolchainCluster` pointing at `api_endpoint` with TLS checks disabled
pub async fn create_member_toolchain_cluster(
    client: &Client,
    namespace: &str,
    name: &str,
    api_endpoint: &str,
    secret_name: &str,
) -> Result<ToolchainCluster, Box<dyn std::error::Error>> {
    let clusters: Api<ToolchainCluster> = Api::namespaced(client.clone(), namespace);

    let mut labels = BTreeMap::new();
    labels.insert(LABEL_TYPE.to_string(), CLUSTER_TYPE_MEMBER.to_string());
    labels.insert(LABEL_NAMESPACE.to_string(), "toolchain-member-operator".to_string());
    labels.insert(LABEL_OWNER_CLUSTER_NAME.to_string(), "host".to_string());

    let cluster = ToolchainCluster {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(labels),
            ..Default::default()
        },
        spec: ToolchainClusterSpec {
            api_endpoint: api_endpoint.to_string(),
            secret_ref: LocalSecretReference {
                name: secret_name.to_string(),
            },
            disabled_tls_validations: vec![toolchain_common::crd::TLSValidation::All],
        },
        status: None,
    };

    let created = clusters.create(&PostParams::default(), &cluster).await?;
    println!("Created ToolchainCluster: {namespace}/{name}");
    Ok(created)
}
