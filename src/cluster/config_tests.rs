// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for cluster configuration loading.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::cluster::client::MockToolchainClusterClient;
    use crate::cluster::config::*;
    use crate::crd::{TLSValidation, ToolchainCluster};
    use crate::errors::ClusterError;
    use crate::test_support::*;

    const TIMEOUT: Duration = Duration::from_secs(3);

    fn client_with_secret(data: &'static [(&'static str, &'static str)]) -> MockToolchainClusterClient {
        let mut client = MockToolchainClusterClient::new();
        client
            .expect_get_secret()
            .withf(|namespace, name| namespace == TEST_NAMESPACE && name == "member-1-secret")
            .returning(move |_, name| Ok(Some(create_test_secret(name, data))));
        client
    }

    async fn load(client: &MockToolchainClusterClient, cluster: &ToolchainCluster) -> Result<ClusterConfig, ClusterError> {
        new_cluster_config(client, cluster, TIMEOUT).await
    }

    // ============================================================================
    // Legacy Token Mode
    // ============================================================================

    #[tokio::test]
    async fn test_token_mode_builds_throttled_config() {
        let client = client_with_secret(&[("token", "abc123")]);
        let cluster = create_test_toolchain_cluster("member-1");

        let config = load(&client, &cluster).await.unwrap();

        assert_eq!(config.name, "member-1");
        assert_eq!(config.api_endpoint, TEST_API_ENDPOINT);
        assert_eq!(config.operator_namespace, TEST_OPERATOR_NAMESPACE);
        assert_eq!(config.owner_cluster_name, "host");
        assert_eq!(config.labels.get("type").map(String::as_str), Some("member"));
        assert_eq!(config.cluster_type(), Some(ClusterType::Member));
        assert_eq!(
            config.rest_config,
            RestConfig {
                host: TEST_API_ENDPOINT.to_string(),
                bearer_token: Some("abc123".to_string()),
                insecure: false,
                throttle: Some(Throttle { qps: 20, burst: 30 }),
                timeout: TIMEOUT,
                kubeconfig: None,
            }
        );
    }

    #[tokio::test]
    async fn test_token_mode_insecure_only_for_exactly_all() {
        let cases = [
            (vec![TLSValidation::All], true),
            (vec![TLSValidation::All, TLSValidation::SubjectName], false),
            (vec![TLSValidation::SubjectName], false),
            (vec![TLSValidation::ValidityPeriod], false),
            (vec![], false),
        ];

        for (validations, expected) in cases {
            let client = client_with_secret(&[("token", "abc123")]);
            let mut cluster = create_test_toolchain_cluster("member-1");
            cluster.spec.disabled_tls_validations = validations.clone();

            let config = load(&client, &cluster).await.unwrap();
            assert_eq!(
                config.rest_config.insecure, expected,
                "unexpected insecure flag for {validations:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_token_mode_requires_api_endpoint() {
        let client = client_with_secret(&[("token", "abc123")]);
        let mut cluster = create_test_toolchain_cluster("member-1");
        cluster.spec.api_endpoint = String::new();

        let err = load(&client, &cluster).await.unwrap_err();
        assert!(matches!(err, ClusterError::MissingApiEndpoint { ref cluster } if cluster == "member-1"));
    }

    #[tokio::test]
    async fn test_empty_token_is_missing_credentials() {
        let client = client_with_secret(&[("token", "")]);
        let cluster = create_test_toolchain_cluster("member-1");

        let err = load(&client, &cluster).await.unwrap_err();
        assert!(matches!(err, ClusterError::MissingCredentials { .. }));
    }

    #[tokio::test]
    async fn test_secret_without_credentials_names_requirement() {
        let client = client_with_secret(&[("ca.crt", "---")]);
        let cluster = create_test_toolchain_cluster("member-1");

        let err = load(&client, &cluster).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("kubeconfig"), "{message}");
        assert!(message.contains("token"), "{message}");
    }

    // ============================================================================
    // Secret Resolution
    // ============================================================================

    #[tokio::test]
    async fn test_empty_secret_ref_fails_without_lookup() {
        let mut client = MockToolchainClusterClient::new();
        client.expect_get_secret().never();
        let mut cluster = create_test_toolchain_cluster("member-1");
        cluster.spec.secret_ref.name = String::new();

        let err = load(&client, &cluster).await.unwrap_err();
        assert!(matches!(err, ClusterError::MissingSecretRef { .. }));
    }

    #[tokio::test]
    async fn test_missing_secret() {
        let mut client = MockToolchainClusterClient::new();
        client.expect_get_secret().returning(|_, _| Ok(None));
        let cluster = create_test_toolchain_cluster("member-1");

        let err = load(&client, &cluster).await.unwrap_err();
        assert!(matches!(
            err,
            ClusterError::SecretNotFound { ref secret, .. } if secret == "member-1-secret"
        ));
    }

    #[tokio::test]
    async fn test_secret_lookup_failure_is_wrapped() {
        let mut client = MockToolchainClusterClient::new();
        client
            .expect_get_secret()
            .returning(|_, _| Err(ClusterError::Kube(create_test_kube_error())));
        let cluster = create_test_toolchain_cluster("member-1");

        let err = load(&client, &cluster).await.unwrap_err();
        assert!(matches!(err, ClusterError::SecretUnavailable { .. }));
    }

    // ============================================================================
    // Kubeconfig Mode
    // ============================================================================

    #[tokio::test]
    async fn test_kubeconfig_mode() {
        let client = client_with_secret(&[("kubeconfig", TEST_KUBECONFIG)]);
        let mut cluster = create_test_toolchain_cluster("member-1");
        cluster.spec.api_endpoint = String::new();

        let config = load(&client, &cluster).await.unwrap();

        assert_eq!(config.operator_namespace, TEST_OPERATOR_NAMESPACE);
        assert!(config.api_endpoint.contains("api.member-1.example.com:6443"));
        assert_eq!(config.owner_cluster_name, "host");
        let rest = &config.rest_config;
        assert!(rest.insecure);
        assert_eq!(rest.bearer_token, None);
        assert_eq!(rest.throttle, None);
        assert_eq!(rest.timeout, TIMEOUT);
        assert_eq!(rest.kubeconfig.as_deref(), Some(TEST_KUBECONFIG));
    }

    #[tokio::test]
    async fn test_kubeconfig_takes_precedence_over_token() {
        let client = client_with_secret(&[("kubeconfig", TEST_KUBECONFIG), ("token", "abc123")]);
        let cluster = create_test_toolchain_cluster("member-1");

        let config = load(&client, &cluster).await.unwrap();
        assert!(config.rest_config.kubeconfig.is_some());
        assert_eq!(config.rest_config.bearer_token, None);
    }

    #[tokio::test]
    async fn test_kubeconfig_without_context_namespace() {
        let client = client_with_secret(&[("kubeconfig", TEST_KUBECONFIG_WITHOUT_NAMESPACE)]);
        let cluster = create_test_toolchain_cluster("member-1");

        let err = load(&client, &cluster).await.unwrap_err();
        assert!(matches!(err, ClusterError::UndeterminedNamespace { .. }));
    }

    #[tokio::test]
    async fn test_empty_kubeconfig_has_no_namespace() {
        let client = client_with_secret(&[("kubeconfig", "")]);
        let cluster = create_test_toolchain_cluster("member-1");

        let err = load(&client, &cluster).await.unwrap_err();
        assert!(matches!(err, ClusterError::UndeterminedNamespace { .. }));
    }

    #[tokio::test]
    async fn test_unparsable_kubeconfig() {
        let client = client_with_secret(&[("kubeconfig", "clusters: [not: valid")]);
        let cluster = create_test_toolchain_cluster("member-1");

        let err = load(&client, &cluster).await.unwrap_err();
        assert!(matches!(err, ClusterError::InvalidKubeconfig { .. }));
    }

    // ============================================================================
    // Listing
    // ============================================================================

    #[tokio::test]
    async fn test_list_configs_fails_fast() {
        let mut client = MockToolchainClusterClient::new();
        client.expect_list_toolchain_clusters().returning(|_| {
            Ok(vec![
                create_test_toolchain_cluster("member-1"),
                create_test_toolchain_cluster("member-2"),
            ])
        });
        client.expect_get_secret().returning(|_, name| {
            if name == "member-1-secret" {
                Ok(Some(create_test_secret(name, &[("token", "abc123")])))
            } else {
                Ok(None)
            }
        });

        let result = list_toolchain_cluster_configs(&client, TEST_NAMESPACE, TIMEOUT).await;
        assert!(matches!(
            result,
            Err(ClusterError::SecretNotFound { ref cluster, .. }) if cluster == "member-2"
        ));
    }

    #[tokio::test]
    async fn test_list_configs() {
        let mut client = MockToolchainClusterClient::new();
        client
            .expect_list_toolchain_clusters()
            .withf(|namespace| namespace == TEST_NAMESPACE)
            .returning(|_| {
                Ok(vec![
                    create_test_toolchain_cluster("member-1"),
                    create_test_toolchain_cluster("member-2"),
                ])
            });
        client
            .expect_get_secret()
            .returning(|_, name| Ok(Some(create_test_secret(name, &[("token", "abc123")]))));

        let configs = list_toolchain_cluster_configs(&client, TEST_NAMESPACE, TIMEOUT)
            .await
            .unwrap();
        let names: Vec<_> = configs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["member-1", "member-2"]);
    }

    // ============================================================================
    // RestConfig
    // ============================================================================

    fn token_rest_config() -> RestConfig {
        RestConfig {
            host: "https://api.member-1.example.com:6443".to_string(),
            bearer_token: Some("abc123".to_string()),
            insecure: true,
            throttle: Some(Throttle { qps: 20, burst: 30 }),
            timeout: TIMEOUT,
            kubeconfig: None,
        }
    }

    #[test]
    fn test_rest_config_debug_redacts_credentials() {
        let mut rest = token_rest_config();
        rest.kubeconfig = Some(TEST_KUBECONFIG.to_string());

        let debug = format!("{rest:?}");
        assert!(!debug.contains("abc123"));
        assert!(!debug.contains("kubeconfig-token"));
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains("api.member-1.example.com"));
    }

    #[test]
    fn test_rest_config_equality_tracks_token() {
        let a = token_rest_config();
        let mut b = token_rest_config();
        assert_eq!(a, b);

        b.bearer_token = Some("rotated".to_string());
        assert_ne!(a, b);
    }

    #[test]
    fn test_throttle_period() {
        let throttle = Throttle { qps: 20, burst: 30 };
        assert_eq!(throttle.period(), Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_token_rest_config_to_kube_config() {
        let config = token_rest_config().to_kube_config("member-1").await.unwrap();

        assert_eq!(config.cluster_url.host(), Some("api.member-1.example.com"));
        assert!(config.accept_invalid_certs);
        assert_eq!(config.read_timeout, Some(TIMEOUT));
        assert_eq!(config.connect_timeout, Some(TIMEOUT));
        assert_eq!(config.write_timeout, Some(TIMEOUT));
    }

    #[tokio::test]
    async fn test_kubeconfig_rest_config_to_kube_config() {
        let rest = RestConfig {
            host: TEST_API_ENDPOINT.to_string(),
            bearer_token: None,
            insecure: true,
            throttle: None,
            timeout: Duration::from_secs(7),
            kubeconfig: Some(TEST_KUBECONFIG.to_string()),
        };

        let config = rest.to_kube_config("member-1").await.unwrap();
        assert_eq!(config.default_namespace, TEST_OPERATOR_NAMESPACE);
        assert_eq!(config.read_timeout, Some(Duration::from_secs(7)));
    }

    #[test]
    fn test_cluster_type_from_label() {
        assert_eq!(ClusterType::from_label("host"), Some(ClusterType::Host));
        assert_eq!(ClusterType::from_label("member"), Some(ClusterType::Member));
        assert_eq!(ClusterType::from_label("other"), None);
        assert_eq!(ClusterType::Member.as_str(), "member");
    }

    // ============================================================================
    // Remote Client
    // ============================================================================

    #[tokio::test]
    async fn test_remote_client_sends_bearer_token() {
        use wiremock::matchers::{header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/healthz"))
            .and(header("authorization", "Bearer abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let rest = RestConfig {
            host: server.uri(),
            ..token_rest_config()
        };
        let client = new_remote_client("member-1", &rest).await.unwrap();

        let request = http::Request::get("/healthz").body(Vec::new()).unwrap();
        let body = client.request_text(request).await.unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_default_factory_rejects_invalid_kubeconfig() {
        let rest = RestConfig {
            kubeconfig: Some("not: [valid".to_string()),
            ..token_rest_config()
        };

        let err = DefaultClientFactory
            .new_client("member-1", &rest)
            .await
            .err()
            .unwrap();
        assert!(matches!(
            err,
            ClusterError::InvalidKubeconfig { ref cluster, .. } if cluster == "member-1"
        ));
    }
}
