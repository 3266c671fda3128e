//! Tests for the resource tables

use super::*;
use crate::auth::TokenState;
use crate::config::ConnectionConfig;
use crate::http::{AuthenticatedClient, SsoTransport};
use chrono::{TimeDelta, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use test_case::test_case;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

/// Client with a valid token already installed, so no token endpoint is needed
async fn client_for(server: &MockServer) -> AuthenticatedClient {
    let config = ConnectionConfig::new(
        server.uri(),
        format!("{}/token", server.uri()),
        "client",
        "secret",
    );
    let transport = SsoTransport::new(config.credentials()).unwrap();
    transport
        .set_token(TokenState::new("test-token", Utc::now() + TimeDelta::hours(1)))
        .await;
    AuthenticatedClient::new(Arc::new(transport), server.uri(), TIMEOUT)
}

async fn mount_get(server: &MockServer, endpoint: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

fn quals(pairs: &[(&str, &str)]) -> Quals {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

fn assert_columns(table: Table, rows: &[Row]) {
    let declared: Vec<&str> = table.definition().column_names().collect();
    for row in rows {
        let mut keys: Vec<&str> = row.keys().map(String::as_str).collect();
        let mut expected = declared.clone();
        keys.sort_unstable();
        expected.sort_unstable();
        assert_eq!(keys, expected, "row keys for {table}");
    }
}

// ============================================================================
// Table registry
// ============================================================================

#[test]
fn test_table_names_are_unique_and_prefixed() {
    let names: HashSet<&str> = Table::ALL.iter().map(|t| t.name()).collect();
    assert_eq!(names.len(), Table::ALL.len());
    assert!(names.iter().all(|n| n.starts_with("crc_")));
}

#[test]
fn test_from_name_round_trips() {
    for table in Table::ALL {
        assert_eq!(Table::from_name(table.name()).unwrap(), table);
        assert_eq!(table.to_string().parse::<Table>().unwrap(), table);
    }
}

#[test]
fn test_from_name_unknown() {
    let err = Table::from_name("crc_nope").unwrap_err();
    assert!(matches!(err, Error::TableNotFound { ref table } if table == "crc_nope"));
}

#[test]
fn test_key_columns_are_declared() {
    for table in Table::ALL {
        let def = table.definition();
        if let Some(key) = def.key_column {
            assert!(
                def.column_names().any(|c| c == key),
                "{} does not declare its key column",
                def.name
            );
        }
    }
}

#[test]
fn test_slow_endpoint_timeout() {
    assert_eq!(
        Table::AggregatorClustersV2.definition().timeout,
        crate::types::SLOW_ENDPOINT_TIMEOUT
    );
    assert_eq!(
        Table::VulnerabilityCvesV1.definition().timeout,
        crate::types::DEFAULT_TIMEOUT
    );
}

#[test]
fn test_table_definition_serializes_column_types() {
    let value = serde_json::to_value(Table::GatheringRulesV2.definition()).unwrap();
    assert_eq!(value["key_column"], "ocp_version");
    assert_eq!(value["columns"][2]["type"], "json");
    assert!(value.get("timeout").is_none());
}

// ============================================================================
// Qualifiers
// ============================================================================

#[test_case(Table::GatheringRulesV2, "ocp_version")]
#[test_case(Table::AggregatorClusterReportsV2, "cluster_id")]
#[test_case(Table::VulnerabilityClusterCvesV1, "cluster_id")]
#[test_case(Table::VulnerabilityClusterExposedImagesV1, "cluster_id")]
#[test_case(Table::VulnerabilityCveExposedClustersV1, "cve_name")]
#[test_case(Table::VulnerabilityCveExposedImagesV1, "cve_name")]
#[tokio::test]
async fn test_missing_qualifier_makes_no_request(table: Table, column: &str) {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;

    for quals in [quals(&[]), quals(&[(column, "  ")])] {
        let err = table.list(&client, &quals).await.unwrap_err();
        match err {
            Error::MissingQualifier { table: t, column: c } => {
                assert_eq!(t, table.name());
                assert_eq!(c, column);
            }
            other => panic!("expected MissingQualifier, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_key_value_is_percent_encoded() {
    let mock_server = MockServer::start().await;
    mount_get(
        &mock_server,
        "/api/ocp-vulnerability/v1/cves/CVE%202024%2F1/exposed_images",
        json!({"data": []}),
    )
    .await;

    let client = client_for(&mock_server).await;
    let rows = Table::VulnerabilityCveExposedImagesV1
        .list(&client, &quals(&[("cve_name", "CVE 2024/1")]))
        .await
        .unwrap();

    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_non_success_status_is_http_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/ocp-vulnerability/v1/cves"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let err = Table::VulnerabilityCvesV1
        .list(&client, &Quals::new())
        .await
        .unwrap_err();

    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "unavailable");
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_undecodable_body_is_decode_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/gathering/v1/gathering_rules"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let err = Table::GatheringRulesV1
        .list(&client, &Quals::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Decode { .. }));
    assert_eq!(err.kind(), "decode_error");
}

// ============================================================================
// Gathering
// ============================================================================

#[tokio::test]
async fn test_gathering_rules_v1() {
    let mock_server = MockServer::start().await;
    mount_get(
        &mock_server,
        "/api/gathering/v1/gathering_rules",
        json!({
            "version": "1.0.1",
            "rules": [
                {
                    "conditions": [
                        {"alert": {"name": "APIRemovedInNextEUSReleaseInUse"}, "type": "alert_is_firing"}
                    ],
                    "gathering_functions": {
                        "api_request_counts_of_resource_from_alert": {
                            "alert_name": "APIRemovedInNextEUSReleaseInUse"
                        }
                    }
                },
                {
                    "conditions": [
                        {"alert": {"name": "KubePodCrashLooping"}, "type": "alert_is_firing"}
                    ],
                    "gathering_functions": {
                        "containers_logs": {
                            "alert_name": "KubePodCrashLooping",
                            "previous": true,
                            "tail_lines": 20
                        }
                    }
                }
            ]
        }),
    )
    .await;

    let client = client_for(&mock_server).await;
    let rows = Table::GatheringRulesV1
        .list(&client, &Quals::new())
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_columns(Table::GatheringRulesV1, &rows);
    assert!(rows.iter().all(|r| r["version"] == "1.0.1"));
    assert_eq!(
        rows[1]["gathering_functions"]["containers_logs"]["tail_lines"],
        20
    );
    assert_eq!(rows[0]["conditions"][0]["type"], "alert_is_firing");
}

#[tokio::test]
async fn test_gathering_rules_v1_null_rules() {
    let mock_server = MockServer::start().await;
    mount_get(
        &mock_server,
        "/api/gathering/v1/gathering_rules",
        json!({"version": "1.0.1", "rules": null}),
    )
    .await;

    let client = client_for(&mock_server).await;
    let rows = Table::GatheringRulesV1
        .list(&client, &Quals::new())
        .await
        .unwrap();

    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_gathering_rules_v2() {
    let mock_server = MockServer::start().await;
    mount_get(
        &mock_server,
        "/api/gathering/v2/4.14.0/gathering_rules",
        json!({
            "version": "1.1.0",
            "conditional_gathering_rules": [{"conditions": [], "gathering_functions": {}}],
            "container_logs": [{"namespace": "openshift-etcd", "messages": ["leader"]}]
        }),
    )
    .await;

    let client = client_for(&mock_server).await;
    let rows = Table::GatheringRulesV2
        .list(&client, &quals(&[("ocp_version", "4.14.0")]))
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_columns(Table::GatheringRulesV2, &rows);
    assert_eq!(rows[0]["ocp_version"], "4.14.0");
    assert_eq!(rows[0]["version"], "1.1.0");
    assert_eq!(rows[0]["container_logs"][0]["namespace"], "openshift-etcd");
}

// ============================================================================
// Aggregator
// ============================================================================

#[tokio::test]
async fn test_aggregator_clusters_v2() {
    let mock_server = MockServer::start().await;
    mount_get(
        &mock_server,
        "/api/insights-results-aggregator/v2/clusters",
        json!({
            "data": [
                {
                    "cluster_id": "c1",
                    "cluster_name": "prod",
                    "cluster_version": "4.14.3",
                    "managed": true,
                    "last_checked_at": "2024-05-01T10:00:00Z",
                    "total_hit_count": 5,
                    "hits_by_total_risk": {"1": 1, "2": 2, "3": 0, "4": 2}
                },
                {"cluster_id": "c2", "hits_by_total_risk": null}
            ],
            "meta": {"count": 2},
            "status": "ok"
        }),
    )
    .await;

    let client = client_for(&mock_server).await;
    let rows = Table::AggregatorClustersV2
        .list(&client, &Quals::new())
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_columns(Table::AggregatorClustersV2, &rows);
    assert_eq!(rows[0]["cluster_name"], "prod");
    assert_eq!(rows[0]["managed"], true);
    assert!(rows[0]["last_checked_at"].is_string());
    assert_eq!(
        rows[0]["hits_by_total_risk"],
        json!({"low": 1, "moderate": 2, "high": 0, "critical": 2})
    );
    assert!(rows[1]["cluster_name"].is_null());
    assert!(rows[1]["hits_by_total_risk"].is_null());
}

#[tokio::test]
async fn test_aggregator_cluster_reports_v2() {
    let mock_server = MockServer::start().await;
    mount_get(
        &mock_server,
        "/api/insights-results-aggregator/v2/cluster/c1/reports",
        json!({
            "report": {
                "meta": {"count": 1},
                "data": [{
                    "rule_id": "ccx_rules_ocp.external.rules.nodes_requirements_check|NODES_MINIMUM_REQUIREMENTS_NOT_MET",
                    "created_at": "2024-05-01T10:00:00Z",
                    "description": "Nodes are below minimum requirements",
                    "details": "",
                    "reason": "",
                    "resolution": "",
                    "total_risk": 2,
                    "disabled": false,
                    "disable_feedback": "",
                    "disabled_at": "",
                    "internal": false,
                    "user_vote": 0,
                    "extra_data": {"error_key": "NODES_MINIMUM_REQUIREMENTS_NOT_MET"},
                    "tags": ["openshift", "performance"],
                    "impacted": "2024-04-30T08:00:00Z"
                }]
            },
            "status": "ok"
        }),
    )
    .await;

    let client = client_for(&mock_server).await;
    let rows = Table::AggregatorClusterReportsV2
        .list(&client, &quals(&[("cluster_id", "c1")]))
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_columns(Table::AggregatorClusterReportsV2, &rows);
    assert_eq!(rows[0]["cluster_id"], "c1");
    assert_eq!(rows[0]["total_risk"], 2);
    assert_eq!(rows[0]["tags"], json!(["openshift", "performance"]));
    assert_eq!(
        rows[0]["extra_data"]["error_key"],
        "NODES_MINIMUM_REQUIREMENTS_NOT_MET"
    );
    assert!(rows[0]["more_info"].is_null());
}

// ============================================================================
// Vulnerabilities
// ============================================================================

#[tokio::test]
async fn test_vulnerability_clusters_v1() {
    let mock_server = MockServer::start().await;
    mount_get(
        &mock_server,
        "/api/ocp-vulnerability/v1/clusters",
        json!({
            "data": [{
                "id": "c1",
                "display_name": "prod",
                "version": "4.14.3",
                "provider": "AWS",
                "last_seen": "2024-05-01T10:00:00Z",
                "status": "Ready",
                "type": "OCP",
                "cves_severity": {"critical": 1, "important": 4, "low": 10, "moderate": 7}
            }],
            "meta": {"total_items": 1}
        }),
    )
    .await;

    let client = client_for(&mock_server).await;
    let rows = Table::VulnerabilityClustersV1
        .list(&client, &Quals::new())
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_columns(Table::VulnerabilityClustersV1, &rows);
    assert_eq!(rows[0]["cluster_id"], "c1");
    assert_eq!(rows[0]["low_cves"], 10);
    assert_eq!(rows[0]["moderate_cves"], 7);
    assert_eq!(rows[0]["important_cves"], 4);
    assert_eq!(rows[0]["critical_cves"], 1);
}

#[tokio::test]
async fn test_vulnerability_cluster_cves_v1() {
    let mock_server = MockServer::start().await;
    mount_get(
        &mock_server,
        "/api/ocp-vulnerability/v1/clusters/c1/cves",
        json!({
            "data": [{
                "synopsis": "CVE-2024-0001",
                "cvss2_score": 0.0,
                "cvss3_score": 7.5,
                "description": "Denial of service",
                "exploits": true,
                "publish_date": "2024-01-02T00:00:00Z",
                "severity": "Important"
            }]
        }),
    )
    .await;

    let client = client_for(&mock_server).await;
    let rows = Table::VulnerabilityClusterCvesV1
        .list(&client, &quals(&[("cluster_id", "c1")]))
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_columns(Table::VulnerabilityClusterCvesV1, &rows);
    assert_eq!(rows[0]["cluster_id"], "c1");
    assert_eq!(rows[0]["cvss3_score"], 7.5);
    assert_eq!(rows[0]["exploits"], true);
}

#[tokio::test]
async fn test_vulnerability_cluster_exposed_images_v1() {
    let mock_server = MockServer::start().await;
    mount_get(
        &mock_server,
        "/api/ocp-vulnerability/v1/clusters/c1/exposed_images",
        json!({
            "data": [
                {"name": "ubi8/openssl", "registry": "registry.access.redhat.com", "version": "1.1"},
                {"name": "ubi9/httpd", "registry": "registry.access.redhat.com", "version": "2.4"}
            ]
        }),
    )
    .await;

    let client = client_for(&mock_server).await;
    let rows = Table::VulnerabilityClusterExposedImagesV1
        .list(&client, &quals(&[("cluster_id", "c1")]))
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_columns(Table::VulnerabilityClusterExposedImagesV1, &rows);
    assert_eq!(rows[1]["name"], "ubi9/httpd");
    assert!(rows.iter().all(|r| r["cluster_id"] == "c1"));
}

#[tokio::test]
async fn test_vulnerability_cves_v1() {
    let mock_server = MockServer::start().await;
    mount_get(
        &mock_server,
        "/api/ocp-vulnerability/v1/cves",
        json!({
            "data": [{
                "synopsis": "CVE-2024-0001",
                "clusters_exposed": 3,
                "images_exposed": 9,
                "cvss3_score": 9.8,
                "exploits": false,
                "severity": "Critical"
            }]
        }),
    )
    .await;

    let client = client_for(&mock_server).await;
    let rows = Table::VulnerabilityCvesV1
        .list(&client, &Quals::new())
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_columns(Table::VulnerabilityCvesV1, &rows);
    assert_eq!(rows[0]["clusters_exposed"], 3);
    assert_eq!(rows[0]["images_exposed"], 9);
    assert!(rows[0]["cvss2_score"].is_null());
    assert!(rows[0]["description"].is_null());
}

#[tokio::test]
async fn test_vulnerability_cve_exposed_clusters_v1() {
    let mock_server = MockServer::start().await;
    mount_get(
        &mock_server,
        "/api/ocp-vulnerability/v1/cves/CVE-2024-0001/exposed_clusters",
        json!({
            "data": [{
                "id": "c1",
                "display_name": "prod",
                "last_seen": "2024-05-01T10:00:00Z",
                "provider": "AWS",
                "status": "Ready",
                "type": "OCP",
                "version": "4.14.3"
            }]
        }),
    )
    .await;

    let client = client_for(&mock_server).await;
    let rows = Table::VulnerabilityCveExposedClustersV1
        .list(&client, &quals(&[("cve_name", "CVE-2024-0001")]))
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_columns(Table::VulnerabilityCveExposedClustersV1, &rows);
    assert_eq!(rows[0]["cve_name"], "CVE-2024-0001");
    assert_eq!(rows[0]["type"], "OCP");
    assert_eq!(rows[0]["id"], "c1");
}

#[tokio::test]
async fn test_vulnerability_cve_exposed_images_v1() {
    let mock_server = MockServer::start().await;
    mount_get(
        &mock_server,
        "/api/ocp-vulnerability/v1/cves/CVE-2024-0001/exposed_images",
        json!({
            "data": [{
                "clusters_exposed": 2,
                "name": "ubi8/openssl",
                "registry": "registry.access.redhat.com",
                "version": "1.1"
            }]
        }),
    )
    .await;

    let client = client_for(&mock_server).await;
    let rows = Table::VulnerabilityCveExposedImagesV1
        .list(&client, &quals(&[("cve_name", "CVE-2024-0001")]))
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_columns(Table::VulnerabilityCveExposedImagesV1, &rows);
    assert_eq!(rows[0]["clusters_exposed"], 2);
    assert_eq!(rows[0]["cve_name"], "CVE-2024-0001");
}

#[tokio::test]
async fn test_vulnerability_null_data_is_empty() {
    let mock_server = MockServer::start().await;
    mount_get(
        &mock_server,
        "/api/ocp-vulnerability/v1/clusters",
        json!({"data": null, "meta": {}}),
    )
    .await;

    let client = client_for(&mock_server).await;
    let rows = Table::VulnerabilityClustersV1
        .list(&client, &Quals::new())
        .await
        .unwrap();

    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_vulnerability_null_severity_keeps_rows() {
    let mock_server = MockServer::start().await;
    mount_get(
        &mock_server,
        "/api/ocp-vulnerability/v1/clusters",
        json!({
            "data": [
                {"id": "c1", "display_name": "one", "cves_severity": null},
                {"id": "c2", "display_name": "two", "cves_severity": {"critical": 2}}
            ]
        }),
    )
    .await;

    let client = client_for(&mock_server).await;
    let rows = Table::VulnerabilityClustersV1
        .list(&client, &Quals::new())
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_columns(Table::VulnerabilityClustersV1, &rows);
    assert!(rows[0]["critical_cves"].is_null());
    assert!(rows[0]["low_cves"].is_null());
    assert_eq!(rows[1]["display_name"], "two");
    assert_eq!(rows[1]["critical_cves"], 2);
}

#[tokio::test]
async fn test_aggregator_null_report_is_empty() {
    let mock_server = MockServer::start().await;
    mount_get(
        &mock_server,
        "/api/insights-results-aggregator/v2/cluster/c1/reports",
        json!({"report": null, "status": "ok"}),
    )
    .await;

    let client = client_for(&mock_server).await;
    let rows = Table::AggregatorClusterReportsV2
        .list(&client, &quals(&[("cluster_id", "c1")]))
        .await
        .unwrap();

    assert!(rows.is_empty());
}
