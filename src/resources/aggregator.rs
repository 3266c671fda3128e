//! Insights results aggregator tables

use super::{column, endpoint, null_as_default, row, TableDef};
use crate::error::Result;
use crate::http::AuthenticatedClient;
use crate::types::{ColumnType, JsonValue, Row, DEFAULT_TIMEOUT, SLOW_ENDPOINT_TIMEOUT};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub(super) static CLUSTERS_V2: TableDef = TableDef {
    name: "crc_openshift_insights_aggregator_v2_clusters",
    description: "Retrieves all clusters for given organization, retrieves the impacting rules \
                  for each cluster and calculates the count of impacting rules by total risk \
                  (severity == critical, high, moderate, low).",
    key_column: None,
    columns: &[
        column("cluster_id", ColumnType::String, "Cluster ID."),
        column("cluster_name", ColumnType::String, "Cluster name."),
        column("cluster_version", ColumnType::String, "Cluster version."),
        column("managed", ColumnType::Bool, "Whether the cluster is managed."),
        column(
            "last_checked_at",
            ColumnType::Timestamp,
            "The time the cluster was last checked at.",
        ),
        column("total_hit_count", ColumnType::Int, "The total hit count."),
        column(
            "hits_by_total_risk",
            ColumnType::Json,
            "The total hits by risk.",
        ),
    ],
    // the cluster list is computed on request and can take close to a minute
    timeout: SLOW_ENDPOINT_TIMEOUT,
};

pub(super) static CLUSTER_REPORTS_V2: TableDef = TableDef {
    name: "crc_openshift_insights_aggregator_v2_cluster_reports",
    description: "Returns the latest report for the given cluster.",
    key_column: Some("cluster_id"),
    columns: &[
        column("cluster_id", ColumnType::String, "Cluster ID."),
        column("rule_id", ColumnType::String, "Unique identifier for the rule."),
        column(
            "created_at",
            ColumnType::Timestamp,
            "The time when the report was created.",
        ),
        column("description", ColumnType::String, "Description of the report."),
        column("details", ColumnType::String, "Details about the report."),
        column("reason", ColumnType::String, "Reason for the report."),
        column(
            "resolution",
            ColumnType::String,
            "Resolution of the issue described in the report.",
        ),
        column(
            "more_info",
            ColumnType::String,
            "Additional information related to the report.",
        ),
        column(
            "total_risk",
            ColumnType::Int,
            "Total risk score associated with the report.",
        ),
        column("disabled", ColumnType::Bool, "Indicates if the report is disabled."),
        column(
            "disable_feedback",
            ColumnType::String,
            "Feedback on why the report was disabled.",
        ),
        column(
            "disabled_at",
            ColumnType::String,
            "Timestamp when the report was disabled.",
        ),
        column("internal", ColumnType::Bool, "Indicates if the report is internal."),
        column("user_vote", ColumnType::Int, "User vote on the report."),
        column("extra_data", ColumnType::Json, "Extra data."),
        column("tags", ColumnType::Json, "Tags associated with the report."),
        column(
            "impacted",
            ColumnType::Timestamp,
            "Time when the issue impacted the cluster.",
        ),
    ],
    timeout: DEFAULT_TIMEOUT,
};

#[derive(Debug, Deserialize)]
struct ClustersResponseV2 {
    #[serde(default, deserialize_with = "null_as_default")]
    data: Vec<ClusterV2>,
}

#[derive(Debug, Deserialize)]
struct ClusterV2 {
    cluster_id: String,
    cluster_name: Option<String>,
    cluster_version: Option<String>,
    managed: Option<bool>,
    last_checked_at: Option<DateTime<Utc>>,
    total_hit_count: Option<i64>,
    hits_by_total_risk: Option<HitsByTotalRisk>,
}

/// Rule hits keyed by total risk, `"1"` (low) through `"4"` (critical)
#[derive(Debug, Default, Deserialize, Serialize)]
struct HitsByTotalRisk {
    #[serde(rename(deserialize = "1", serialize = "low"), default)]
    low: i64,
    #[serde(rename(deserialize = "2", serialize = "moderate"), default)]
    moderate: i64,
    #[serde(rename(deserialize = "3", serialize = "high"), default)]
    high: i64,
    #[serde(rename(deserialize = "4", serialize = "critical"), default)]
    critical: i64,
}

#[derive(Debug, Deserialize)]
struct ClusterReportsResponseV2 {
    #[serde(default, deserialize_with = "null_as_default")]
    report: ClusterReport,
}

#[derive(Debug, Default, Deserialize)]
struct ClusterReport {
    #[serde(default, deserialize_with = "null_as_default")]
    data: Vec<RuleHit>,
}

#[derive(Debug, Deserialize)]
struct RuleHit {
    rule_id: String,
    created_at: Option<DateTime<Utc>>,
    description: Option<String>,
    details: Option<String>,
    reason: Option<String>,
    resolution: Option<String>,
    more_info: Option<String>,
    total_risk: Option<i64>,
    disabled: Option<bool>,
    disable_feedback: Option<String>,
    disabled_at: Option<String>,
    internal: Option<bool>,
    user_vote: Option<i64>,
    #[serde(default)]
    extra_data: JsonValue,
    tags: Option<Vec<String>>,
    impacted: Option<DateTime<Utc>>,
}

pub(super) async fn list_clusters_v2(client: &AuthenticatedClient) -> Result<Vec<Row>> {
    let response: ClustersResponseV2 = client
        .get_json("api/insights-results-aggregator/v2/clusters")
        .await?;

    Ok(response
        .data
        .into_iter()
        .map(|cluster| {
            row(json!({
                "cluster_id": cluster.cluster_id,
                "cluster_name": cluster.cluster_name,
                "cluster_version": cluster.cluster_version,
                "managed": cluster.managed,
                "last_checked_at": cluster.last_checked_at,
                "total_hit_count": cluster.total_hit_count,
                "hits_by_total_risk": cluster.hits_by_total_risk,
            }))
        })
        .collect())
}

pub(super) async fn list_cluster_reports_v2(
    client: &AuthenticatedClient,
    cluster_id: &str,
) -> Result<Vec<Row>> {
    let url = endpoint(
        client,
        "api/insights-results-aggregator/v2/cluster",
        &[cluster_id, "reports"],
    )?;
    let response: ClusterReportsResponseV2 = client.get_json(&url).await?;

    Ok(response
        .report
        .data
        .into_iter()
        .map(|hit| {
            row(json!({
                "cluster_id": cluster_id,
                "rule_id": hit.rule_id,
                "created_at": hit.created_at,
                "description": hit.description,
                "details": hit.details,
                "reason": hit.reason,
                "resolution": hit.resolution,
                "more_info": hit.more_info,
                "total_risk": hit.total_risk,
                "disabled": hit.disabled,
                "disable_feedback": hit.disable_feedback,
                "disabled_at": hit.disabled_at,
                "internal": hit.internal,
                "user_vote": hit.user_vote,
                "extra_data": hit.extra_data,
                "tags": hit.tags,
                "impacted": hit.impacted,
            }))
        })
        .collect())
}
