//! Gathering conditions service tables

use super::{column, endpoint, null_as_default, row, TableDef};
use crate::error::Result;
use crate::http::AuthenticatedClient;
use crate::types::{ColumnType, JsonValue, Row, DEFAULT_TIMEOUT};
use serde::Deserialize;
use serde_json::json;

pub(super) static RULES_V1: TableDef = TableDef {
    name: "crc_openshift_insights_gcs_v1_gathering_rules",
    description: "Return a list of versioned gathering rules.",
    key_column: None,
    columns: &[
        column("version", ColumnType::String, "Gathering rules version."),
        column(
            "conditions",
            ColumnType::Json,
            "The conditions that trigger the gathering functions.",
        ),
        column(
            "gathering_functions",
            ColumnType::Json,
            "The gathering mechanisms.",
        ),
    ],
    timeout: DEFAULT_TIMEOUT,
};

pub(super) static RULES_V2: TableDef = TableDef {
    name: "crc_openshift_insights_gcs_v2_gathering_rules",
    description: "Return the remote configuration for a given OCP version.",
    key_column: Some("ocp_version"),
    columns: &[
        column("ocp_version", ColumnType::String, "OCP version."),
        column(
            "version",
            ColumnType::String,
            "Remote configuration version.",
        ),
        column(
            "conditional_gathering_rules",
            ColumnType::Json,
            "Conditional gathering rules.",
        ),
        column(
            "container_logs",
            ColumnType::Json,
            "Container log requests.",
        ),
    ],
    timeout: DEFAULT_TIMEOUT,
};

#[derive(Debug, Deserialize)]
struct GatheringRulesV1 {
    version: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    rules: Vec<GatheringRuleV1>,
}

#[derive(Debug, Deserialize)]
struct GatheringRuleV1 {
    #[serde(default)]
    conditions: JsonValue,
    #[serde(default)]
    gathering_functions: JsonValue,
}

#[derive(Debug, Deserialize)]
struct GatheringRulesV2 {
    version: Option<String>,
    #[serde(default)]
    conditional_gathering_rules: JsonValue,
    #[serde(default)]
    container_logs: JsonValue,
}

/// One row per rule, each tagged with the document version
pub(super) async fn list_rules_v1(client: &AuthenticatedClient) -> Result<Vec<Row>> {
    let rules: GatheringRulesV1 = client.get_json("api/gathering/v1/gathering_rules").await?;

    Ok(rules
        .rules
        .into_iter()
        .map(|rule| {
            row(json!({
                "version": rules.version,
                "conditions": rule.conditions,
                "gathering_functions": rule.gathering_functions,
            }))
        })
        .collect())
}

/// A single row describing the configuration served for `ocp_version`
pub(super) async fn get_rules_v2(
    client: &AuthenticatedClient,
    ocp_version: &str,
) -> Result<Vec<Row>> {
    let url = endpoint(client, "api/gathering/v2", &[ocp_version, "gathering_rules"])?;
    let rules: GatheringRulesV2 = client.get_json(&url).await?;

    Ok(vec![row(json!({
        "ocp_version": ocp_version,
        "version": rules.version,
        "conditional_gathering_rules": rules.conditional_gathering_rules,
        "container_logs": rules.container_logs,
    }))])
}
