//! Resource tables
//!
//! Each table maps one console API endpoint onto rows. Listing a table
//! always follows the same steps: pull the key column out of the equality
//! qualifiers, GET the endpoint through an [`AuthenticatedClient`], decode
//! the typed response, and flatten it into rows holding exactly the
//! table's declared columns.

mod aggregator;
mod gathering;
mod vulnerabilities;

use crate::error::{Error, Result};
use crate::http::AuthenticatedClient;
use crate::types::{ColumnType, JsonValue, Quals, Row};
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use tracing::{debug, error};

// ============================================================================
// Table Definitions
// ============================================================================

/// A column exposed by a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnDef {
    /// Column name
    pub name: &'static str,
    /// Column type
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Human-readable description
    pub description: &'static str,
}

/// Static description of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableDef {
    /// Table name
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Column that must be given as an equality qualifier, if any
    pub key_column: Option<&'static str>,
    /// Declared columns, in display order
    pub columns: &'static [ColumnDef],
    /// Timeout for the table's API call
    #[serde(skip)]
    pub timeout: Duration,
}

impl TableDef {
    /// Names of the declared columns
    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.name)
    }

    /// Look up the key column's value in `quals`
    fn key_value<'q>(&self, quals: &'q Quals) -> Result<&'q str> {
        let Some(column) = self.key_column else {
            return Err(Error::config(format!("table '{}' has no key column", self.name)));
        };
        quals
            .get(column)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::missing_qualifier(self.name, column))
    }
}

const fn column(name: &'static str, column_type: ColumnType, description: &'static str) -> ColumnDef {
    ColumnDef {
        name,
        column_type,
        description,
    }
}

// ============================================================================
// Tables
// ============================================================================

/// Every table the connector exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// Gathering rules, v1
    GatheringRulesV1,
    /// Remote configuration for one OCP version, v2
    GatheringRulesV2,
    /// Clusters with rule hit counts
    AggregatorClustersV2,
    /// Latest report for one cluster
    AggregatorClusterReportsV2,
    /// Clusters with CVE counts
    VulnerabilityClustersV1,
    /// CVEs affecting one cluster
    VulnerabilityClusterCvesV1,
    /// Exposed images in one cluster
    VulnerabilityClusterExposedImagesV1,
    /// CVEs affecting the workload
    VulnerabilityCvesV1,
    /// Clusters exposed to one CVE
    VulnerabilityCveExposedClustersV1,
    /// Images exposed to one CVE
    VulnerabilityCveExposedImagesV1,
}

impl Table {
    /// All tables, in registration order
    pub const ALL: [Table; 10] = [
        Table::GatheringRulesV1,
        Table::GatheringRulesV2,
        Table::AggregatorClustersV2,
        Table::AggregatorClusterReportsV2,
        Table::VulnerabilityClustersV1,
        Table::VulnerabilityClusterCvesV1,
        Table::VulnerabilityClusterExposedImagesV1,
        Table::VulnerabilityCvesV1,
        Table::VulnerabilityCveExposedClustersV1,
        Table::VulnerabilityCveExposedImagesV1,
    ];

    /// Static definition of this table
    pub fn definition(self) -> &'static TableDef {
        match self {
            Table::GatheringRulesV1 => &gathering::RULES_V1,
            Table::GatheringRulesV2 => &gathering::RULES_V2,
            Table::AggregatorClustersV2 => &aggregator::CLUSTERS_V2,
            Table::AggregatorClusterReportsV2 => &aggregator::CLUSTER_REPORTS_V2,
            Table::VulnerabilityClustersV1 => &vulnerabilities::CLUSTERS_V1,
            Table::VulnerabilityClusterCvesV1 => &vulnerabilities::CLUSTER_CVES_V1,
            Table::VulnerabilityClusterExposedImagesV1 => {
                &vulnerabilities::CLUSTER_EXPOSED_IMAGES_V1
            }
            Table::VulnerabilityCvesV1 => &vulnerabilities::CVES_V1,
            Table::VulnerabilityCveExposedClustersV1 => &vulnerabilities::CVE_EXPOSED_CLUSTERS_V1,
            Table::VulnerabilityCveExposedImagesV1 => &vulnerabilities::CVE_EXPOSED_IMAGES_V1,
        }
    }

    /// Table name
    pub fn name(self) -> &'static str {
        self.definition().name
    }

    /// Find a table by name
    pub fn from_name(name: &str) -> Result<Table> {
        Table::ALL
            .into_iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| Error::TableNotFound {
                table: name.to_string(),
            })
    }

    /// Fetch the table's rows
    ///
    /// Tables with a key column fail with [`Error::MissingQualifier`] before
    /// any request is made when the qualifier is absent.
    pub async fn list(self, client: &AuthenticatedClient, quals: &Quals) -> Result<Vec<Row>> {
        let def = self.definition();
        let result = self.fetch(client, quals).await;

        match &result {
            Ok(rows) => debug!(table = def.name, rows = rows.len(), "Listed table"),
            Err(err) => error!(
                table = def.name,
                function = "list",
                error_type = err.kind(),
                error = %err,
                "Failed to list table"
            ),
        }
        result
    }

    async fn fetch(self, client: &AuthenticatedClient, quals: &Quals) -> Result<Vec<Row>> {
        let def = self.definition();
        match self {
            Table::GatheringRulesV1 => gathering::list_rules_v1(client).await,
            Table::GatheringRulesV2 => gathering::get_rules_v2(client, def.key_value(quals)?).await,
            Table::AggregatorClustersV2 => aggregator::list_clusters_v2(client).await,
            Table::AggregatorClusterReportsV2 => {
                aggregator::list_cluster_reports_v2(client, def.key_value(quals)?).await
            }
            Table::VulnerabilityClustersV1 => vulnerabilities::list_clusters_v1(client).await,
            Table::VulnerabilityClusterCvesV1 => {
                vulnerabilities::list_cluster_cves_v1(client, def.key_value(quals)?).await
            }
            Table::VulnerabilityClusterExposedImagesV1 => {
                vulnerabilities::list_cluster_exposed_images_v1(client, def.key_value(quals)?)
                    .await
            }
            Table::VulnerabilityCvesV1 => vulnerabilities::list_cves_v1(client).await,
            Table::VulnerabilityCveExposedClustersV1 => {
                vulnerabilities::list_cve_exposed_clusters_v1(client, def.key_value(quals)?).await
            }
            Table::VulnerabilityCveExposedImagesV1 => {
                vulnerabilities::list_cve_exposed_images_v1(client, def.key_value(quals)?).await
            }
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Table {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Table::from_name(s)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Build an endpoint URL from fixed path segments and caller-supplied values
///
/// Every segment is percent-encoded, so a qualifier value can never escape
/// its path position.
fn endpoint(client: &AuthenticatedClient, base: &str, segments: &[&str]) -> Result<String> {
    let mut url = client.build_url(base)?;
    url.path_segments_mut()
        .map_err(|()| Error::config(format!("base URL cannot carry a path: {}", client.base_url())))?
        .extend(segments);
    Ok(url.into())
}

/// Deserialize `null` as the type's default, as a missing field would be
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Turn a `json!` object literal into a row
fn row(value: JsonValue) -> Row {
    match value {
        JsonValue::Object(map) => map,
        _ => Row::new(),
    }
}

#[cfg(test)]
mod tests;
