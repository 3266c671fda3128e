//! OCP vulnerability service tables

use super::{column, endpoint, null_as_default, row, TableDef};
use crate::error::Result;
use crate::http::AuthenticatedClient;
use crate::types::{ColumnType, Row, DEFAULT_TIMEOUT};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

pub(super) static CLUSTERS_V1: TableDef = TableDef {
    name: "crc_openshift_insights_vulnerabilities_v1_clusters",
    description: "Retrieves all clusters for given organization, retrieves the impacting rules \
                  for each cluster and the count of impacting CVEs.",
    key_column: None,
    columns: &[
        column("cluster_id", ColumnType::String, "Cluster ID."),
        column("display_name", ColumnType::String, "Cluster display name."),
        column("version", ColumnType::String, "Cluster version."),
        column("provider", ColumnType::String, "Provider of the cluster."),
        column(
            "last_seen",
            ColumnType::Timestamp,
            "The time the cluster was last checked at.",
        ),
        column("status", ColumnType::String, "Status of the cluster."),
        column("low_cves", ColumnType::Int, "The total low CVEs."),
        column("moderate_cves", ColumnType::Int, "The total moderate CVEs."),
        column("important_cves", ColumnType::Int, "The total important CVEs."),
        column("critical_cves", ColumnType::Int, "The total critical CVEs."),
    ],
    timeout: DEFAULT_TIMEOUT,
};

pub(super) static CLUSTER_CVES_V1: TableDef = TableDef {
    name: "crc_openshift_insights_vulnerabilities_v1_cluster_cves",
    description: "Retrieves CVEs affecting a specific Cluster ID.",
    key_column: Some("cluster_id"),
    columns: &[
        column("cluster_id", ColumnType::String, "The Cluster ID."),
        column("cvss2_score", ColumnType::Double, "CVSS2 score of the CVE."),
        column("cvss3_score", ColumnType::Double, "CVSS3 score of the CVE."),
        column("description", ColumnType::String, "Description of the CVE."),
        column("exploits", ColumnType::Bool, "Whether the CVE has known exploits."),
        column(
            "publish_date",
            ColumnType::Timestamp,
            "The date the CVE was published.",
        ),
        column("severity", ColumnType::String, "Severity level of the CVE."),
        column("synopsis", ColumnType::String, "Brief summary of the CVE."),
    ],
    timeout: DEFAULT_TIMEOUT,
};

pub(super) static CLUSTER_EXPOSED_IMAGES_V1: TableDef = TableDef {
    name: "crc_openshift_insights_vulnerabilities_v1_cluster_exposed_images",
    description: "Retrieves exposed images for a specific Cluster ID.",
    key_column: Some("cluster_id"),
    columns: &[
        column("cluster_id", ColumnType::String, "The Cluster ID."),
        column("name", ColumnType::String, "Name of the exposed image."),
        column("registry", ColumnType::String, "Registry of the exposed image."),
        column("version", ColumnType::String, "Version of the exposed image."),
    ],
    timeout: DEFAULT_TIMEOUT,
};

pub(super) static CVES_V1: TableDef = TableDef {
    name: "crc_openshift_insights_vulnerabilities_v1_cves",
    description: "Retrieves CVEs affecting the current workload.",
    key_column: None,
    columns: &[
        column("synopsis", ColumnType::String, "Brief summary of the CVE."),
        column(
            "clusters_exposed",
            ColumnType::Int,
            "Number of clusters exposed to this CVE.",
        ),
        column("cvss2_score", ColumnType::Double, "CVSS2 score of the CVE."),
        column("cvss3_score", ColumnType::Double, "CVSS3 score of the CVE."),
        column("description", ColumnType::String, "Description of the CVE."),
        column("exploits", ColumnType::Bool, "Whether the CVE has known exploits."),
        column(
            "images_exposed",
            ColumnType::Int,
            "Number of images exposed to this CVE.",
        ),
        column(
            "publish_date",
            ColumnType::Timestamp,
            "The date the CVE was published.",
        ),
        column("severity", ColumnType::String, "Severity level of the CVE."),
    ],
    timeout: DEFAULT_TIMEOUT,
};

pub(super) static CVE_EXPOSED_CLUSTERS_V1: TableDef = TableDef {
    name: "crc_openshift_insights_vulnerabilities_v1_cves_exposed_clusters",
    description: "Retrieves exposed clusters for a specific CVE.",
    key_column: Some("cve_name"),
    columns: &[
        column("cve_name", ColumnType::String, "The CVE name."),
        column(
            "display_name",
            ColumnType::String,
            "Display name of the exposed cluster.",
        ),
        column("id", ColumnType::String, "ID of the exposed cluster."),
        column(
            "last_seen",
            ColumnType::Timestamp,
            "Last seen timestamp of the exposed cluster.",
        ),
        column("provider", ColumnType::String, "Provider of the exposed cluster."),
        column("status", ColumnType::String, "Status of the exposed cluster."),
        column("type", ColumnType::String, "Type of the exposed cluster."),
        column("version", ColumnType::String, "Version of the exposed cluster."),
    ],
    timeout: DEFAULT_TIMEOUT,
};

pub(super) static CVE_EXPOSED_IMAGES_V1: TableDef = TableDef {
    name: "crc_openshift_insights_vulnerabilities_v1_cves_exposed_images",
    description: "Retrieves exposed images for a specific CVE.",
    key_column: Some("cve_name"),
    columns: &[
        column("cve_name", ColumnType::String, "The CVE name."),
        column(
            "clusters_exposed",
            ColumnType::Int,
            "Number of clusters exposed to this image.",
        ),
        column("name", ColumnType::String, "Name of the exposed image."),
        column("registry", ColumnType::String, "Registry of the exposed image."),
        column("version", ColumnType::String, "Version of the exposed image."),
    ],
    timeout: DEFAULT_TIMEOUT,
};

/// Every vulnerability endpoint wraps its items in `{"data": [...], "meta": {...}}`
#[derive(Debug, Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
struct DataResponse<T> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_default")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct Cluster {
    id: Option<String>,
    display_name: Option<String>,
    version: Option<String>,
    provider: Option<String>,
    last_seen: Option<String>,
    status: Option<String>,
    #[serde(rename = "type")]
    cluster_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    cves_severity: CvesSeverity,
}

#[derive(Debug, Default, Deserialize)]
struct CvesSeverity {
    low: Option<i64>,
    moderate: Option<i64>,
    important: Option<i64>,
    critical: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Cve {
    synopsis: Option<String>,
    cvss2_score: Option<f64>,
    cvss3_score: Option<f64>,
    description: Option<String>,
    exploits: Option<bool>,
    publish_date: Option<String>,
    severity: Option<String>,
    clusters_exposed: Option<i64>,
    images_exposed: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Image {
    name: Option<String>,
    registry: Option<String>,
    version: Option<String>,
    clusters_exposed: Option<i64>,
}

async fn fetch<T: DeserializeOwned>(client: &AuthenticatedClient, url: &str) -> Result<Vec<T>> {
    let response: DataResponse<T> = client.get_json(url).await?;
    Ok(response.data)
}

pub(super) async fn list_clusters_v1(client: &AuthenticatedClient) -> Result<Vec<Row>> {
    let clusters: Vec<Cluster> = fetch(client, "api/ocp-vulnerability/v1/clusters").await?;

    Ok(clusters
        .into_iter()
        .map(|c| {
            row(json!({
                "cluster_id": c.id,
                "display_name": c.display_name,
                "version": c.version,
                "provider": c.provider,
                "last_seen": c.last_seen,
                "status": c.status,
                "low_cves": c.cves_severity.low,
                "moderate_cves": c.cves_severity.moderate,
                "important_cves": c.cves_severity.important,
                "critical_cves": c.cves_severity.critical,
            }))
        })
        .collect())
}

pub(super) async fn list_cluster_cves_v1(
    client: &AuthenticatedClient,
    cluster_id: &str,
) -> Result<Vec<Row>> {
    let url = endpoint(client, "api/ocp-vulnerability/v1/clusters", &[cluster_id, "cves"])?;
    let cves: Vec<Cve> = fetch(client, &url).await?;

    Ok(cves
        .into_iter()
        .map(|cve| {
            row(json!({
                "cluster_id": cluster_id,
                "cvss2_score": cve.cvss2_score,
                "cvss3_score": cve.cvss3_score,
                "description": cve.description,
                "exploits": cve.exploits,
                "publish_date": cve.publish_date,
                "severity": cve.severity,
                "synopsis": cve.synopsis,
            }))
        })
        .collect())
}

pub(super) async fn list_cluster_exposed_images_v1(
    client: &AuthenticatedClient,
    cluster_id: &str,
) -> Result<Vec<Row>> {
    let url = endpoint(
        client,
        "api/ocp-vulnerability/v1/clusters",
        &[cluster_id, "exposed_images"],
    )?;
    let images: Vec<Image> = fetch(client, &url).await?;

    Ok(images
        .into_iter()
        .map(|image| {
            row(json!({
                "cluster_id": cluster_id,
                "name": image.name,
                "registry": image.registry,
                "version": image.version,
            }))
        })
        .collect())
}

pub(super) async fn list_cves_v1(client: &AuthenticatedClient) -> Result<Vec<Row>> {
    let cves: Vec<Cve> = fetch(client, "api/ocp-vulnerability/v1/cves").await?;

    Ok(cves
        .into_iter()
        .map(|cve| {
            row(json!({
                "synopsis": cve.synopsis,
                "clusters_exposed": cve.clusters_exposed,
                "cvss2_score": cve.cvss2_score,
                "cvss3_score": cve.cvss3_score,
                "description": cve.description,
                "exploits": cve.exploits,
                "images_exposed": cve.images_exposed,
                "publish_date": cve.publish_date,
                "severity": cve.severity,
            }))
        })
        .collect())
}

pub(super) async fn list_cve_exposed_clusters_v1(
    client: &AuthenticatedClient,
    cve_name: &str,
) -> Result<Vec<Row>> {
    let url = endpoint(
        client,
        "api/ocp-vulnerability/v1/cves",
        &[cve_name, "exposed_clusters"],
    )?;
    let clusters: Vec<Cluster> = fetch(client, &url).await?;

    Ok(clusters
        .into_iter()
        .map(|c| {
            row(json!({
                "cve_name": cve_name,
                "display_name": c.display_name,
                "id": c.id,
                "last_seen": c.last_seen,
                "provider": c.provider,
                "status": c.status,
                "type": c.cluster_type,
                "version": c.version,
            }))
        })
        .collect())
}

pub(super) async fn list_cve_exposed_images_v1(
    client: &AuthenticatedClient,
    cve_name: &str,
) -> Result<Vec<Row>> {
    let url = endpoint(
        client,
        "api/ocp-vulnerability/v1/cves",
        &[cve_name, "exposed_images"],
    )?;
    let images: Vec<Image> = fetch(client, &url).await?;

    Ok(images
        .into_iter()
        .map(|image| {
            row(json!({
                "cve_name": cve_name,
                "clusters_exposed": image.clusters_exposed,
                "name": image.name,
                "registry": image.registry,
                "version": image.version,
            }))
        })
        .collect())
}
