//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{ConnectionConfig, ConnectionOverrides};
use crate::error::{Error, Result};
use crate::http::ClientRegistry;
use crate::resources::Table;
use crate::types::{JsonValue, Quals, Row, DEFAULT_TIMEOUT};
use futures::future::try_join_all;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
    registry: ClientRegistry,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self {
            cli,
            registry: ClientRegistry::new(),
        }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Tables => self.tables(),
            Commands::Describe { table } => self.describe(table),
            Commands::Check => self.check().await,
            Commands::Query { table, filters } => self.query(table, filters).await,
        }
    }

    /// Resolve the connection: flags over connection file over environment
    fn connection_config(&self) -> Result<ConnectionConfig> {
        let from_file = match &self.cli.connection {
            Some(path) => ConnectionOverrides::from_yaml_file(path)?,
            None => ConnectionOverrides::default(),
        };
        let from_flags = ConnectionOverrides {
            base_url: self.cli.base_url.clone(),
            token_url: self.cli.token_url.clone(),
            client_id: self.cli.client_id.clone(),
            client_secret: self.cli.client_secret.clone(),
        };

        Ok(ConnectionConfig::resolve(&from_file.merge(from_flags)))
    }

    /// List tables
    fn tables(&self) -> Result<()> {
        let tables: Vec<Value> = Table::ALL
            .iter()
            .map(|t| {
                let def = t.definition();
                json!({
                    "name": def.name,
                    "description": def.description,
                    "key_column": def.key_column,
                })
            })
            .collect();

        self.output_message(&json!({
            "type": "TABLES",
            "tables": tables
        }));
        Ok(())
    }

    /// Describe one table
    fn describe(&self, name: &str) -> Result<()> {
        let table = Table::from_name(name)?;
        self.output_message(&json!({
            "type": "TABLE",
            "table": table.definition()
        }));
        Ok(())
    }

    /// Force a token exchange for the resolved connection
    async fn check(&self) -> Result<()> {
        let config = self.connection_config()?;
        let client = self.registry.get_client(&config, DEFAULT_TIMEOUT)?;

        match client.transport().authenticate().await {
            Ok(()) => {
                self.output_message(&json!({
                    "type": "CONNECTION_STATUS",
                    "connectionStatus": {
                        "status": "SUCCEEDED",
                        "message": "Authentication successful"
                    }
                }));
                Ok(())
            }
            Err(e) => {
                self.output_message(&json!({
                    "type": "CONNECTION_STATUS",
                    "connectionStatus": {
                        "status": "FAILED",
                        "message": format!("Authentication failed: {e}")
                    }
                }));
                Err(e)
            }
        }
    }

    /// List rows, one request per key column value
    async fn query(&self, name: &str, filters: &[(String, String)]) -> Result<()> {
        let table = Table::from_name(name)?;
        let def = table.definition();
        let plan = QueryPlan::new(table, filters)?;

        let config = self.connection_config()?;
        let client = self.registry.get_client(&config, def.timeout)?;

        let start = Instant::now();
        let batches = try_join_all(plan.requests.iter().map(|quals| table.list(&client, quals))).await?;

        let mut count = 0usize;
        for row in batches.into_iter().flatten() {
            if plan.matches(&row) {
                self.output_message(&JsonValue::Object(row));
                count += 1;
            }
        }

        info!(
            table = def.name,
            rows = count,
            requests = plan.requests.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Query complete"
        );
        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

// ============================================================================
// Query planning
// ============================================================================

/// Requests to send and row filters to apply for one query
#[derive(Debug, Default, PartialEq)]
struct QueryPlan {
    /// Qualifiers for each request, in argument order
    requests: Vec<Quals>,
    /// Non-key equality filters applied to returned rows
    filters: Vec<(String, String)>,
}

impl QueryPlan {
    fn new(table: Table, filters: &[(String, String)]) -> Result<Self> {
        let def = table.definition();
        let mut plan = Self::default();
        let mut key_values = Vec::new();

        for (column, value) in filters {
            if !def.column_names().any(|c| c == column) {
                return Err(Error::config(format!(
                    "table '{}' has no column '{column}'",
                    def.name
                )));
            }
            if def.key_column == Some(column.as_str()) {
                key_values.push(value.clone());
            } else {
                plan.filters.push((column.clone(), value.clone()));
            }
        }

        match def.key_column {
            Some(key) if !key_values.is_empty() => {
                plan.requests = key_values
                    .into_iter()
                    .map(|v| Quals::from([(key.to_string(), v)]))
                    .collect();
            }
            // no key value given; let the table report the missing qualifier
            _ => plan.requests.push(Quals::new()),
        }

        Ok(plan)
    }

    fn matches(&self, row: &Row) -> bool {
        self.filters.iter().all(|(column, expected)| match row.get(column) {
            Some(Value::String(s)) => s == expected,
            Some(Value::Null) | None => false,
            Some(other) => other.to_string() == *expected,
        })
    }
}
