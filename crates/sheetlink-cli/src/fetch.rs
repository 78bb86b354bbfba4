//! Table retrieval
//!
//! Local tables are read from disk, remote ones downloaded as CSV exports.
//! All tables are fetched concurrently; a table that cannot be retrieved is
//! reported and skipped.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::future::join_all;
use tracing::{debug, info};

use sheetlink_core::{Config, RawTable, RunWarning, TableConfig, TableSource};

/// Fetch timeout in seconds
const FETCH_TIMEOUT: u64 = 30;

/// Tables that could be retrieved, plus a warning for each that could not
#[derive(Debug, Default)]
pub struct Fetched {
    pub tables: Vec<RawTable>,
    pub warnings: Vec<RunWarning>,
}

/// Fetch every configured table, preserving configuration order
pub async fn fetch_tables(config: &Config) -> Result<Fetched> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT))
        .user_agent("sheetlink/0.3")
        .build()
        .context("Failed to build HTTP client")?;

    let base_dir = config.base_dir.as_deref();
    let results = join_all(
        config
            .tables
            .iter()
            .map(|table| fetch_table(&client, table, base_dir)),
    )
    .await;

    let mut fetched = Fetched::default();
    for (table, result) in config.tables.iter().zip(results) {
        match result {
            Ok(csv) => {
                debug!("Fetched table '{}' ({} bytes)", table.name, csv.len());
                fetched.tables.push(RawTable {
                    name: table.name.clone(),
                    kind: table.table_kind(),
                    csv,
                });
            }
            Err(e) => fetched.warnings.push(RunWarning::UnavailableTable {
                table: table.name.clone(),
                reason: format!("{:#}", e),
            }),
        }
    }

    info!(
        "Fetched {} of {} tables",
        fetched.tables.len(),
        config.tables.len()
    );
    Ok(fetched)
}

async fn fetch_table(
    client: &reqwest::Client,
    table: &TableConfig,
    base_dir: Option<&Path>,
) -> Result<String> {
    match table.source(base_dir)? {
        TableSource::Path(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {:?}", path)),
        TableSource::Url(url) => {
            let response = client
                .get(&url)
                .send()
                .await
                .with_context(|| format!("Failed to request {}", url))?
                .error_for_status()?;
            Ok(response.text().await?)
        }
    }
}
