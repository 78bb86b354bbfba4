//! Catalog command handler

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use sheetlink_core::{Config, Pipeline, RunReport};

use crate::fetch::fetch_tables;
use crate::output::Output;

/// Print every reference the configured tables define
///
/// Nothing is written; malformed or unavailable tables are logged and left out.
pub async fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    let fetched = fetch_tables(&config).await?;
    if fetched.tables.is_empty() {
        bail!("No table could be retrieved");
    }

    let mut report = RunReport::new();
    for warning in fetched.warnings {
        report.warn(warning);
    }

    let pipeline = Pipeline::new(config.pipeline_options());
    let tables = pipeline.parse_tables(fetched.tables, &mut report);
    let catalog = pipeline.build_catalog(&tables);

    output.print_catalog(&catalog);
    Ok(())
}
