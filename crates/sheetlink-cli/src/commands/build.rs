//! Build command handler

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::info;

use sheetlink_core::{clean_output, Config, FsDocumentStore, Pipeline, RunReport};

use crate::fetch::fetch_tables;
use crate::output::Output;
use crate::BuildArgs;

/// Fetch, render and link every configured table
pub async fn build(config_path: Option<&PathBuf>, args: BuildArgs, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    let report = run(config, &args, output).await?;
    output.print_report(&report);
    Ok(())
}

pub(crate) async fn run(mut config: Config, args: &BuildArgs, output: &Output) -> Result<RunReport> {
    if let Some(dir) = &args.output {
        config.output_dir = dir.clone();
    }
    if let Some(workers) = args.workers.filter(|n| *n > 0) {
        config.workers = Some(workers);
    }
    if args.keep_existing {
        config.keep_existing = true;
    }

    if config.tables.is_empty() {
        bail!(
            "No tables configured. Add [[tables]] entries to {}",
            Config::config_file_path().display()
        );
    }

    if args.clean && config.output_dir.exists() {
        let removed = clean_output(&config.output_dir)?;
        output.message(&format!(
            "Removed {} entries from {}",
            removed.len(),
            config.output_dir.display()
        ));
    }

    let fetched = fetch_tables(&config).await?;
    if fetched.tables.is_empty() {
        bail!(
            "None of the {} configured tables could be retrieved",
            config.tables.len()
        );
    }

    let mut report = RunReport::new();
    for warning in fetched.warnings {
        report.tables_skipped += 1;
        report.warn(warning);
    }

    let pipeline = Pipeline::new(config.pipeline_options());
    let store = FsDocumentStore::new(&config.output_dir, &config.extension);
    let tables = pipeline.parse_tables(fetched.tables, &mut report);
    let catalog = pipeline.run_tables(&tables, &store, &mut report);

    let listing_path = config.listing_path();
    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create {:?}", config.output_dir))?;
    std::fs::write(&listing_path, catalog.render_listing())
        .with_context(|| format!("Failed to write {:?}", listing_path))?;
    info!("Wrote catalog listing to {:?}", listing_path);

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use sheetlink_core::TableConfig;
    use sheetlink_core::TableKindName;
    use tempfile::TempDir;

    fn table(name: &str, path: &str) -> TableConfig {
        TableConfig {
            name: name.to_string(),
            kind: TableKindName::Standard,
            narrative_fields: Vec::new(),
            path: Some(PathBuf::from(path)),
            url: None,
        }
    }

    fn fixture() -> (TempDir, Config) {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("rooms.csv"), "Name\nLibrary\n").unwrap();
        std::fs::write(
            temp_dir.path().join("books.csv"),
            "Title,Location\nAtlas,Library\n",
        )
        .unwrap();

        let mut config = Config::default();
        config.base_dir = Some(temp_dir.path().to_path_buf());
        config.output_dir = temp_dir.path().join("vault");
        config.workers = Some(2);
        config.tables = vec![table("Rooms", "rooms.csv"), table("Books", "books.csv")];
        (temp_dir, config)
    }

    #[tokio::test]
    async fn test_build_writes_documents_and_listing() {
        let (_temp_dir, config) = fixture();
        let vault = config.output_dir.clone();
        let output = Output::new(OutputFormat::Quiet);

        let report = run(config, &BuildArgs::default(), &output).await.unwrap();
        assert_eq!(report.documents_rendered, 2);
        assert_eq!(report.reverse_edges, 1);

        let library = std::fs::read_to_string(vault.join("Rooms/Library.md")).unwrap();
        assert!(library.ends_with("## Links\n- [[Books/Atlas]]\n"));
        let listing = std::fs::read_to_string(vault.join("link_references.txt")).unwrap();
        assert!(listing.contains("Rooms/Library\n"));
        assert!(listing.contains("Books/Atlas\n"));
    }

    #[tokio::test]
    async fn test_build_skips_unavailable_table() {
        let (_temp_dir, mut config) = fixture();
        config.tables.push(table("Ghosts", "ghosts.csv"));
        let output = Output::new(OutputFormat::Quiet);

        let report = run(config, &BuildArgs::default(), &output).await.unwrap();
        assert_eq!(report.tables_read, 2);
        assert_eq!(report.tables_skipped, 1);
        assert_eq!(report.warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_build_fails_when_nothing_retrieved() {
        let (_temp_dir, mut config) = fixture();
        config.tables = vec![table("Ghosts", "ghosts.csv")];
        let output = Output::new(OutputFormat::Quiet);

        assert!(run(config, &BuildArgs::default(), &output).await.is_err());
    }

    #[tokio::test]
    async fn test_clean_keeps_dot_entries() {
        let (_temp_dir, config) = fixture();
        let vault = config.output_dir.clone();
        std::fs::create_dir_all(vault.join(".obsidian")).unwrap();
        std::fs::create_dir_all(vault.join("Stale")).unwrap();
        std::fs::write(vault.join("Stale/Old.md"), "old").unwrap();

        let args = BuildArgs {
            clean: true,
            ..BuildArgs::default()
        };
        run(config, &args, &Output::new(OutputFormat::Quiet))
            .await
            .unwrap();

        assert!(vault.join(".obsidian").exists());
        assert!(!vault.join("Stale").exists());
        assert!(vault.join("Books/Atlas.md").exists());
    }
}
