//! Config command handlers

use std::path::PathBuf;

use anyhow::{Context, Result};

use sheetlink_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "output_dir": config.output_dir,
                    "extension": config.extension,
                    "collection": config.collection,
                    "workers": config.workers,
                    "keep_existing": config.keep_existing,
                    "tables": config.tables
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.output_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  output_dir:    {}", config.output_dir.display());
            println!("  extension:     {}", config.extension);
            println!(
                "  collection:    {}",
                config.collection.as_deref().unwrap_or("(not set)")
            );
            println!(
                "  workers:       {}",
                config
                    .workers
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "(auto)".to_string())
            );
            println!("  keep_existing: {}", config.keep_existing);
            println!();
            println!("Tables ({}):", config.tables.len());
            for table in &config.tables {
                let source = table
                    .url
                    .clone()
                    .or_else(|| table.path.as_ref().map(|p| p.display().to_string()))
                    .unwrap_or_else(|| "(no source)".to_string());
                println!("  {} [{:?}] {}", table.name, table.kind, source);
            }
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    config.set(&key, &value)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_persists_to_given_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let output = Output::new(OutputFormat::Quiet);

        set(
            "collection".to_string(),
            "Book of Hours".to_string(),
            Some(&path),
            &output,
        )
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("collection = \"Book of Hours\""));
        assert!(set("bogus".to_string(), "x".to_string(), Some(&path), &output).is_err());
    }
}
