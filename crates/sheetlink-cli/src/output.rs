//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use sheetlink_core::{Catalog, RunReport};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print the report of a build
    pub fn print_report(&self, report: &RunReport) {
        match self.format {
            OutputFormat::Human => {
                println!("Build Report");
                println!("============");
                println!();
                println!("Tables:");
                println!("  Read:    {}", report.tables_read);
                println!("  Skipped: {}", report.tables_skipped);
                println!();
                println!("Documents:");
                println!("  References: {}", report.catalog_size);
                println!("  Rendered:   {}", report.documents_rendered);
                if report.documents_kept > 0 {
                    println!("  Kept:       {}", report.documents_kept);
                }
                println!("  Merged:     {}", report.documents_merged);
                println!("  Unchanged:  {}", report.documents_unchanged);
                println!();
                println!("Links:");
                println!("  Forward:   {}", report.forward_edges);
                println!("  Reverse:   {}", report.reverse_edges);
                println!("  Citations: {}", report.citations_written);

                if report.has_warnings() {
                    println!();
                    println!("── Warnings ({}) ──", report.warnings.len());
                    for warning in &report.warnings {
                        println!("⚠ {}", warning);
                    }
                }
            }
            OutputFormat::Json => {
                print_json(report);
            }
            OutputFormat::Quiet => {
                println!(
                    "{} {} {}",
                    report.documents_rendered,
                    report.citations_written,
                    report.warnings.len()
                );
            }
        }
    }

    /// Print every reference in the catalog
    pub fn print_catalog(&self, catalog: &Catalog) {
        match self.format {
            OutputFormat::Human => {
                if catalog.is_empty() {
                    println!("No references found.");
                    return;
                }
                print!("{}", catalog.render_listing());
                println!("\n{} reference(s)", catalog.len());
            }
            OutputFormat::Json => {
                print_json(&catalog.by_collection());
            }
            OutputFormat::Quiet => {
                for reference in catalog.iter() {
                    println!("{}", reference);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}
