//! End-of-run report
//!
//! Per-table and per-document failures never abort a run. They are
//! collected here as [`RunWarning`]s alongside the run's counters.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::reference::DocumentId;
use crate::storage::StoreError;

/// An isolated failure recorded during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunWarning {
    /// Table could not be parsed or has no header row; nothing registered
    MalformedTable { table: String, reason: String },
    /// Table could not be retrieved at all
    UnavailableTable { table: String, reason: String },
    /// Two rows of a non-ledger table share a key
    DuplicateKey { document: DocumentId },
    /// A document to merge into does not exist
    MissingDocument { document: DocumentId },
    /// Reading or writing a document failed
    StoreFailure {
        document: DocumentId,
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        suggestion: Option<String>,
    },
}

impl RunWarning {
    /// Wrap a store error for `document`, keeping its recovery hint
    pub fn store_failure(document: &DocumentId, error: &StoreError) -> Self {
        RunWarning::StoreFailure {
            document: document.clone(),
            error: error.to_string(),
            suggestion: error.recovery_suggestion().map(str::to_string),
        }
    }
}

impl fmt::Display for RunWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunWarning::MalformedTable { table, reason } => {
                write!(f, "Skipped table '{}': {}", table, reason)
            }
            RunWarning::UnavailableTable { table, reason } => {
                write!(f, "Could not retrieve table '{}': {}", table, reason)
            }
            RunWarning::DuplicateKey { document } => {
                write!(f, "Duplicate key '{}': last row wins, links merged", document)
            }
            RunWarning::MissingDocument { document } => {
                write!(f, "Document '{}' not found, links not merged", document)
            }
            RunWarning::StoreFailure {
                document,
                error,
                suggestion,
            } => {
                write!(f, "Store failure for '{}': {}", document, error)?;
                match suggestion {
                    Some(hint) => write!(f, " ({})", hint),
                    None => Ok(()),
                }
            }
        }
    }
}

/// Counters and warnings for one run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub tables_read: usize,
    pub tables_skipped: usize,
    pub catalog_size: usize,
    pub documents_rendered: usize,
    /// Existing documents left untouched by `keep_existing`
    pub documents_kept: usize,
    pub forward_edges: usize,
    pub reverse_edges: usize,
    pub documents_merged: usize,
    pub documents_unchanged: usize,
    pub citations_written: usize,
    pub warnings: Vec<RunWarning>,
}

impl Default for RunReport {
    fn default() -> Self {
        Self {
            started_at: Utc::now(),
            tables_read: 0,
            tables_skipped: 0,
            catalog_size: 0,
            documents_rendered: 0,
            documents_kept: 0,
            forward_edges: 0,
            reverse_edges: 0,
            documents_merged: 0,
            documents_unchanged: 0,
            citations_written: 0,
            warnings: Vec::new(),
        }
    }
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, warning: RunWarning) {
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
