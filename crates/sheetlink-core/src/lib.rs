//! sheetlink core library
//!
//! Turns a set of tabular sources into a corpus of interlinked markdown
//! documents. Every row becomes a document; cell values that name another
//! row become `[[category/key]]` citations, and every citation is mirrored
//! as a back-link in the cited document.
//!
//! # Architecture
//!
//! A run has two phases:
//!
//! 1. **Catalog**: every table is read and every referenceable entity is
//!    registered. The catalog is frozen before any link is resolved.
//! 2. **Resolution**: each record is rendered and its cells resolved
//!    against the catalog in parallel. The forward link graph is then
//!    transposed and the final link sets merged into the documents.
//!
//! # Quick Start
//!
//! ```text
//! let pipeline = Pipeline::new(PipelineOptions::default());
//! let store = FsDocumentStore::new("vault", "md");
//! let (report, catalog) = pipeline.run(raw_tables, &store);
//! ```
//!
//! # Modules
//!
//! - `pipeline`: Two-phase run (main entry point)
//! - `table`: Source tables, records and fields
//! - `catalog`: Frozen set of referenceable entities
//! - `variants`: Possessive/plural spelling expansion
//! - `resolver`: Cell to reference resolution
//! - `links`: Per-document forward link sets
//! - `graph`: Link graph and its transpose
//! - `merge`: Idempotent link section merging
//! - `storage`: Document stores
//! - `config`: Application configuration

pub mod catalog;
pub mod config;
pub mod graph;
pub mod links;
pub mod merge;
pub mod pipeline;
pub mod reference;
pub mod render;
pub mod report;
pub mod resolver;
pub mod sanitize;
pub mod storage;
pub mod table;
pub mod variants;

pub use catalog::{Catalog, CatalogBuilder};
pub use config::{Config, TableConfig, TableKindName, TableSource};
pub use graph::{FinalLinks, GraphStats, LinkGraph};
pub use links::build_links;
pub use merge::{merge, merge_content, MergeError, MergeOutcome, LINK_SECTION_HEADING};
pub use pipeline::{Pipeline, PipelineOptions, RawTable};
pub use reference::{DocumentId, ReferenceId};
pub use report::{RunReport, RunWarning};
pub use resolver::resolve;
pub use sanitize::sanitize;
pub use storage::{clean_output, DocumentStore, FsDocumentStore, MemoryStore, StoreError};
pub use table::{MatchMode, Table, TableError, TableKind};
pub use variants::expand;
