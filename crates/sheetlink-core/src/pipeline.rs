//! Two-phase link pipeline
//!
//! The pipeline is the main entry point. It runs, in order:
//!
//! 1. **Catalog**: scan every table once and freeze the catalog
//! 2. **Render**: write the initial text of every document
//! 3. **Resolve**: build every document's forward set against the frozen
//!    catalog, spread over a fixed-size worker pool
//! 4. **Transpose**: once all forward sets are final, add back-links
//! 5. **Merge**: append each document's final set to its stored text
//!
//! Each phase finishes before the next begins. Rendering and merging hand
//! each document id to exactly one worker, so no document ever has two
//! writers. Failures are isolated per table or document and collected in
//! the [`RunReport`].
//!
//! ## Usage
//!
//! ```ignore
//! let pipeline = Pipeline::new(PipelineOptions::default());
//! let store = FsDocumentStore::new("vault", "md");
//! let (report, catalog) = pipeline.run(raw_tables, &store);
//! ```

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::thread;

use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::graph::LinkGraph;
use crate::links::build_links;
use crate::merge::{merge, MergeError, MergeOutcome};
use crate::reference::{DocumentId, ReferenceId};
use crate::render::render_document;
use crate::report::{RunReport, RunWarning};
use crate::storage::DocumentStore;
use crate::table::{Record, Table, TableKind};

/// A table as retrieved, before parsing
#[derive(Debug, Clone)]
pub struct RawTable {
    pub name: String,
    pub kind: TableKind,
    pub csv: String,
}

/// Pipeline settings
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Worker threads for the render, resolve and merge phases
    pub workers: usize,
    /// Leave documents that already exist untouched instead of re-rendering
    pub keep_existing: bool,
    /// Category prefix applied to every table
    pub collection: Option<String>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            keep_existing: false,
            collection: None,
        }
    }
}

/// Number of workers when none is configured
pub fn default_workers() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// The reference resolution and link graph pipeline
pub struct Pipeline {
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(options: PipelineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Parse raw tables, reporting and dropping malformed ones
    pub fn parse_tables(&self, raw: Vec<RawTable>, report: &mut RunReport) -> Vec<Table> {
        let mut tables = Vec::with_capacity(raw.len());
        for table in raw {
            match Table::from_csv(
                &table.name,
                self.options.collection.as_deref(),
                table.kind,
                table.csv.as_bytes(),
            ) {
                Ok(parsed) => {
                    debug!(
                        "Parsed table '{}' ({} rows) as {}",
                        parsed.name(),
                        parsed.row_count(),
                        parsed.category()
                    );
                    tables.push(parsed);
                }
                Err(e) => {
                    report.tables_skipped += 1;
                    report.warn(RunWarning::MalformedTable {
                        table: table.name,
                        reason: e.to_string(),
                    });
                }
            }
        }
        report.tables_read += tables.len();
        tables
    }

    /// Build the frozen catalog for a set of tables
    pub fn build_catalog(&self, tables: &[Table]) -> Catalog {
        let catalog = Catalog::from_tables(tables);
        info!(
            "Catalog built: {} references from {} tables",
            catalog.len(),
            tables.len()
        );
        catalog
    }

    /// Run every phase over raw tables
    pub fn run(&self, raw: Vec<RawTable>, store: &dyn DocumentStore) -> (RunReport, Catalog) {
        let mut report = RunReport::new();
        let tables = self.parse_tables(raw, &mut report);
        let catalog = self.run_tables(&tables, store, &mut report);
        (report, catalog)
    }

    /// Run every phase over parsed tables
    pub fn run_tables(
        &self,
        tables: &[Table],
        store: &dyn DocumentStore,
        report: &mut RunReport,
    ) -> Catalog {
        // Phase 1: the catalog is closed before any record is resolved
        let catalog = self.build_catalog(tables);
        report.catalog_size = catalog.len();

        let records: Vec<Record> = tables.iter().flat_map(Table::records).collect();
        let bodies = self.unique_documents(&records, report);

        // Phase 2
        let unwritten = self.render_phase(&bodies, store, report);

        // Phase 3
        let mut graph = self.resolve_phase(&records, &catalog);

        // A document that failed to render is neither merged nor cited back
        for doc in &unwritten {
            graph.remove(doc);
        }

        // Phase 4
        let (links, stats) = graph.finalize();
        report.forward_edges = stats.forward_edges;
        report.reverse_edges = stats.reverse_edges;
        info!(
            "Link graph: {} documents, {} forward edges, {} back-links",
            stats.documents, stats.forward_edges, stats.reverse_edges
        );

        // Phase 5
        self.merge_phase(links.into_vec(), store, report);

        catalog
    }

    /// The record that supplies each document's body: the last row per key
    fn unique_documents<'a>(
        &self,
        records: &'a [Record],
        report: &mut RunReport,
    ) -> Vec<(DocumentId, &'a Record)> {
        let mut bodies: BTreeMap<DocumentId, &Record> = BTreeMap::new();
        let mut duplicates: HashSet<DocumentId> = HashSet::new();
        for record in records {
            let doc = record.document_id();
            if bodies.insert(doc.clone(), record).is_some() && duplicates.insert(doc.clone()) {
                report.warn(RunWarning::DuplicateKey { document: doc });
            }
        }
        bodies.into_iter().collect()
    }

    fn render_phase(
        &self,
        bodies: &[(DocumentId, &Record)],
        store: &dyn DocumentStore,
        report: &mut RunReport,
    ) -> HashSet<DocumentId> {
        info!("Rendering {} documents", bodies.len());
        let keep_existing = self.options.keep_existing;

        let results = parallel_map(bodies, self.options.workers, |(doc, record)| {
            if keep_existing && store.exists(doc) {
                return Ok(false);
            }
            store
                .write(doc, &render_document(record))
                .map(|_| true)
                .map_err(|e| RunWarning::store_failure(doc, &e))
        });

        let mut unwritten = HashSet::new();
        for ((doc, _), result) in bodies.iter().zip(results) {
            match result {
                Ok(true) => report.documents_rendered += 1,
                Ok(false) => report.documents_kept += 1,
                Err(warning) => {
                    report.warn(warning);
                    unwritten.insert(doc.clone());
                }
            }
        }
        unwritten
    }

    fn resolve_phase(&self, records: &[Record], catalog: &Catalog) -> LinkGraph {
        info!(
            "Resolving {} records with {} workers",
            records.len(),
            self.options.workers
        );
        let forward = parallel_map(records, self.options.workers, |record| {
            build_links(record, catalog)
        });

        // Barrier: every forward set is final before the graph exists
        let mut graph = LinkGraph::new();
        for (doc, links) in forward {
            graph.insert(doc, links);
        }
        graph
    }

    fn merge_phase(
        &self,
        links: Vec<(DocumentId, BTreeSet<ReferenceId>)>,
        store: &dyn DocumentStore,
        report: &mut RunReport,
    ) {
        info!("Merging links into {} documents", links.len());
        let results = parallel_map(&links, self.options.workers, |(doc, set)| {
            merge(store, doc, set).map_err(|e| match e {
                MergeError::MissingDocument(document) => RunWarning::MissingDocument { document },
                MergeError::Store(e) => RunWarning::store_failure(doc, &e),
            })
        });

        for result in results {
            match result {
                Ok(MergeOutcome::SectionAdded { links }) | Ok(MergeOutcome::Appended { links }) => {
                    report.documents_merged += 1;
                    report.citations_written += links;
                }
                Ok(MergeOutcome::Unchanged) => report.documents_unchanged += 1,
                Err(warning) => report.warn(warning),
            }
        }
    }
}

/// Map `f` over `items` on up to `workers` scoped threads, preserving order
fn parallel_map<T, R, F>(items: &[T], workers: usize, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    if items.is_empty() {
        return Vec::new();
    }
    let workers = workers.max(1).min(items.len());
    if workers == 1 {
        return items.iter().map(&f).collect();
    }

    let chunk_size = items.len().div_ceil(workers);
    let f = &f;
    thread::scope(|s| {
        let handles: Vec<_> = items
            .chunks(chunk_size)
            .map(|chunk| s.spawn(move || chunk.iter().map(f).collect::<Vec<R>>()))
            .collect();

        let mut out = Vec::with_capacity(items.len());
        for handle in handles {
            match handle.join() {
                Ok(part) => out.extend(part),
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
        out
    })
}
