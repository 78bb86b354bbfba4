//! Link graph and reverse pass
//!
//! The graph holds each document's forward set. [`LinkGraph::transpose`]
//! derives back-links and [`LinkGraph::finalize`] merges both directions
//! into the per-document sets the merger writes. Both take the complete
//! graph by reference or value, so the reverse pass can only run once the
//! resolve pass has produced every forward set.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::reference::{DocumentId, ReferenceId};

/// Forward edges for every known document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkGraph {
    forward: BTreeMap<DocumentId, BTreeSet<ReferenceId>>,
}

/// Reverse edges: cited reference -> documents citing it
pub type ReverseEdges = BTreeMap<ReferenceId, BTreeSet<ReferenceId>>;

/// Edge counts of a finalized graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub documents: usize,
    pub forward_edges: usize,
    pub reverse_edges: usize,
}

impl LinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document's forward set, unioning with any set already present
    pub fn insert(&mut self, doc: DocumentId, links: BTreeSet<ReferenceId>) {
        self.forward.entry(doc).or_default().extend(links);
    }

    /// Drop a document and its forward set; it then receives no back-links
    pub fn remove(&mut self, doc: &DocumentId) -> Option<BTreeSet<ReferenceId>> {
        self.forward.remove(doc)
    }

    pub fn contains(&self, doc: &DocumentId) -> bool {
        self.forward.contains_key(doc)
    }

    pub fn forward(&self, doc: &DocumentId) -> Option<&BTreeSet<ReferenceId>> {
        self.forward.get(doc)
    }

    pub fn documents(&self) -> impl Iterator<Item = &DocumentId> {
        self.forward.keys()
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn forward_edge_count(&self) -> usize {
        self.forward.values().map(BTreeSet::len).sum()
    }

    /// Reverse every edge whose target is itself a known document
    ///
    /// References to catalog entries with no document (an expansion cell, a
    /// header-only category) stay valid forward links but get no back-link.
    pub fn transpose(&self) -> ReverseEdges {
        let mut reverse = ReverseEdges::new();
        for (doc, refs) in &self.forward {
            for reference in refs {
                let target = DocumentId::new(reference.clone());
                if self.forward.contains_key(&target) {
                    reverse
                        .entry(reference.clone())
                        .or_default()
                        .insert(doc.reference().clone());
                }
            }
        }
        reverse
    }

    /// Final per-document sets: forward ∪ reverse
    pub fn finalize(self) -> (FinalLinks, GraphStats) {
        let reverse = self.transpose();
        let mut stats = GraphStats {
            documents: self.forward.len(),
            forward_edges: self.forward_edge_count(),
            reverse_edges: 0,
        };

        let mut links = self.forward;
        for (target, sources) in reverse {
            let entry = links.entry(DocumentId::new(target)).or_default();
            for source in sources {
                if entry.insert(source) {
                    stats.reverse_edges += 1;
                }
            }
        }

        (FinalLinks { links }, stats)
    }
}

/// Per-document link sets ready for merging
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalLinks {
    links: BTreeMap<DocumentId, BTreeSet<ReferenceId>>,
}

impl FinalLinks {
    pub fn get(&self, doc: &DocumentId) -> Option<&BTreeSet<ReferenceId>> {
        self.links.get(doc)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DocumentId, &BTreeSet<ReferenceId>)> {
        self.links.iter()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn into_vec(self) -> Vec<(DocumentId, BTreeSet<ReferenceId>)> {
        self.links.into_iter().collect()
    }
}
