//! Per-document forward links
//!
//! Drives the resolver across every field of one record and unions the
//! results. A record only ever reads the frozen catalog, never another
//! record's links, so records can be processed in any order or in parallel.

use std::collections::BTreeSet;

use tracing::debug;

use crate::catalog::Catalog;
use crate::reference::{DocumentId, ReferenceId};
use crate::resolver::resolve_field;
use crate::table::Record;

/// Build the forward link set for one record
///
/// A document never cites itself, even when one of its non-key fields
/// happens to name its own key.
pub fn build_links(record: &Record, catalog: &Catalog) -> (DocumentId, BTreeSet<ReferenceId>) {
    let owner = record.reference();
    let mut links = BTreeSet::new();

    for field in record.fields() {
        for reference in resolve_field(field, owner, catalog) {
            if &reference == owner {
                continue;
            }
            if links.insert(reference.clone()) {
                debug!(
                    "Link {} -> {} (field '{}')",
                    owner, reference, field.header
                );
            }
        }
    }

    (record.document_id(), links)
}
