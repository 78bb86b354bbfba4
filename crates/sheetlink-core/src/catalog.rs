//! Reference catalog
//!
//! The catalog is the closed-world set of every linkable [`ReferenceId`].
//! It is built in two steps: a [`CatalogBuilder`] accumulates references
//! while every table is scanned, then [`CatalogBuilder::finish`] freezes it
//! into a read-only [`Catalog`]. Resolution only ever sees the frozen form,
//! so no record can be resolved against a partially built catalog.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use crate::reference::ReferenceId;
use crate::table::{Table, TableKind};

/// Mutable catalog under construction
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    entries: BTreeSet<ReferenceId>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `category/key`. Idempotent.
    pub fn register(&mut self, category: &str, key: &str) {
        let reference = ReferenceId::new(category, key);
        if self.entries.insert(reference.clone()) {
            debug!("Registered reference {}", reference);
        }
    }

    /// Add `category/key` plus `category/value` for every non-empty extra value
    pub fn register_expanded<'a, I>(&mut self, category: &str, key: &str, extra_values: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.register(category, key);
        for value in extra_values {
            if !value.is_empty() {
                self.register(category, value);
            }
        }
    }

    /// Register every record of a table
    pub fn add_table(&mut self, table: &Table) {
        let expand = matches!(table.kind(), TableKind::Expansion);
        for record in table.records() {
            if expand {
                let extras = record.fields().iter().skip(1).map(|f| f.value.as_str());
                self.register_expanded(table.category(), record.key(), extras);
            } else {
                self.register(table.category(), record.key());
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freeze the catalog for resolution
    pub fn finish(self) -> Catalog {
        let mut by_key: HashMap<String, Vec<ReferenceId>> = HashMap::new();
        for reference in &self.entries {
            by_key
                .entry(reference.key().to_string())
                .or_default()
                .push(reference.clone());
        }
        Catalog {
            entries: self.entries,
            by_key,
        }
    }
}

/// Frozen, read-only catalog
#[derive(Debug, Default)]
pub struct Catalog {
    entries: BTreeSet<ReferenceId>,
    /// Key (final segment) -> every reference with that key
    by_key: HashMap<String, Vec<ReferenceId>>,
}

impl Catalog {
    /// Build a frozen catalog from a set of tables
    pub fn from_tables<'a, I>(tables: I) -> Self
    where
        I: IntoIterator<Item = &'a Table>,
    {
        let mut builder = CatalogBuilder::new();
        for table in tables {
            builder.add_table(table);
        }
        builder.finish()
    }

    pub fn contains(&self, reference: &ReferenceId) -> bool {
        self.entries.contains(reference)
    }

    /// Every reference whose key equals `key`
    pub fn with_key(&self, key: &str) -> &[ReferenceId] {
        self.by_key.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All references in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &ReferenceId> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// References grouped by top-level collection
    pub fn by_collection(&self) -> BTreeMap<&str, Vec<&ReferenceId>> {
        let mut groups: BTreeMap<&str, Vec<&ReferenceId>> = BTreeMap::new();
        for reference in &self.entries {
            groups
                .entry(reference.collection())
                .or_default()
                .push(reference);
        }
        groups
    }

    /// Plain-text listing of the catalog, one reference per line
    pub fn render_listing(&self) -> String {
        let mut out = String::from("Link References:\n");
        for (collection, references) in self.by_collection() {
            out.push('\n');
            out.push_str(&format!("# {} ({})\n", collection, references.len()));
            for reference in references {
                out.push_str(reference.as_str());
                out.push('\n');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str, kind: TableKind, csv: &str) -> Table {
        Table::from_csv(name, None, kind, csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut builder = CatalogBuilder::new();
        builder.register("Rooms", "Library");
        builder.register("Rooms", "Library");
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_register_expanded_skips_empty() {
        let mut builder = CatalogBuilder::new();
        builder.register_expanded("Keywords", "Ink", ["Reagent", "", "Ink"]);
        let catalog = builder.finish();
        let refs: Vec<_> = catalog.iter().map(|r| r.as_str()).collect();
        assert_eq!(refs, vec!["Keywords/Ink", "Keywords/Reagent"]);
    }

    #[test]
    fn test_expansion_table_registers_every_cell() {
        let csv = "Term,Category\nInk,Reagent\n";
        let expanded = Catalog::from_tables([&table("ExpTable", TableKind::Expansion, csv)]);
        assert!(expanded.contains(&ReferenceId::new("ExpTable", "Ink")));
        assert!(expanded.contains(&ReferenceId::new("ExpTable", "Reagent")));

        let standard = Catalog::from_tables([&table("Table", TableKind::Standard, csv)]);
        assert_eq!(standard.len(), 1);
        assert!(standard.contains(&ReferenceId::new("Table", "Ink")));
        assert!(!standard.contains(&ReferenceId::new("Table", "Reagent")));
    }

    #[test]
    fn test_ledger_registers_group_keys() {
        let csv = "Year,Event\n1901,Fire\n1901,Flood\n1902,Quiet\n";
        let catalog = Catalog::from_tables([&table(
            "History",
            TableKind::Ledger {
                narrative_fields: Vec::new(),
            },
            csv,
        )]);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_with_key_spans_categories() {
        let mut builder = CatalogBuilder::new();
        builder.register("Rooms", "Library");
        builder.register("Skills", "Library");
        builder.register("Rooms", "Kitchen");
        let catalog = builder.finish();

        assert_eq!(catalog.with_key("Library").len(), 2);
        assert!(catalog.with_key("Attic").is_empty());
    }

    #[test]
    fn test_listing_grouped_by_collection() {
        let mut builder = CatalogBuilder::new();
        builder.register("Book of Hours/Rooms", "Library");
        builder.register("Book of Hours/Skills", "Ink");
        builder.register("Other/Things", "Stuff");
        let listing = builder.finish().render_listing();

        assert!(listing.starts_with("Link References:\n"));
        assert!(listing.contains("# Book of Hours (2)\n"));
        assert!(listing.contains("Book of Hours/Rooms/Library\n"));
        assert!(listing.contains("# Other (1)\nOther/Things/Stuff\n"));
    }
}
