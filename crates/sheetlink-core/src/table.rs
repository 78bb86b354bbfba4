//! Source tables and records
//!
//! A [`Table`] is one named CSV sheet: a header row plus value rows. Parsing
//! canonicalizes every header and value once (see [`crate::sanitize`]), so
//! [`Record`]s handed to the rest of the engine are immutable and already
//! comparable by plain string equality.

use std::collections::HashMap;
use std::io::Read;

use thiserror::Error;

use crate::reference::{DocumentId, ReferenceId};
use crate::sanitize::{sanitize, sanitize_category, sanitize_key};

/// Errors that can occur while reading a table
#[derive(Error, Debug)]
pub enum TableError {
    /// The header row is missing or blank
    #[error("Table '{table}' has no header row")]
    MissingHeader { table: String },

    /// The CSV could not be parsed
    #[error("Failed to parse table '{table}': {source}")]
    Csv {
        table: String,
        #[source]
        source: csv::Error,
    },
}

/// How a table's cells become catalog entries and links
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TableKind {
    /// One document per row, only the key field is registered
    #[default]
    Standard,
    /// Every non-empty cell denotes its own entity (glossaries, keyword lists)
    Expansion,
    /// Time-scoped sheet: rows sharing a key are grouped into one document,
    /// and narrative fields also accept substring matches
    Ledger {
        /// Fields holding free text. Empty means every non-key field.
        narrative_fields: Vec<String>,
    },
}

/// How a single field is compared against catalog keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Exact equality after variant expansion
    Exact,
    /// Exact, or case-insensitive substring of the cell value
    Narrative,
}

/// One (header, value) pair of a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Canonical header
    pub header: String,
    /// Canonical value, used for matching
    pub value: String,
    /// Trimmed source text, used for rendering
    pub text: String,
    pub mode: MatchMode,
}

/// One document's worth of fields
///
/// For standard and expansion tables this is one row. For ledger tables it
/// is every row sharing the same key, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    reference: ReferenceId,
    fields: Vec<Field>,
    rows: usize,
}

impl Record {
    pub fn reference(&self) -> &ReferenceId {
        &self.reference
    }

    pub fn document_id(&self) -> DocumentId {
        DocumentId::new(self.reference.clone())
    }

    /// The canonical key (value of the first field)
    pub fn key(&self) -> &str {
        self.reference.key()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Number of source rows folded into this record
    pub fn row_count(&self) -> usize {
        self.rows
    }
}

/// A parsed, canonicalized table
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    category: String,
    kind: TableKind,
    headers: Vec<String>,
    rows: Vec<Vec<(String, String)>>,
}

impl Table {
    /// Parse a table from CSV
    ///
    /// `collection` is an optional category prefix (`Book of Hours`), giving
    /// categories such as `Book of Hours/Rooms`.
    pub fn from_csv<R: Read>(
        name: &str,
        collection: Option<&str>,
        kind: TableKind,
        reader: R,
    ) -> Result<Self, TableError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let raw_headers = csv_reader
            .headers()
            .map_err(|source| TableError::Csv {
                table: name.to_string(),
                source,
            })?
            .clone();

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result.map_err(|source| TableError::Csv {
                table: name.to_string(),
                source,
            })?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        let headers: Vec<String> = raw_headers.iter().map(str::to_string).collect();
        Self::from_rows(name, collection, kind, headers, rows)
    }

    /// Build a table from raw header and row strings
    pub fn from_rows(
        name: &str,
        collection: Option<&str>,
        kind: TableKind,
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    ) -> Result<Self, TableError> {
        if headers.iter().all(|h| sanitize(h).is_empty()) {
            return Err(TableError::MissingHeader {
                table: name.to_string(),
            });
        }

        let headers = disambiguate_headers(&headers);

        let rows = rows
            .into_iter()
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
            .map(|row| {
                (0..headers.len())
                    .map(|i| {
                        let raw = row.get(i).map(String::as_str).unwrap_or("");
                        (sanitize(raw), raw.trim().to_string())
                    })
                    .collect()
            })
            .collect();

        let category = match collection {
            Some(prefix) => sanitize_category(&format!("{}/{}", prefix, name)),
            None => sanitize_category(name),
        };

        Ok(Self {
            name: name.to_string(),
            category,
            kind,
            headers,
            rows,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical category path used in every reference from this table
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn kind(&self) -> &TableKind {
        &self.kind
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Match mode for a canonical header
    pub fn match_mode(&self, header: &str) -> MatchMode {
        match &self.kind {
            TableKind::Ledger { narrative_fields } => {
                let is_key = self.headers.first().map(|h| h == header).unwrap_or(false);
                if is_key {
                    MatchMode::Exact
                } else if narrative_fields.is_empty()
                    || narrative_fields.iter().any(|f| sanitize(f) == header)
                {
                    MatchMode::Narrative
                } else {
                    MatchMode::Exact
                }
            }
            _ => MatchMode::Exact,
        }
    }

    /// Records of this table, grouped by key for ledger tables
    pub fn records(&self) -> Vec<Record> {
        match self.kind {
            TableKind::Ledger { .. } => self.grouped_records(),
            _ => self.rows.iter().map(|row| self.row_record(row)).collect(),
        }
    }

    fn row_fields<'a>(&'a self, row: &'a [(String, String)]) -> impl Iterator<Item = Field> + 'a {
        self.headers
            .iter()
            .zip(row.iter())
            .map(move |(header, (value, text))| Field {
                header: header.clone(),
                value: value.clone(),
                text: text.clone(),
                mode: self.match_mode(header),
            })
    }

    fn row_key(&self, row: &[(String, String)]) -> String {
        sanitize_key(row.first().map(|(value, _)| value.as_str()).unwrap_or(""))
    }

    fn row_record(&self, row: &[(String, String)]) -> Record {
        Record {
            reference: ReferenceId::new(&self.category, &self.row_key(row)),
            fields: self.row_fields(row).collect(),
            rows: 1,
        }
    }

    fn grouped_records(&self) -> Vec<Record> {
        let mut groups: Vec<Record> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for row in &self.rows {
            let key = self.row_key(row);
            match index.get(&key) {
                Some(&i) => {
                    let group = &mut groups[i];
                    // The key field is shared by every member row
                    group.fields.extend(self.row_fields(row).skip(1));
                    group.rows += 1;
                }
                None => {
                    index.insert(key.clone(), groups.len());
                    groups.push(Record {
                        reference: ReferenceId::new(&self.category, &key),
                        fields: self.row_fields(row).collect(),
                        rows: 1,
                    });
                }
            }
        }

        groups
    }
}

/// Sanitize headers and suffix duplicates: `Name`, `Name_2`, `Name_3`
fn disambiguate_headers(raw: &[String]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    raw.iter()
        .map(|h| {
            let header = sanitize(h);
            let count = seen.entry(header.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                header
            } else {
                format!("{}_{}", header, count)
            }
        })
        .collect()
}
