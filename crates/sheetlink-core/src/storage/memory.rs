//! In-memory document store

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use super::error::{StoreError, StoreResult};
use super::DocumentStore;
use crate::reference::DocumentId;

/// Document store backed by a map
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Mutex<BTreeMap<DocumentId, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every document
    pub fn snapshot(&self) -> BTreeMap<DocumentId, String> {
        self.docs.lock().map(|docs| docs.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.docs.lock().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DocumentStore for MemoryStore {
    fn exists(&self, doc: &DocumentId) -> bool {
        self.docs
            .lock()
            .map(|docs| docs.contains_key(doc))
            .unwrap_or(false)
    }

    fn read(&self, doc: &DocumentId) -> StoreResult<Option<String>> {
        let docs = self.docs.lock().map_err(|_| poisoned(doc))?;
        Ok(docs.get(doc).cloned())
    }

    fn write(&self, doc: &DocumentId, content: &str) -> StoreResult<()> {
        let mut docs = self.docs.lock().map_err(|_| poisoned(doc))?;
        docs.insert(doc.clone(), content.to_string());
        Ok(())
    }

    fn append(&self, doc: &DocumentId, content: &str) -> StoreResult<()> {
        let mut docs = self.docs.lock().map_err(|_| poisoned(doc))?;
        match docs.get_mut(doc) {
            Some(existing) => {
                existing.push_str(content);
                Ok(())
            }
            None => Err(StoreError::NotFound {
                path: PathBuf::from(doc.to_string()),
            }),
        }
    }
}

fn poisoned(doc: &DocumentId) -> StoreError {
    StoreError::WriteError {
        path: PathBuf::from(doc.to_string()),
        source: std::io::Error::new(std::io::ErrorKind::Other, "store lock poisoned"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceId;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        let doc = DocumentId::new(ReferenceId::new("Rooms", "Library"));

        assert!(store.read(&doc).unwrap().is_none());
        assert!(store.append(&doc, "x").is_err());

        store.write(&doc, "a").unwrap();
        store.append(&doc, "b").unwrap();
        assert_eq!(store.read(&doc).unwrap().unwrap(), "ab");
        assert_eq!(store.len(), 1);
    }
}
