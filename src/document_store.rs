use std::path::Path;

use chrono::{DateTime, Utc};
use redb::{
    Database,
    ReadableDatabase,
    ReadableTable,
    ReadableTableMetadata,
    TableDefinition,
};
use serde::{Deserialize, Serialize};

use crate::{doc_id::DocumentId, error::Result};

/// Document id (hyphenated UUID) -> JSON-encoded [`StoredDocument`].
const DOCUMENTS: TableDefinition<&str, &[u8]> =
    TableDefinition::new("documents");

/// An uploaded document with its extracted text and summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub filename: String,
    pub content: String,
    pub summary: String,
    pub uploaded_at: DateTime<Utc>,
}

impl StoredDocument {
    /// Build a new document with a fresh id, stamped with the current time.
    pub fn new(filename: &str, content: String, summary: String) -> Self {
        Self {
            id: DocumentId::new().to_string(),
            filename: filename.to_string(),
            content,
            summary,
            uploaded_at: Utc::now(),
        }
    }
}

pub struct DocumentStore {
    db: Database,
}

impl DocumentStore {
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path)?;

        // Ensure the table exists by opening it in a write transaction.
        let txn = db.begin_write()?;
        txn.open_table(DOCUMENTS)?;
        txn.commit()?;

        Ok(Self { db })
    }

    /// Insert a document, replacing any existing entry with the same id.
    pub fn insert(&self, doc: &StoredDocument) -> Result<()> {
        let bytes = serde_json::to_vec(doc)?;
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(DOCUMENTS)?;
            table.insert(doc.id.as_str(), bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get(&self, id: &DocumentId) -> Result<Option<StoredDocument>> {
        let key = id.to_string();
        let txn = self.db.begin_read()?;
        let table = txn.open_table(DOCUMENTS)?;
        match table.get(key.as_str())? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    pub fn remove(&self, id: &DocumentId) -> Result<bool> {
        let key = id.to_string();
        let txn = self.db.begin_write()?;
        let removed = {
            let mut table = txn.open_table(DOCUMENTS)?;
            table.remove(key.as_str())?.is_some()
        };
        txn.commit()?;
        Ok(removed)
    }

    /// Return every document, most recently uploaded first.
    pub fn list(&self) -> Result<Vec<StoredDocument>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(DOCUMENTS)?;
        let mut result = Vec::new();
        for entry in table.iter()? {
            let (_k, v) = entry?;
            result.push(serde_json::from_slice::<StoredDocument>(v.value())?);
        }
        result.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(result)
    }

    pub fn len(&self) -> Result<usize> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(DOCUMENTS)?;
        Ok(table.len()? as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn test_store() -> (tempfile::TempDir, DocumentStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store =
            DocumentStore::open(&tmp.path().join("documents.redb")).unwrap();
        (tmp, store)
    }

    fn doc_at(filename: &str, secs: i64) -> StoredDocument {
        let mut doc = StoredDocument::new(
            filename,
            format!("content of {filename}"),
            "summary".to_string(),
        );
        doc.uploaded_at = Utc.timestamp_opt(secs, 0).unwrap();
        doc
    }

    #[test]
    fn documents_crud() {
        let (_tmp, store) = test_store();
        assert!(store.is_empty().unwrap());

        let doc = doc_at("notes.txt", 1_700_000_000);
        store.insert(&doc).unwrap();

        let id = DocumentId::parse(&doc.id).unwrap();
        assert_eq!(store.get(&id).unwrap(), Some(doc.clone()));
        assert_eq!(store.len().unwrap(), 1);

        assert!(store.remove(&id).unwrap());
        assert!(!store.remove(&id).unwrap());
        assert_eq!(store.get(&id).unwrap(), None);
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn list_is_newest_first() {
        let (_tmp, store) = test_store();
        store.insert(&doc_at("old.txt", 1_000)).unwrap();
        store.insert(&doc_at("new.txt", 3_000)).unwrap();
        store.insert(&doc_at("mid.txt", 2_000)).unwrap();

        let names: Vec<_> = store
            .list()
            .unwrap()
            .into_iter()
            .map(|d| d.filename)
            .collect();
        assert_eq!(names, vec!["new.txt", "mid.txt", "old.txt"]);
    }

    #[test]
    fn insert_same_id_replaces() {
        let (_tmp, store) = test_store();
        let mut doc = doc_at("a.txt", 10);
        store.insert(&doc).unwrap();
        doc.summary = "updated".to_string();
        store.insert(&doc).unwrap();

        let all = store.list().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].summary, "updated");
    }

    #[test]
    fn reopen_preserves_data() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("documents.redb");
        let doc = doc_at("kept.md", 42);

        {
            let store = DocumentStore::open(&path).unwrap();
            store.insert(&doc).unwrap();
        }

        {
            let store = DocumentStore::open(&path).unwrap();
            let all = store.list().unwrap();
            assert_eq!(all, vec![doc]);
        }
    }

    #[test]
    fn unknown_id_returns_none() {
        let (_tmp, store) = test_store();
        assert!(store.get(&DocumentId::new()).unwrap().is_none());
    }
}
