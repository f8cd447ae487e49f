use crate::document::{now_rfc3339, Document};
use anyhow::Result;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

const DOCUMENTS_KEY: &str = "rag_documents";
const META_KEY: &str = "rag_meta";

/// Snapshot header written next to the collection.
#[derive(Debug, Serialize, Deserialize)]
pub struct MetaRecord {
    pub num_docs: u32,
    pub saved_at: String,
    pub version: u32,
}

/// Persistence collaborator for the document collection.
///
/// `save_documents` always receives the full current collection in insertion
/// order, never a delta. `load_documents` returns an empty sequence when
/// nothing has been persisted yet.
pub trait DocumentStorage: Send + Sync {
    fn load_documents(&self) -> Result<Vec<Document>>;
    fn save_documents(&mut self, documents: &[Document]) -> Result<()>;
    fn delete_all(&mut self) -> Result<()>;
}

/// Reference backend: the whole collection as one JSON blob in a sled tree,
/// with a small meta record beside it.
pub struct SledStorage {
    db: sled::Db,
}

impl SledStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }
}

impl DocumentStorage for SledStorage {
    fn load_documents(&self) -> Result<Vec<Document>> {
        match self.db.get(DOCUMENTS_KEY)? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(Vec::new()),
        }
    }

    fn save_documents(&mut self, documents: &[Document]) -> Result<()> {
        let blob = serde_json::to_vec(documents)?;
        self.db.insert(DOCUMENTS_KEY, blob)?;
        let meta = MetaRecord {
            num_docs: documents.len() as u32,
            saved_at: now_rfc3339(),
            version: 1,
        };
        self.db.insert(META_KEY, serde_json::to_vec(&meta)?)?;
        self.db.flush()?;
        Ok(())
    }

    fn delete_all(&mut self) -> Result<()> {
        self.db.remove(DOCUMENTS_KEY)?;
        self.db.remove(META_KEY)?;
        self.db.flush()?;
        Ok(())
    }
}

/// In-memory backend. Clones share the underlying collection, so a test can
/// hand one clone to a store and inspect the "persisted" state via another.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    documents: Arc<Mutex<Vec<Document>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStorage for MemoryStorage {
    fn load_documents(&self) -> Result<Vec<Document>> {
        Ok(self.documents.lock().clone())
    }

    fn save_documents(&mut self, documents: &[Document]) -> Result<()> {
        *self.documents.lock() = documents.to_vec();
        Ok(())
    }

    fn delete_all(&mut self) -> Result<()> {
        self.documents.lock().clear();
        Ok(())
    }
}
