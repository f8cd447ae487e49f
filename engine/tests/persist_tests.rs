use anyhow::{bail, Result};
use engine::persist::{DocumentStorage, SledStorage};
use engine::store::DocumentStore;
use engine::{Document, MetadataPatch};
use tempfile::tempdir;

#[test]
fn sled_collection_round_trips() {
    let dir = tempdir().unwrap();

    let id = {
        let storage = SledStorage::open(dir.path()).unwrap();
        let mut store = DocumentStore::new(Box::new(storage));
        let id = store
            .add_document("gatos persistentes", MetadataPatch::default())
            .unwrap();
        store
            .add_document("perros también", MetadataPatch::default())
            .unwrap();
        id
    };

    let storage = SledStorage::open(dir.path()).unwrap();
    let mut store = DocumentStore::new(Box::new(storage));
    store.initialize().unwrap();
    assert_eq!(store.count(), 2);
    let doc = store.get(&id).unwrap();
    assert_eq!(doc.content, "gatos persistentes");
    assert_eq!(doc.tokens, vec!["gatos", "persistentes"]);
}

#[test]
fn clear_deletes_the_persisted_collection() {
    let dir = tempdir().unwrap();

    {
        let storage = SledStorage::open(dir.path()).unwrap();
        let mut store = DocumentStore::new(Box::new(storage));
        store
            .add_document("efímero", MetadataPatch::default())
            .unwrap();
        store.clear().unwrap();
    }

    let storage = SledStorage::open(dir.path()).unwrap();
    let mut store = DocumentStore::new(Box::new(storage));
    store.initialize().unwrap();
    assert_eq!(store.count(), 0);
}

#[test]
fn empty_data_dir_loads_an_empty_collection() {
    let dir = tempdir().unwrap();
    let storage = SledStorage::open(dir.path()).unwrap();
    let mut store = DocumentStore::new(Box::new(storage));
    store.initialize().unwrap();
    assert_eq!(store.count(), 0);
}

/// Accepts loads, fails every write.
struct FailingStorage;

impl DocumentStorage for FailingStorage {
    fn load_documents(&self) -> Result<Vec<Document>> {
        Ok(Vec::new())
    }

    fn save_documents(&mut self, _documents: &[Document]) -> Result<()> {
        bail!("disk full")
    }

    fn delete_all(&mut self) -> Result<()> {
        bail!("disk full")
    }
}

#[test]
fn save_failure_propagates_with_memory_state_applied() {
    let mut store = DocumentStore::new(Box::new(FailingStorage));
    let err = store
        .add_document("cambio no durable", MetadataPatch::default())
        .unwrap_err();
    assert!(err.to_string().contains("disk full"));
    // The mutation stays applied in memory; only durability was lost.
    assert_eq!(store.count(), 1);
}
