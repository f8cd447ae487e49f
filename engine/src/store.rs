use crate::document::{now_rfc3339, Document, DocumentId, DocumentMetadata, MetadataPatch};
use crate::index::InvertedIndex;
use crate::persist::DocumentStorage;
use crate::tokenizer::tokenize;
use anyhow::Result;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::HashMap;
use time::OffsetDateTime;

/// Owns the authoritative id -> record mapping plus the inverted index
/// derived from it. Mutations persist the full collection through the
/// storage collaborator; a persistence failure propagates with the
/// in-memory change already applied.
///
/// Not internally synchronized: callers interleaving mutations must
/// serialize access themselves.
pub struct DocumentStore {
    documents: HashMap<DocumentId, Document>,
    /// Insertion order; drives persistence order and the ranking tie-break.
    order: Vec<DocumentId>,
    index: InvertedIndex,
    storage: Box<dyn DocumentStorage>,
    initialized: bool,
}

impl DocumentStore {
    pub fn new(storage: Box<dyn DocumentStorage>) -> Self {
        Self {
            documents: HashMap::new(),
            order: Vec::new(),
            index: InvertedIndex::new(),
            storage,
            initialized: false,
        }
    }

    /// Load the persisted collection and rebuild the index from it. Runs
    /// once; later calls are no-ops. Every search/mutation operation calls
    /// this first.
    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        let saved = self.storage.load_documents()?;
        for doc in saved {
            self.index.add_document(&doc.id, &doc.tokens);
            self.order.push(doc.id.clone());
            let prev = self.documents.insert(doc.id.clone(), doc);
            assert!(prev.is_none(), "duplicate document id in persisted collection");
        }
        self.initialized = true;
        tracing::info!(documents = self.documents.len(), "document store initialized");
        Ok(())
    }

    /// Store a document and return its generated id. Whitespace-only content
    /// is stored as-is; it tokenizes to nothing and will never be retrieved.
    pub fn add_document(&mut self, content: &str, metadata: MetadataPatch) -> Result<DocumentId> {
        self.initialize()?;
        let id = generate_id();
        let tokens = tokenize(content);
        let doc = Document {
            id: id.clone(),
            content: content.to_string(),
            tokens,
            metadata: DocumentMetadata {
                title: metadata.title.unwrap_or_else(|| format!("Documento {id}")),
                source: metadata.source.unwrap_or_else(|| "user".to_string()),
                timestamp: now_rfc3339(),
                extra: metadata.extra,
            },
        };
        self.index.add_document(&doc.id, &doc.tokens);
        self.order.push(id.clone());
        let prev = self.documents.insert(id.clone(), doc);
        assert!(prev.is_none(), "generated a duplicate document id: {id}");
        tracing::debug!(%id, "document added");
        self.save()?;
        Ok(id)
    }

    /// Remove a document and purge its index references. Unknown ids are a
    /// no-op, not an error.
    pub fn remove_document(&mut self, id: &str) -> Result<()> {
        self.initialize()?;
        let Some(doc) = self.documents.remove(id) else {
            return Ok(());
        };
        self.index.remove_document(&doc.id, &doc.tokens);
        self.order.retain(|d| d != id);
        tracing::debug!(%id, "document removed");
        self.save()
    }

    /// Drop every document, the whole index, and the persisted collection.
    pub fn clear(&mut self) -> Result<()> {
        self.initialize()?;
        self.documents.clear();
        self.order.clear();
        self.index.clear();
        self.storage.delete_all()
    }

    pub fn count(&self) -> usize {
        self.documents.len()
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.get(id)
    }

    /// Live documents in insertion order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Document> {
        self.order.iter().filter_map(|id| self.documents.get(id))
    }

    pub(crate) fn index(&self) -> &InvertedIndex {
        &self.index
    }

    fn save(&mut self) -> Result<()> {
        let records: Vec<Document> = self.iter().cloned().collect();
        self.storage.save_documents(&records)
    }

    /// Seed the three demo documents shipped with the chat application.
    pub fn add_sample_documents(&mut self) -> Result<usize> {
        let samples: [(&str, &str, &str); 3] = [
            (
                "La inteligencia artificial está transformando la manera en que \
                 interactuamos con la tecnología. Desde asistentes virtuales hasta \
                 sistemas de recomendación, la IA está presente en muchas \
                 aplicaciones modernas.",
                "Introducción a la IA",
                "conocimiento general",
            ),
            (
                "Las Progressive Web Apps (PWA) combinan lo mejor de las \
                 aplicaciones web y móviles. Ofrecen experiencias similares a las \
                 apps nativas con la accesibilidad de la web.",
                "Qué son las PWA",
                "desarrollo web",
            ),
            (
                "El machine learning es un subcampo de la inteligencia artificial \
                 que se centra en el desarrollo de algoritmos que pueden aprender \
                 de los datos y hacer predicciones.",
                "Machine Learning Básico",
                "ciencia de datos",
            ),
        ];
        for (content, title, source) in samples {
            self.add_document(
                content,
                MetadataPatch {
                    title: Some(title.to_string()),
                    source: Some(source.to_string()),
                    ..Default::default()
                },
            )?;
        }
        Ok(samples.len())
    }
}

fn generate_id() -> DocumentId {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(char::from)
        .collect();
    format!("doc_{millis}_{suffix}")
}
