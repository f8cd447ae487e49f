use crate::document::DocumentId;
use std::collections::{HashMap, HashSet};

/// Maps each term to the set of ids of the documents containing it.
///
/// Maintained exclusively by `DocumentStore` mutations; a document id appears
/// under a term exactly when that term occurs in the document's token
/// sequence, and entries whose set drains empty are deleted.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    terms: HashMap<String, HashSet<DocumentId>>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every token of a document. Duplicate tokens collapse into the
    /// single per-term id set.
    pub(crate) fn add_document(&mut self, id: &DocumentId, tokens: &[String]) {
        for token in tokens {
            self.terms.entry(token.clone()).or_default().insert(id.clone());
        }
    }

    /// Drop every reference a document's tokens put into the index.
    pub(crate) fn remove_document(&mut self, id: &DocumentId, tokens: &[String]) {
        for token in tokens {
            if let Some(ids) = self.terms.get_mut(token) {
                ids.remove(id);
                if ids.is_empty() {
                    self.terms.remove(token);
                }
            }
        }
    }

    pub(crate) fn contains(&self, term: &str, id: &DocumentId) -> bool {
        self.terms.get(term).is_some_and(|ids| ids.contains(id))
    }

    pub(crate) fn clear(&mut self) {
        self.terms.clear();
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
