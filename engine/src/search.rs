use crate::document::{Document, DocumentId};
use crate::store::DocumentStore;
use crate::tokenizer::tokenize;
use anyhow::Result;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const MEMBERSHIP_BONUS: f32 = 0.5;
const OCCURRENCE_BONUS: f32 = 0.1;
const LONG_TERM_BONUS: f32 = 0.1;
const LONG_TERM_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Semantic,
    Keyword,
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Final ranked list is truncated to this many results.
    pub max_results: usize,
    /// Inclusive lower bound applied before truncation.
    pub min_score: f32,
    /// Jaccard-based scoring when true, keyword scoring otherwise.
    pub semantic: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self { max_results: 5, min_score: 0.3, semantic: true }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub id: DocumentId,
    pub document: Document,
    pub score: f32,
    /// Query terms found in the document, first-encounter order.
    pub matches: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub total: usize,
    pub search_type: SearchType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DocumentStore {
    /// Rank the live documents against a free-text query.
    ///
    /// A blank query short-circuits to an empty result list with a guidance
    /// message. Retrieval itself never fails; only initialization can, on
    /// its storage load.
    pub fn search(&mut self, query: &str, options: &SearchOptions) -> Result<SearchResponse> {
        self.initialize()?;
        let search_type = if options.semantic { SearchType::Semantic } else { SearchType::Keyword };

        if query.trim().is_empty() {
            return Ok(SearchResponse {
                query: query.to_string(),
                results: Vec::new(),
                total: 0,
                search_type,
                message: Some("Por favor ingresa un término de búsqueda".to_string()),
            });
        }

        let query_terms = tokenize(query);
        let mut results = match search_type {
            SearchType::Semantic => self.semantic_search(&query_terms),
            SearchType::Keyword => self.keyword_search(&query_terms),
        };

        results.retain(|r| r.score >= options.min_score);
        // Stable sort: equal scores keep insertion order.
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(options.max_results);

        let total = results.len();
        tracing::debug!(query, total, ?search_type, "search complete");
        Ok(SearchResponse {
            query: query.to_string(),
            results,
            total,
            search_type,
            message: None,
        })
    }

    /// Jaccard similarity over the deduplicated term sets, plus a bonus per
    /// long query token. The bonus iterates the raw token sequence: a
    /// repeated long term counts once per occurrence.
    fn semantic_search(&self, query_terms: &[String]) -> Vec<SearchResult> {
        let query_set: HashSet<&str> = query_terms.iter().map(String::as_str).collect();
        let unique_terms = dedup_preserving(query_terms);
        let length_bonus = query_terms
            .iter()
            .filter(|t| t.chars().count() > LONG_TERM_LEN)
            .count() as f32
            * LONG_TERM_BONUS;

        let mut results = Vec::new();
        for doc in self.iter() {
            let doc_set: HashSet<&str> = doc.tokens.iter().map(String::as_str).collect();
            let union = query_set.union(&doc_set).count();
            let score = if union == 0 {
                0.0
            } else {
                let intersection = query_set.intersection(&doc_set).count();
                let jaccard = intersection as f32 / union as f32;
                (jaccard + length_bonus).min(1.0)
            };
            if score > 0.0 {
                results.push(SearchResult {
                    id: doc.id.clone(),
                    document: doc.clone(),
                    score,
                    matches: self.find_matches(&unique_terms, doc),
                });
            }
        }
        results
    }

    /// Fixed bonus per unique query term present in the document's terms,
    /// plus a smaller bonus per literal occurrence in the raw content.
    fn keyword_search(&self, query_terms: &[String]) -> Vec<SearchResult> {
        let unique_terms = dedup_preserving(query_terms);
        let patterns: Vec<(&str, Regex)> = unique_terms
            .iter()
            .map(|term| (*term, literal_pattern(term)))
            .collect();

        let mut results = Vec::new();
        for doc in self.iter() {
            let mut score = 0.0f32;
            let mut matches = Vec::new();
            for (term, pattern) in &patterns {
                if self.index().contains(term, &doc.id) {
                    score += MEMBERSHIP_BONUS;
                    matches.push((*term).to_string());
                }
                let occurrences = pattern.find_iter(&doc.content).count();
                score += occurrences as f32 * OCCURRENCE_BONUS;
            }
            if score > 0.0 {
                results.push(SearchResult {
                    id: doc.id.clone(),
                    document: doc.clone(),
                    score: score.min(1.0),
                    matches,
                });
            }
        }
        results
    }

    fn find_matches(&self, unique_terms: &[&str], doc: &Document) -> Vec<String> {
        unique_terms
            .iter()
            .filter(|term| self.index().contains(term, &doc.id))
            .map(|term| term.to_string())
            .collect()
    }
}

fn dedup_preserving(terms: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    terms
        .iter()
        .map(String::as_str)
        .filter(|t| seen.insert(*t))
        .collect()
}

/// Case-insensitive literal matcher; the term is escaped and never acts as
/// a metacharacter.
fn literal_pattern(term: &str) -> Regex {
    RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
        .expect("valid regex")
}
