use engine::persist::MemoryStorage;
use engine::store::DocumentStore;
use engine::{MetadataPatch, SearchOptions, SearchType};

fn store() -> DocumentStore {
    DocumentStore::new(Box::new(MemoryStorage::new()))
}

fn titled(title: &str) -> MetadataPatch {
    MetadataPatch {
        title: Some(title.to_string()),
        ..Default::default()
    }
}

fn keyword_options() -> SearchOptions {
    SearchOptions {
        semantic: false,
        ..Default::default()
    }
}

#[test]
fn semantic_search_finds_the_relevant_document() {
    let mut store = store();
    let id = store
        .add_document(
            "La inteligencia artificial está transformando la tecnología",
            titled("IA"),
        )
        .unwrap();

    let response = store.search("inteligencia", &SearchOptions::default()).unwrap();
    assert_eq!(response.search_type, SearchType::Semantic);
    assert!(!response.results.is_empty());
    assert_eq!(response.results[0].id, id);
    assert!(response.results[0].matches.contains(&"inteligencia".to_string()));
}

#[test]
fn empty_store_returns_no_results() {
    let mut store = store();
    let response = store.search("anything", &SearchOptions::default()).unwrap();
    assert!(response.results.is_empty());
    assert_eq!(response.total, 0);
}

#[test]
fn blank_query_short_circuits_with_guidance() {
    let mut store = store();
    store.add_document("contenido presente", MetadataPatch::default()).unwrap();
    let response = store.search("   ", &SearchOptions::default()).unwrap();
    assert!(response.results.is_empty());
    assert_eq!(response.total, 0);
    assert!(response.message.is_some());
}

#[test]
fn disjoint_documents_yield_a_single_match() {
    let mut store = store();
    let cats = store.add_document("gatos naranjas", titled("gatos")).unwrap();
    store.add_document("perros azules", titled("perros")).unwrap();

    let response = store.search("gatos", &SearchOptions::default()).unwrap();
    assert_eq!(response.total, 1);
    assert_eq!(response.results[0].id, cats);
}

#[test]
fn removed_document_is_no_longer_retrievable() {
    let mut store = store();
    let id = store.add_document("zanahorias crujientes", titled("huerta")).unwrap();
    store.remove_document(&id).unwrap();

    let options = SearchOptions {
        min_score: 0.0,
        ..Default::default()
    };
    let response = store.search("zanahorias", &options).unwrap();
    assert!(response.results.is_empty());

    let keyword = store.search("zanahorias", &keyword_options()).unwrap();
    assert!(keyword.results.is_empty());
}

#[test]
fn keyword_scoring_combines_membership_and_occurrences() {
    let mut store = store();
    let id = store.add_document("gato gato perro", titled("mascotas")).unwrap();

    let response = store.search("gato", &keyword_options()).unwrap();
    assert_eq!(response.total, 1);
    let result = &response.results[0];
    assert_eq!(result.id, id);
    // Membership 0.5 plus two literal occurrences at 0.1 each.
    assert!((result.score - 0.7).abs() < 1e-6);
    assert_eq!(result.matches, vec!["gato"]);
}

#[test]
fn keyword_scoring_is_clamped_to_one() {
    let mut store = store();
    store
        .add_document("sol sol sol sol sol sol sol sol sol sol sol sol", titled("sol"))
        .unwrap();
    let response = store.search("sol", &keyword_options()).unwrap();
    assert_eq!(response.results[0].score, 1.0);
}

#[test]
fn keyword_counts_substring_occurrences_case_insensitively() {
    let mut store = store();
    // "Gatos" contains "gato" as a substring; the token list does not.
    store.add_document("Gatos por todas partes", titled("plural")).unwrap();
    let options = SearchOptions {
        semantic: false,
        min_score: 0.0,
        ..Default::default()
    };
    let response = store.search("gato", &options).unwrap();
    assert_eq!(response.total, 1);
    let result = &response.results[0];
    assert!((result.score - 0.1).abs() < 1e-6);
    assert!(result.matches.is_empty());
}

#[test]
fn ranking_is_sorted_by_descending_score() {
    let mut store = store();
    let exact = store.add_document("gatos perros", titled("exacto")).unwrap();
    let partial = store.add_document("gatos", titled("parcial")).unwrap();
    let diluted = store.add_document("gatos perros aves", titled("diluido")).unwrap();

    let response = store.search("gatos perros", &SearchOptions::default()).unwrap();
    let ids: Vec<_> = response.results.iter().map(|r| r.id.clone()).collect();
    assert_eq!(ids, vec![exact, diluted, partial]);
    for pair in response.results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn equal_scores_keep_insertion_order() {
    let mut store = store();
    let first = store.add_document("gatos duermen mucho", titled("primero")).unwrap();
    let second = store.add_document("gatos duermen mucho", titled("segundo")).unwrap();

    let response = store.search("gatos", &SearchOptions::default()).unwrap();
    assert_eq!(response.total, 2);
    assert_eq!(response.results[0].id, first);
    assert_eq!(response.results[1].id, second);
}

#[test]
fn min_score_filters_and_max_results_truncates() {
    let mut store = store();
    for i in 0..8 {
        store
            .add_document("historias de gatos curiosos", titled(&format!("doc {i}")))
            .unwrap();
    }
    store.add_document("nada relacionado aquí", titled("ruido")).unwrap();

    let options = SearchOptions {
        max_results: 3,
        min_score: 0.4,
        semantic: true,
    };
    let response = store.search("gatos curiosos", &options).unwrap();
    assert!(response.results.len() <= 3);
    for result in &response.results {
        assert!(result.score >= 0.4);
    }
}

#[test]
fn scores_stay_within_bounds_for_both_strategies() {
    let mut store = store();
    store.add_document("inteligencia artificial aplicada", titled("uno")).unwrap();
    store.add_document("inteligencia inteligencia inteligencia", titled("dos")).unwrap();
    store.add_document("otra cosa distinta", titled("tres")).unwrap();

    let queries = ["inteligencia", "inteligencia artificial", "inteligencia inteligencia"];
    for query in queries {
        for semantic in [true, false] {
            let options = SearchOptions {
                min_score: 0.0,
                semantic,
                ..Default::default()
            };
            let response = store.search(query, &options).unwrap();
            for result in &response.results {
                assert!(result.score > 0.0 && result.score <= 1.0, "score {}", result.score);
            }
        }
    }
}

#[test]
fn repeated_long_query_terms_inflate_the_length_bonus() {
    let mut store = store();
    store.add_document("contenido sin relación alguna", titled("ajeno")).unwrap();

    let options = SearchOptions {
        min_score: 0.0,
        ..Default::default()
    };
    let single = store.search("inteligencia", &options).unwrap();
    let repeated = store.search("inteligencia inteligencia inteligencia", &options).unwrap();

    // Jaccard is zero for both; only the per-token bonus differs.
    let base = single.results[0].score;
    let inflated = repeated.results[0].score;
    assert!((base - 0.1).abs() < 1e-6);
    assert!((inflated - 0.3).abs() < 1e-6);
    assert!(single.results[0].matches.is_empty());
}

#[test]
fn keyword_search_scores_unique_terms_once() {
    let mut store = store();
    store.add_document("gato perezoso", titled("siesta")).unwrap();

    let once = store.search("gato", &keyword_options()).unwrap();
    let twice = store.search("gato gato", &keyword_options()).unwrap();
    assert!((once.results[0].score - twice.results[0].score).abs() < 1e-6);
}
