use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use engine::persist::SledStorage;
use engine::search::{SearchOptions, SearchType};
use engine::store::DocumentStore;
use engine::{Document, MetadataPatch};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

const PREVIEW_LEN: usize = 150;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_min_score")]
    pub min_score: f32,
    #[serde(default = "default_semantic")]
    pub semantic: bool,
}
fn default_max_results() -> usize {
    5
}
fn default_min_score() -> f32 {
    0.3
}
fn default_semantic() -> bool {
    true
}

#[derive(Serialize)]
pub struct SearchBody {
    pub query: String,
    pub took_s: f64,
    pub total: usize,
    pub search_type: SearchType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    pub source: String,
    pub score: f32,
    pub matches: Vec<String>,
    pub preview: String,
}

#[derive(Deserialize)]
pub struct AddDocumentBody {
    pub content: String,
    #[serde(default)]
    pub metadata: MetadataPatch,
}

#[derive(Serialize)]
pub struct AddedBody {
    pub id: String,
}

#[derive(Serialize)]
pub struct CountBody {
    pub count: usize,
}

#[derive(Serialize)]
pub struct SeededBody {
    pub added: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<DocumentStore>>,
}

pub fn build_app(data_dir: &str) -> Result<Router> {
    let storage = SledStorage::open(data_dir)?;
    let mut store = DocumentStore::new(Box::new(storage));
    store.initialize()?;
    let state = AppState { store: Arc::new(RwLock::new(store)) };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods(Any)
                    .allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/documents", post(add_document).delete(clear_documents))
        .route("/documents/count", get(count_documents))
        .route("/documents/samples", post(seed_samples))
        .route("/documents/:id", get(get_document).delete(remove_document))
        .with_state(state)
        .layer(cors);
    Ok(app)
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchBody>, (StatusCode, String)> {
    let start = std::time::Instant::now();
    let options = SearchOptions {
        max_results: params.max_results,
        min_score: params.min_score,
        semantic: params.semantic,
    };
    let response = state.store.write().search(&params.q, &options).map_err(internal)?;
    let results = response
        .results
        .iter()
        .map(|r| SearchHit {
            id: r.id.clone(),
            title: r.document.metadata.title.clone(),
            source: r.document.metadata.source.clone(),
            score: r.score,
            matches: r.matches.clone(),
            preview: preview(&r.document.content, PREVIEW_LEN),
        })
        .collect();
    Ok(Json(SearchBody {
        query: response.query,
        took_s: start.elapsed().as_secs_f64(),
        total: response.total,
        search_type: response.search_type,
        message: response.message,
        results,
    }))
}

pub async fn add_document(
    State(state): State<AppState>,
    Json(body): Json<AddDocumentBody>,
) -> Result<(StatusCode, Json<AddedBody>), (StatusCode, String)> {
    let id = state
        .store
        .write()
        .add_document(&body.content, body.metadata)
        .map_err(internal)?;
    Ok((StatusCode::CREATED, Json(AddedBody { id })))
}

pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Document>, (StatusCode, String)> {
    let store = state.store.read();
    match store.get(&id) {
        Some(doc) => Ok(Json(doc.clone())),
        None => Err((StatusCode::NOT_FOUND, format!("no document with id {id}"))),
    }
}

pub async fn remove_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    state.store.write().remove_document(&id).map_err(internal)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_documents(
    State(state): State<AppState>,
) -> Result<StatusCode, (StatusCode, String)> {
    state.store.write().clear().map_err(internal)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn count_documents(State(state): State<AppState>) -> Json<CountBody> {
    let count = state.store.read().count();
    Json(CountBody { count })
}

pub async fn seed_samples(
    State(state): State<AppState>,
) -> Result<Json<SeededBody>, (StatusCode, String)> {
    let added = state.store.write().add_sample_documents().map_err(internal)?;
    Ok(Json(SeededBody { added }))
}

fn internal<E: std::fmt::Display>(err: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

fn preview(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }
    let cut: String = content.chars().take(max_chars).collect();
    format!("{cut}...")
}
