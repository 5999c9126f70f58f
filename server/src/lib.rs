use anyhow::{Context, Result};
use axum::{extract::State, routing::get, Json, Router};
use lazy_static::lazy_static;
use matcher::ingest::load_path;
use matcher::{RankedResult, SharedCorpus};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod error;

use error::AppError;

lazy_static! {
    static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[^A-Za-z0-9_.-]+").expect("valid regex");
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory holding one resume per `.txt` file; uploads land here too.
    pub resumes_dir: PathBuf,
    /// Results per list when the request does not say.
    pub default_k: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub corpus: Arc<SharedCorpus>,
    pub resumes_dir: PathBuf,
    pub default_k: usize,
}

impl AppState {
    /// Re-read the whole resume directory and swap in a freshly built corpus.
    pub fn reindex(&self) -> Result<()> {
        let ingested = load_path(&self.resumes_dir)
            .with_context(|| format!("reading {}", self.resumes_dir.display()))?;
        let corpus = self.corpus.rebuild(ingested.documents);
        if !corpus.is_indexed() {
            tracing::warn!(dir = %self.resumes_dir.display(), "no resumes found, search will not work");
        }
        Ok(())
    }
}

#[derive(Deserialize)]
pub struct SearchRequest {
    pub job_description: String,
    #[serde(default)]
    pub feedback_resume: Option<String>,
    #[serde(default)]
    pub k: Option<usize>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub job_description: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub feedback_resume: Option<String>,
    pub initial_results: Vec<SearchHit>,
    pub refined_results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub rank: usize,
    pub score: f32,
    pub document_id: String,
}

#[derive(Deserialize)]
pub struct UploadRequest {
    pub documents: Vec<UploadedFile>,
}

#[derive(Deserialize)]
pub struct UploadedFile {
    pub filename: String,
    pub text: String,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub accepted: Vec<String>,
    pub rejected: Vec<String>,
    pub num_docs: usize,
}

#[derive(Serialize)]
pub struct DocumentsResponse {
    pub num_docs: usize,
    pub vocabulary_size: usize,
    pub documents: Vec<String>,
}

pub fn build_app(config: ServerConfig) -> Result<Router> {
    std::fs::create_dir_all(&config.resumes_dir)?;
    let state = AppState {
        corpus: Arc::new(SharedCorpus::new()),
        resumes_dir: config.resumes_dir,
        default_k: config.default_k,
    };
    // Index everything once at startup
    state.reindex()?;

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", axum::routing::post(search_handler))
        .route("/documents", get(documents_handler).post(upload_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);
    Ok(app)
}

pub async fn search_handler(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    let start = std::time::Instant::now();
    if req.job_description.trim().is_empty() {
        return Err(AppError::Validation("job_description must not be empty".into()));
    }
    let k = req.k.unwrap_or(state.default_k).max(1);

    let outcome = state.corpus.search(&req.job_description, req.feedback_resume.as_deref())?;
    let total_hits = outcome.initial.len();
    tracing::info!(total_hits, refined = outcome.refined.is_some(), "search");

    let elapsed = start.elapsed();
    Ok(Json(SearchResponse {
        job_description: req.job_description,
        took_s: elapsed.as_secs_f64(),
        total_hits,
        feedback_resume: outcome.feedback,
        initial_results: hits(outcome.initial, k),
        refined_results: outcome.refined.map(|r| hits(r, k)).unwrap_or_default(),
    }))
}

fn hits(results: Vec<RankedResult>, k: usize) -> Vec<SearchHit> {
    results
        .into_iter()
        .take(k)
        .enumerate()
        .map(|(i, r)| SearchHit { rank: i + 1, score: r.score, document_id: r.document_id })
        .collect()
}

pub async fn documents_handler(State(state): State<AppState>) -> Json<DocumentsResponse> {
    let corpus = state.corpus.snapshot();
    Json(DocumentsResponse {
        num_docs: corpus.len(),
        vocabulary_size: corpus.vocabulary_size(),
        documents: corpus.documents().iter().map(|d| d.id.clone()).collect(),
    })
}

pub async fn upload_handler(
    State(state): State<AppState>,
    Json(req): Json<UploadRequest>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut accepted: Vec<String> = Vec::new();
    let mut rejected = Vec::new();
    let mut files: Vec<(String, String)> = Vec::new();
    for file in req.documents {
        match secure_filename(&file.filename).filter(|name| name.ends_with(".txt")) {
            // a later upload sanitizing to an already accepted name would overwrite it
            Some(name) if !accepted.contains(&name) => {
                accepted.push(name.clone());
                files.push((name, file.text));
            }
            _ => rejected.push(file.filename),
        }
    }
    if accepted.is_empty() {
        return Err(AppError::NoValidFiles);
    }
    tracing::info!(accepted = accepted.len(), rejected = rejected.len(), "resumes uploaded, re-indexing");

    let st = state.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        for (name, text) in files {
            std::fs::write(st.resumes_dir.join(&name), text.as_bytes())
                .with_context(|| format!("saving {name}"))?;
        }
        st.reindex()
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))??;

    Ok(Json(UploadResponse { accepted, rejected, num_docs: state.corpus.snapshot().len() }))
}

/// Strip path components and unsafe characters from an uploaded file name.
pub fn secure_filename(name: &str) -> Option<String> {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name);
    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(base.trim(), "_");
    let cleaned = cleaned.trim_start_matches(|c: char| c == '.' || c == '_');
    if cleaned.is_empty() || cleaned == "txt" { None } else { Some(cleaned.to_string()) }
}
