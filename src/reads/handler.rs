//! HTTP handlers for the Reads API
//!
//! - GET    /                         all reads (legacy frontend)
//! - POST   /post-read                create read (legacy frontend)
//! - GET    /api/v1/reads             all reads
//! - POST   /api/v1/reads             create read
//! - DELETE /api/v1/reads/:id         delete read
//! - GET    /api/v1/reads/search      title lookup
//! - GET    /api/v1/reads/stats       filtered working set statistics

use crate::dashboard::{ContentType, DashboardView, FilterState};
use crate::reads::store::ReadStore;
use crate::reads::types::*;
use crate::Error;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Shared state for read handlers
#[derive(Clone)]
pub struct ReadsState {
    pub store: Arc<ReadStore>,
    /// Years offered by the stats filter when the caller names none
    pub reading_years: Vec<i32>,
}

impl ReadsState {
    pub fn new(store: Arc<ReadStore>, reading_years: Vec<i32>) -> Self {
        Self {
            store,
            reading_years,
        }
    }
}

/// Create the reads router with all REST endpoints
pub fn reads_router(state: ReadsState) -> Router {
    Router::new()
        .route("/", get(list_reads))
        .route("/post-read", post(post_read))
        .route("/api/v1/reads", get(list_reads).post(create_read))
        .route("/api/v1/reads/search", get(search_reads))
        .route("/api/v1/reads/stats", get(get_stats))
        .route("/api/v1/reads/:id", delete(delete_read))
        .with_state(state)
}

// =============================================================================
// Query parameter types
// =============================================================================

#[derive(Debug, Deserialize)]
struct SearchQuery {
    q: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatsQuery {
    /// Comma-separated years; absent means every configured year
    years: Option<String>,
    /// Comma-separated content types; absent means both
    types: Option<String>,
}

impl StatsQuery {
    fn into_filter(self, reading_years: &[i32]) -> Result<FilterState, String> {
        let years = match self.years {
            Some(raw) => parse_list::<i32>(&raw).map_err(|e| format!("invalid year: {}", e))?,
            None => reading_years.to_vec(),
        };
        let types = match self.types {
            Some(raw) => parse_list::<ContentType>(&raw)?,
            None => ContentType::ALL.to_vec(),
        };
        Ok(FilterState::with_selection(
            reading_years.iter().copied(),
            years,
            types,
        ))
    }
}

fn parse_list<T>(raw: &str) -> Result<Vec<T>, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<T>().map_err(|e| e.to_string()))
        .collect()
}

// =============================================================================
// Handlers
// =============================================================================

/// GET / and GET /api/v1/reads
async fn list_reads(State(state): State<ReadsState>) -> impl IntoResponse {
    Json(state.store.list().await)
}

/// POST /post-read
async fn post_read(
    State(state): State<ReadsState>,
    Json(draft): Json<ReadDraft>,
) -> Response {
    match state.store.create(draft).await {
        Ok(read) => (
            StatusCode::CREATED,
            Json(PostReadResponse {
                message: "Read added successfully".to_string(),
                read,
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/v1/reads
async fn create_read(
    State(state): State<ReadsState>,
    Json(draft): Json<ReadDraft>,
) -> Response {
    match state.store.create(draft).await {
        Ok(read) => (StatusCode::CREATED, Json(read)).into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE /api/v1/reads/:id
async fn delete_read(State(state): State<ReadsState>, Path(id): Path<ReadId>) -> Response {
    match state.store.delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/v1/reads/search?q=
async fn search_reads(
    State(state): State<ReadsState>,
    Query(params): Query<SearchQuery>,
) -> impl IntoResponse {
    let query = params.q.unwrap_or_default();
    Json(state.store.search_titles(&query).await)
}

/// GET /api/v1/reads/stats?years=&types=
async fn get_stats(State(state): State<ReadsState>, Query(params): Query<StatsQuery>) -> Response {
    let filter = match params.into_filter(&state.reading_years) {
        Ok(filter) => filter,
        Err(message) => {
            return (StatusCode::BAD_REQUEST, Json(ApiError::bad_request(message))).into_response()
        }
    };
    let records = state.store.list().await;
    Json(DashboardView::compute(&records, &filter)).into_response()
}

fn error_response(err: Error) -> Response {
    let (status, body) = match &err {
        Error::Validation(message) => (StatusCode::BAD_REQUEST, ApiError::bad_request(message)),
        Error::NotFound(_) => (StatusCode::NOT_FOUND, ApiError::not_found(err.to_string())),
        _ => {
            tracing::error!("Read store failure: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::internal(err.to_string()),
            )
        }
    };
    (status, Json(body)).into_response()
}
