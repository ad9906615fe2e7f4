//! Unified API router for readlog
//!
//! Merges the reads router with the health probe, CORS and request tracing
//! into a single axum `Router`.
//!
//! ## Endpoint Map
//!
//! | Prefix              | Module | Description                          |
//! |---------------------|--------|--------------------------------------|
//! | `/health`           | api    | Health probe                         |
//! | `/`, `/post-read`   | reads  | Legacy list/create for the old UI    |
//! | `/api/v1/reads/*`   | reads  | Read CRUD, title search, statistics  |

use crate::reads::{reads_router, ReadsState};
use axum::{
    http::{header, Method},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the complete readlog HTTP application
///
/// Merges all module routers, adds CORS and trace middleware, and returns a
/// single `Router` ready to be served by `axum::serve`.
pub fn build_app(reads_state: ReadsState, cors_origins: &[String]) -> Router {
    let cors = build_cors(cors_origins);

    Router::new()
        .route("/health", get(health_check))
        .merge(reads_router(reads_state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

// =============================================================================
// Root handlers
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// CORS
// =============================================================================

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let parsed: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reads::ReadStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn make_app(origins: &[String]) -> (Router, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(ReadStore::new(dir.path().to_path_buf()).await.unwrap());
        let app = build_app(ReadsState::new(store, vec![2024]), origins);
        (app, dir)
    }

    #[tokio::test]
    async fn test_health_check() {
        let resp = health_check().await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_app_serves_health_and_reads() {
        let (app, _dir) = make_app(&[]).await;

        let resp = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/reads")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let (app, _dir) = make_app(&["http://localhost:5173".to_string()]).await;

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("origin", "http://localhost:5173")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            resp.headers()
                .get("access-control-allow-origin")
                .unwrap(),
            "http://localhost:5173"
        );
    }

    #[tokio::test]
    async fn test_cors_without_origins_allows_any() {
        let (app, _dir) = make_app(&[]).await;

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("origin", "https://reading.example.org")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            resp.headers()
                .get("access-control-allow-origin")
                .unwrap(),
            "*"
        );
    }
}
