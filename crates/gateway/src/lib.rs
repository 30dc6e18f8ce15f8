//! # Parlor Gateway Crate
//!
//! HTTP and WebSocket surface for the chat relay: the `/ws` session
//! endpoint, multipart upload ingestion, stored-file serving, and a
//! liveness probe, assembled into one axum router.

pub mod error;
pub mod state;
pub mod upload;
pub mod websocket;

// Re-export main types for convenience
pub use error::{GatewayError, GatewayResult};
pub use state::GatewayState;
pub use upload::sanitize_filename;

use axum::{
    http::Method,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use parlor_bot::CompletionBackend;

/// Create the main application router with all routes
pub fn create_router<B: CompletionBackend>(state: GatewayState<B>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(websocket::chat_websocket_handler::<B>))
        .route("/upload", post(upload::upload_file::<B>))
        .route("/api/health", get(health))
        .nest_service("/files", ServeDir::new(&state.upload_dir))
        .with_state(state)
        .layer(cors)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use parlor_bot::GeminiClient;
    use parlor_chat::{ChatService, HistoryStore};
    use parlor_config::BotConfig;

    async fn test_router(dir: &TempDir) -> Router {
        let history = HistoryStore::load(dir.path().join("history.json")).await;
        let backend = GeminiClient::from_config(&BotConfig::default()).expect("client builds");
        let chat = Arc::new(ChatService::new(history, backend, Duration::ZERO));
        create_router(GatewayState::new(chat, dir.path().join("uploads")))
    }

    #[tokio::test]
    async fn test_health_route_responds() {
        let dir = TempDir::new().expect("tempdir");
        let app = test_router(&dir).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("request succeeds");

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_upload_without_file_part_is_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let app = test_router(&dir).await;

        let body = "--boundary\r\ncontent-disposition: form-data; name=\"room\"\r\n\r\npublic\r\n--boundary--\r\n";
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/upload")
                    .header(
                        "content-type",
                        "multipart/form-data; boundary=boundary",
                    )
                    .body(Body::from(body))
                    .expect("request builds"),
            )
            .await
            .expect("request succeeds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
