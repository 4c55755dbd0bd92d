use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Screens open to everyone, signed in or not. Documents here are rendered statically:
/// no client-side editor is ever shipped to an anonymous visitor.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check.
        .route("/health", get(|| async { "ok" }))
        // GET /
        // Landing page and the fallback location for denied viewers.
        .route("/", get(handlers::landing))
        // GET /docs/{slug}
        // Static, server-only rendering of one document.
        .route("/docs/{slug}", get(handlers::public_document))
}
