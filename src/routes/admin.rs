use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Screens for administrators only, nested under `/admin`.
///
/// Access Control:
/// `create_router` wraps this router in two boundaries, `Layout::authenticated()`
/// outside `Layout::admin()`. Each evaluates the session on its own; the handlers only run
/// when both allow.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin
        // Document overview with edit links.
        .route("/", get(handlers::admin_dashboard))
        // GET /admin/docs/{slug}/edit
        // The full editor.
        .route("/docs/{slug}/edit", get(handlers::edit_document))
}
