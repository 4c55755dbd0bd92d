use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Screens for any signed-in user. `create_router` wraps this router in a
/// `Layout::authenticated()` boundary; handlers here can rely on a present session.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /me
        // The signed-in user's profile.
        .route("/me", get(handlers::profile))
        // GET /library/{slug}
        // Client-side rendering with edit affordances disabled.
        .route("/library/{slug}", get(handlers::library_document))
}
