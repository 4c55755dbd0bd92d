use axum::{
    Router,
    extract::{FromRef, Request, State},
    http::HeaderName,
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Authorization core.
pub mod guard;
pub mod identity;
pub mod layout;
pub mod models;
pub mod mount;
pub mod navigator;

// Collaborators: identity resolution, documents, configuration.
pub mod auth;
pub mod catalog;
pub mod config;
pub mod content;
pub mod directory;

// HTML delivery (Public, Authenticated, Admin).
pub mod handlers;
pub mod routes;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use catalog::{CatalogState, DocumentCatalog};
pub use config::AppConfig;
pub use directory::{DirectoryState, HttpProfileDirectory, InMemoryProfileDirectory};
pub use guard::{AuthGuard, DenialReason, GuardDecision, Rendered, decide};
pub use identity::{IdentityHandle, IdentitySource};
pub use layout::{Layout, LayoutStack};
pub use models::{Location, Policy, Session};
pub use navigator::{Navigator, RecordingNavigator};

/// AppState
///
/// Shared, immutable per-process state handed to every request.
#[derive(Clone)]
pub struct AppState {
    /// Where profiles (and therefore admin flags) are looked up.
    pub directory: DirectoryState,
    /// Documents served by the portal.
    pub catalog: CatalogState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for DirectoryState {
    fn from_ref(app_state: &AppState) -> DirectoryState {
        app_state.directory.clone()
    }
}

impl FromRef<AppState> for CatalogState {
    fn from_ref(app_state: &AppState) -> CatalogState {
        app_state.catalog.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// LayoutBoundary
///
/// State of one boundary middleware: the layout it enforces and the app state it needs
/// to resolve the session.
#[derive(Clone)]
struct LayoutBoundary {
    layout: Layout,
    state: AppState,
}

/// layout_boundary
///
/// Applies one `Layout` to every route below it.
///
/// The session is resolved (and cached for inner boundaries and the handler), then a fresh
/// `AuthGuard` decides. The inner service is only invoked on `Allowed`; on a denial the
/// guard's redirect lands in a per-request `RecordingNavigator` and becomes a
/// `303 See Other` to the fallback location, with nothing of the page rendered.
async fn layout_boundary(
    State(boundary): State<LayoutBoundary>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();
    let session = auth::resolve_session(&mut parts, &boundary.state).await;
    let request = Request::from_parts(parts, body);

    let navigator = Arc::new(RecordingNavigator::new());
    let mut guard = boundary.layout.guard(
        navigator.clone(),
        boundary.state.config.fallback_location.clone(),
    );

    let rendered = guard.render(&session, || next.run(request));
    guard.commit();

    match rendered {
        Rendered::Children(response) => response.await,
        Rendered::Placeholder => handlers::placeholder().into_response(),
        Rendered::Nothing => {
            let location = navigator
                .take_last()
                .unwrap_or_else(|| boundary.state.config.fallback_location.clone());
            Redirect::to(location.as_str()).into_response()
        }
    }
}

/// create_router
///
/// Assembles the three route groups behind their layout boundaries and adds the
/// request-id and tracing layers.
pub fn create_router(state: AppState) -> Router {
    let x_request_id = HeaderName::from_static("x-request-id");

    let authenticated_boundary = LayoutBoundary {
        layout: Layout::authenticated(),
        state: state.clone(),
    };
    let admin_boundary = LayoutBoundary {
        layout: Layout::admin(),
        state: state.clone(),
    };

    let base_router = Router::new()
        // Public Routes: no boundary.
        .merge(public::public_routes())
        // Authenticated Routes: one boundary.
        .merge(authenticated::authenticated_routes().route_layer(
            middleware::from_fn_with_state(authenticated_boundary.clone(), layout_boundary),
        ))
        // Admin Routes: the admin boundary nested inside an authenticated one.
        // The last layer applied is the outermost.
        .nest(
            "/admin",
            admin::admin_routes()
                .route_layer(middleware::from_fn_with_state(
                    admin_boundary,
                    layout_boundary,
                ))
                .route_layer(middleware::from_fn_with_state(
                    authenticated_boundary,
                    layout_boundary,
                )),
        )
        .with_state(state);

    base_router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(trace_span_logger)
                    .on_response(
                        DefaultOnResponse::new()
                            .level(Level::INFO)
                            .latency_unit(tower_http::LatencyUnit::Millis),
                    ),
            )
            .layer(PropagateRequestIdLayer::new(x_request_id)),
    )
}

/// trace_span_logger
///
/// Span for one HTTP request, correlated by the `x-request-id` set above.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
