use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::Utc;
use content_portal::{
    AppState, create_router,
    auth::Claims,
    catalog::DocumentCatalog,
    config::{AppConfig, Env},
    content::{Block, Document, Span},
    directory::InMemoryProfileDirectory,
    models::{Location, Profile},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::{sync::Arc, time::SystemTime};
use tower::ServiceExt;
use uuid::Uuid;

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "router-test-secret";
const MEMBER_ID: Uuid = Uuid::from_u128(1);
const ADMIN_ID: Uuid = Uuid::from_u128(2);

fn app() -> axum::Router {
    app_with(AppConfig {
        env: Env::Production,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    })
}

fn app_with(config: AppConfig) -> axum::Router {
    let directory = InMemoryProfileDirectory::new([
        Profile {
            id: MEMBER_ID,
            email: "member@example.com".to_string(),
            role: "member".to_string(),
        },
        Profile {
            id: ADMIN_ID,
            email: "admin@example.com".to_string(),
            role: "admin".to_string(),
        },
    ]);
    let catalog = DocumentCatalog::new([Document {
        slug: "handbook".to_string(),
        title: "Handbook".to_string(),
        blocks: vec![Block::Paragraph {
            children: vec![Span::plain("Internal handbook")],
        }],
        updated_at: Utc::now(),
    }]);

    create_router(AppState {
        directory: Arc::new(directory),
        catalog: Arc::new(catalog),
        config,
    })
}

fn token_for(user_id: Uuid) -> String {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;
    let claims = Claims {
        sub: user_id,
        iat: now,
        exp: now + 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

fn get(uri: &str, user: Option<Uuid>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(user_id) = user {
        builder = builder.header(
            header::AUTHORIZATION,
            format!("Bearer {}", token_for(user_id)),
        );
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &axum::response::Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

// --- Public Routes ---

#[tokio::test]
async fn test_health_check() {
    let response = app().oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_public_document_is_static() {
    let response = app().oneshot(get("/docs/handbook", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Internal handbook"));
    assert!(!html.contains("data-editor"));
}

#[tokio::test]
async fn test_landing_lists_documents() {
    let html = body_text(app().oneshot(get("/", None)).await.unwrap()).await;
    assert!(html.contains(r#"href="/docs/handbook""#));
    assert!(html.contains("anonymously"));
}

#[tokio::test]
async fn test_unknown_document_is_not_found() {
    let response = app().oneshot(get("/docs/missing", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// --- Authenticated Routes ---

#[tokio::test]
async fn test_anonymous_library_visit_redirects_to_fallback() {
    let response = app()
        .oneshot(get("/library/handbook", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));
    assert!(body_text(response).await.is_empty());
}

#[tokio::test]
async fn test_member_reads_library_without_edit_affordances() {
    let response = app()
        .oneshot(get("/library/handbook", Some(MEMBER_ID)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains(r#"data-readonly="true""#));
    assert!(html.contains(r#"contenteditable="false""#));
}

#[tokio::test]
async fn test_profile_page_shows_session() {
    let response = app().oneshot(get("/me", Some(ADMIN_ID))).await.unwrap();
    let html = body_text(response).await;
    assert!(html.contains("admin@example.com"));
    assert!(html.contains("<dd>admin</dd>"));
}

// --- Admin Routes ---

#[tokio::test]
async fn test_member_is_redirected_from_admin() {
    for uri in ["/admin", "/admin/docs/handbook/edit"] {
        let response = app().oneshot(get(uri, Some(MEMBER_ID))).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), Some("/"));
    }
}

#[tokio::test]
async fn test_anonymous_is_redirected_from_admin() {
    let response = app()
        .oneshot(get("/admin/docs/handbook/edit", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_admin_gets_editor() {
    let response = app()
        .oneshot(get("/admin/docs/handbook/edit", Some(ADMIN_ID)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains(r#"contenteditable="true""#));
    assert!(html.contains("data-document="));
}

#[tokio::test]
async fn test_admin_dashboard_links_editor() {
    let html = body_text(
        app()
            .oneshot(get("/admin", Some(ADMIN_ID)))
            .await
            .unwrap(),
    )
    .await;
    assert!(html.contains("/admin/docs/handbook/edit"));
}

#[tokio::test]
async fn test_fallback_location_is_configurable() {
    let app = app_with(AppConfig {
        env: Env::Production,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        fallback_location: Location::new("/signed-out"),
        ..AppConfig::default()
    });

    let response = app.oneshot(get("/me", None)).await.unwrap();
    assert_eq!(location(&response), Some("/signed-out"));
}
