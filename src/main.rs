use content_portal::{
    AppState,
    catalog::{CatalogState, DocumentCatalog},
    config::{AppConfig, Env},
    create_router,
    directory::{DirectoryState, HttpProfileDirectory, InMemoryProfileDirectory},
    models::Profile,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Profiles available through the `x-user-id` bypass when no identity provider is configured.
fn local_profiles() -> Vec<Profile> {
    vec![
        Profile {
            id: Uuid::from_u128(1),
            email: "member@localhost".to_string(),
            role: "member".to_string(),
        },
        Profile {
            id: Uuid::from_u128(2),
            email: "admin@localhost".to_string(),
            role: "admin".to_string(),
        },
    ]
}

/// main
///
/// Loads configuration, installs logging, builds the profile directory and the document
/// catalog, then serves the portal.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production secrets)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: pretty locally, JSON in production.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "content_portal=debug,tower_http=info".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Portal starting in {:?} mode", config.env);

    // 3. Identity: remote profile directory, or fixed local profiles.
    let directory: DirectoryState = match &config.profile_directory_url {
        Some(url) => {
            tracing::info!(%url, "using remote profile directory");
            Arc::new(HttpProfileDirectory::new(url))
        }
        None => {
            let profiles = local_profiles();
            for profile in &profiles {
                tracing::info!(id = %profile.id, role = %profile.role, "local profile available via x-user-id");
            }
            Arc::new(InMemoryProfileDirectory::new(profiles))
        }
    };

    // 4. Documents
    let catalog = match &config.document_seed_path {
        Some(path) => DocumentCatalog::from_seed_file(path)
            .unwrap_or_else(|error| panic!("FATAL: {error}")),
        None => DocumentCatalog::with_welcome(),
    };
    tracing::info!(documents = catalog.len(), "document catalog loaded");
    let catalog: CatalogState = Arc::new(catalog);

    // 5. Router and server
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState {
        directory,
        catalog,
        config,
    });

    let listener = TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|error| panic!("FATAL: cannot bind {bind_addr}: {error}"));
    tracing::info!("Listening on {bind_addr}");

    if let Err(error) = axum::serve(listener, app).await {
        tracing::error!(%error, "server stopped");
    }
}
