use std::env;

use crate::models::Location;

/// AppConfig
///
/// Everything the portal reads from the environment, loaded once at startup and then
/// shared read-only through `AppState`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls the local identity bypass and log format.
    pub env: Env,
    // HMAC secret used to validate bearer JWTs.
    pub jwt_secret: String,
    // Base URL of the identity provider's profile endpoint. `None` means in-memory profiles.
    pub profile_directory_url: Option<String>,
    // Where every denied viewer is sent, whatever the reason.
    pub fallback_location: Location,
    pub bind_addr: String,
    // Optional JSON file seeding the document catalog.
    pub document_seed_path: Option<String>,
}

/// Env
///
/// Local enables the `x-user-id` bypass and pretty logs; Production demands real secrets.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Safe values for test state setup; reads nothing from the environment.
    fn default() -> Self {
        Self {
            env: Env::Local,
            jwt_secret: "super-secure-test-secret-value-local".to_string(),
            profile_directory_url: None,
            fallback_location: Location::default(),
            bind_addr: "127.0.0.1:3000".to_string(),
            document_seed_path: None,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// Panics when a variable required in production (`PORTAL_JWT_SECRET`,
    /// `PROFILE_DIRECTORY_URL`) is missing, so the portal never starts half-configured.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let fallback_location = env::var("FALLBACK_LOCATION")
            .map(Location::new)
            .unwrap_or_default();
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let document_seed_path = env::var("DOCUMENT_SEED_PATH").ok();

        match env {
            Env::Local => Self {
                env: Env::Local,
                jwt_secret: env::var("PORTAL_JWT_SECRET")
                    .unwrap_or_else(|_| "super-secure-test-secret-value-local".to_string()),
                profile_directory_url: env::var("PROFILE_DIRECTORY_URL").ok(),
                fallback_location,
                bind_addr,
                document_seed_path,
            },
            Env::Production => Self {
                env: Env::Production,
                jwt_secret: env::var("PORTAL_JWT_SECRET")
                    .expect("FATAL: PORTAL_JWT_SECRET must be set in production."),
                profile_directory_url: Some(
                    env::var("PROFILE_DIRECTORY_URL")
                        .expect("FATAL: PROFILE_DIRECTORY_URL required in prod"),
                ),
                fallback_location,
                bind_addr,
                document_seed_path,
            },
        }
    }
}
