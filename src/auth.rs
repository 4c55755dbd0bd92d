use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    directory::{DirectoryError, DirectoryState},
    models::{Profile, Session},
};

/// Claims
///
/// The payload expected inside a bearer JWT. Signed with the shared portal secret.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the profile id looked up in the directory.
    pub sub: Uuid,
    pub exp: usize,
    pub iat: usize,
}

/// AuthError
///
/// Why a request could not be tied to a profile. Only ever logged; every variant ends
/// up as an anonymous session.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("no bearer token presented")]
    MissingToken,

    #[error("authorization header is not a bearer token")]
    MalformedHeader,

    #[error("token rejected: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("token subject {0} has no profile")]
    UnknownUser(Uuid),

    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// IdentityResolver Contract
///
/// Turns an optional bearer token into a settled session. Infallible by contract:
/// failures resolve to an anonymous session.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, token: Option<&str>) -> Session;
}

/// JwtIdentityResolver
///
/// Validates the token signature and expiry, then asks the directory for the subject's
/// current profile so a deleted user or a revoked admin role takes effect immediately.
#[derive(Clone)]
pub struct JwtIdentityResolver {
    directory: DirectoryState,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityResolver {
    pub fn new(secret: &str, directory: DirectoryState) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        Self {
            directory,
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub async fn authenticate(&self, token: Option<&str>) -> Result<Profile, AuthError> {
        let token = token.ok_or(AuthError::MissingToken)?;
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        let user_id = token_data.claims.sub;

        self.directory
            .get_profile(user_id)
            .await?
            .ok_or(AuthError::UnknownUser(user_id))
    }
}

#[async_trait]
impl IdentityResolver for JwtIdentityResolver {
    async fn resolve(&self, token: Option<&str>) -> Session {
        match self.authenticate(token).await {
            Ok(profile) => Session::for_profile(&profile),
            Err(AuthError::MissingToken) => Session::anonymous(),
            Err(error) => {
                tracing::warn!(%error, "identity resolution failed, continuing anonymously");
                Session::anonymous()
            }
        }
    }
}

/// bearer_token
///
/// `Ok(None)` when no Authorization header is present at all.
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(Some)
        .ok_or(AuthError::MalformedHeader)
}

/// resolve_session
///
/// Resolves the session for one request. The result is cached in the request extensions,
/// so nested layout boundaries and the handler all see the same snapshot and the
/// directory is consulted once.
///
/// In `Env::Local` an `x-user-id` header naming a known profile signs the request in
/// without a token.
pub async fn resolve_session<S>(parts: &mut Parts, state: &S) -> Session
where
    S: Send + Sync,
    DirectoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    if let Some(session) = parts.extensions.get::<Session>() {
        return session.clone();
    }

    let directory = DirectoryState::from_ref(state);
    let config = AppConfig::from_ref(state);

    let session = match local_bypass(&parts.headers, &config, &directory).await {
        Some(session) => session,
        None => {
            let resolver = JwtIdentityResolver::new(&config.jwt_secret, directory);
            match bearer_token(&parts.headers) {
                Ok(token) => resolver.resolve(token).await,
                Err(error) => {
                    tracing::warn!(%error, "identity resolution failed, continuing anonymously");
                    Session::anonymous()
                }
            }
        }
    };

    parts.extensions.insert(session.clone());
    session
}

async fn local_bypass(
    headers: &HeaderMap,
    config: &AppConfig,
    directory: &DirectoryState,
) -> Option<Session> {
    if config.env != Env::Local {
        return None;
    }
    let user_id = headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())?;

    // Unknown ids fall through to the token flow.
    match directory.get_profile(user_id).await {
        Ok(Some(profile)) => Some(Session::for_profile(&profile)),
        Ok(None) => None,
        Err(error) => {
            tracing::warn!(%error, %user_id, "local bypass lookup failed");
            None
        }
    }
}

/// Session Extractor
///
/// Never rejects: an unauthenticated request is a settled anonymous session, and the
/// layout boundaries decide what that means for the page.
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    DirectoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(resolve_session(parts, state).await)
    }
}
