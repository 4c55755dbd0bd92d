use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};
use uuid::Uuid;

use crate::models::Profile;

/// DirectoryError
///
/// Failures talking to the profile directory. They never reach a guard: the identity
/// resolver turns them into an anonymous session.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("profile directory request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("profile directory answered with status {0}")]
    Status(u16),
}

/// ProfileDirectory Contract
///
/// Looks up the profile (and therefore the role) behind a token subject.
/// `Ok(None)` means the directory answered and the user does not exist.
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, DirectoryError>;
}

/// DirectoryState
///
/// Shared handle to whichever directory implementation the process was configured with.
pub type DirectoryState = Arc<dyn ProfileDirectory>;

/// HttpProfileDirectory
///
/// Resolves profiles from the identity provider over HTTP: `GET {base_url}/profiles/{id}`.
/// A 404 is an unknown user, any other non-success status is an error.
#[derive(Clone)]
pub struct HttpProfileDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProfileDirectory {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ProfileDirectory for HttpProfileDirectory {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, DirectoryError> {
        let url = format!("{}/profiles/{}", self.base_url, id);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "profile lookup rejected");
            return Err(DirectoryError::Status(status.as_u16()));
        }

        Ok(Some(response.json::<Profile>().await?))
    }
}

/// InMemoryProfileDirectory
///
/// A fixed set of profiles. Used for local runs without an identity provider and in tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileDirectory {
    profiles: HashMap<Uuid, Profile>,
}

impl InMemoryProfileDirectory {
    pub fn new(profiles: impl IntoIterator<Item = Profile>) -> Self {
        Self {
            profiles: profiles.into_iter().map(|p| (p.id, p)).collect(),
        }
    }

    pub fn insert(&mut self, profile: Profile) {
        self.profiles.insert(profile.id, profile);
    }
}

#[async_trait]
impl ProfileDirectory for InMemoryProfileDirectory {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, DirectoryError> {
        Ok(self.profiles.get(&id).cloned())
    }
}
