use chrono::Utc;
use std::{collections::BTreeMap, fs, path::Path, sync::Arc};

use crate::content::{Block, Document, Span};

/// CatalogError
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read document seed {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse document seed {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// DocumentCatalog
///
/// The read-only set of documents the portal serves, keyed by slug. Loaded once at
/// startup; editing happens in the client-side editor and is not persisted here.
#[derive(Debug, Clone, Default)]
pub struct DocumentCatalog {
    documents: BTreeMap<String, Document>,
}

/// CatalogState
pub type CatalogState = Arc<DocumentCatalog>;

impl DocumentCatalog {
    pub fn new(documents: impl IntoIterator<Item = Document>) -> Self {
        Self {
            documents: documents
                .into_iter()
                .map(|doc| (doc.slug.clone(), doc))
                .collect(),
        }
    }

    /// Load from a JSON array of documents. Later duplicates of a slug win.
    pub fn from_seed_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path_str = path.as_ref().display().to_string();
        let raw = fs::read_to_string(path.as_ref()).map_err(|source| CatalogError::Io {
            path: path_str.clone(),
            source,
        })?;
        let documents: Vec<Document> =
            serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
                path: path_str,
                source,
            })?;
        Ok(Self::new(documents))
    }

    /// The single document served when no seed file is configured.
    pub fn with_welcome() -> Self {
        Self::new([Document {
            slug: "welcome".to_string(),
            title: "Welcome".to_string(),
            blocks: vec![
                Block::Heading {
                    level: 1,
                    children: vec![Span::plain("Welcome to the portal")],
                },
                Block::Paragraph {
                    children: vec![
                        Span::plain("Sign in to read the library. "),
                        Span {
                            text: "Administrators".to_string(),
                            bold: true,
                            ..Span::default()
                        },
                        Span::plain(" can edit documents."),
                    ],
                },
            ],
            updated_at: Utc::now(),
        }])
    }

    pub fn get(&self, slug: &str) -> Option<&Document> {
        self.documents.get(slug)
    }

    /// All documents, ordered by slug.
    pub fn list(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
