use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// A partial record: only the fields being written.
pub type Patch = Map<String, Value>;

/// Query parameters narrowing a fetch (e.g. `entityType`, `entityId`).
pub type ScopeParams = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Invalid response body: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0}")]
    Transport(String),
}

/// The backend collaborator for one entity type.
///
/// Implementations are plain I/O: they never touch local state. Swap the
/// HTTP implementation for an in-memory one in tests.
#[async_trait]
pub trait ResourceApi<T>: Send + Sync {
    async fn get_all(&self, scope: &ScopeParams) -> Result<Vec<T>, ApiError>;

    async fn create(&self, patch: &Patch) -> Result<T, ApiError>;

    async fn update(&self, id: &str, patch: &Patch) -> Result<T, ApiError>;

    async fn delete(&self, id: &str) -> Result<(), ApiError>;
}
