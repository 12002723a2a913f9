//! Resource layer: per-entity stores synchronized with the CRM backend.
//!
//! Every entity type goes through `ResourceApi<T>` for I/O and is owned by a
//! single `ResourceStore<T>`. Nothing else mutates a collection.

pub mod api;
pub mod http;
pub mod store;

use serde::{de::DeserializeOwned, Serialize};

pub use api::{ApiError, Patch, ResourceApi, ScopeParams};
pub use http::{CrmHttp, HttpResourceApi};
pub use store::{ResourceCollection, ResourceStore};

/// An entity served by the CRM backend under `/{PATH}`.
pub trait Resource: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Singular name used in logs.
    const NAME: &'static str;
    /// Collection path segment on the backend and on this service.
    const PATH: &'static str;

    fn id(&self) -> &str;
}
