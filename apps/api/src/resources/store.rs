//! ResourceStore: confirm-then-apply state synchronization for one entity type.
//!
//! Local items are only touched after the backend has answered:
//! - `fetch_all` replaces `items` on success, records `error` on failure and
//!   always clears `loading`.
//! - `create` appends, `update` replaces in place, `delete` removes. On
//!   failure each records `error`, leaves `items` as they were and returns
//!   the error to the caller.
//!
//! Clones share one collection, so every handler sees the same state.
//! Mutations are queued per store so responses apply in the order the calls
//! were issued. Each fetch carries a generation number; a response that
//! arrives after a newer fetch or a `reset` is dropped.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::resources::api::{ApiError, Patch, ResourceApi, ScopeParams};
use crate::resources::Resource;

#[derive(Debug, Clone, Serialize)]
pub struct ResourceCollection<T> {
    pub items: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for ResourceCollection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

struct StoreState<T> {
    collection: ResourceCollection<T>,
    generation: u64,
}

pub struct ResourceStore<T> {
    api: Arc<dyn ResourceApi<T>>,
    state: Arc<RwLock<StoreState<T>>>,
    mutations: Arc<Mutex<()>>,
}

impl<T> Clone for ResourceStore<T> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            state: Arc::clone(&self.state),
            mutations: Arc::clone(&self.mutations),
        }
    }
}

impl<T: Resource> ResourceStore<T> {
    pub fn new(api: Arc<dyn ResourceApi<T>>) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(StoreState {
                collection: ResourceCollection::default(),
                generation: 0,
            })),
            mutations: Arc::new(Mutex::new(())),
        }
    }

    pub async fn fetch_all(&self, scope: &ScopeParams) {
        let generation = {
            let mut state = self.state.write().await;
            state.generation += 1;
            state.collection.loading = true;
            state.collection.error = None;
            state.generation
        };

        let result = self.api.get_all(scope).await;

        let mut state = self.state.write().await;
        if state.generation != generation {
            debug!(resource = T::NAME, generation, "Discarding stale fetch result");
            return;
        }
        match result {
            Ok(items) => {
                debug!(resource = T::NAME, count = items.len(), "Collection loaded");
                state.collection.items = items;
            }
            Err(e) => {
                warn!(resource = T::NAME, error = %e, "Fetch failed");
                state.collection.error = Some(e.to_string());
            }
        }
        state.collection.loading = false;
    }

    pub async fn create(&self, patch: Patch) -> Result<T, ApiError> {
        let _queued = self.mutations.lock().await;
        match self.api.create(&patch).await {
            Ok(record) => {
                debug!(resource = T::NAME, id = record.id(), "Created");
                self.state.write().await.collection.items.push(record.clone());
                Ok(record)
            }
            Err(e) => Err(self.fail("create", None, e).await),
        }
    }

    pub async fn update(&self, id: &str, patch: Patch) -> Result<T, ApiError> {
        let _queued = self.mutations.lock().await;
        match self.api.update(id, &patch).await {
            Ok(record) => {
                debug!(resource = T::NAME, id, "Updated");
                let mut state = self.state.write().await;
                if let Some(slot) = state.collection.items.iter_mut().find(|i| i.id() == id) {
                    *slot = record.clone();
                }
                Ok(record)
            }
            Err(e) => Err(self.fail("update", Some(id), e).await),
        }
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let _queued = self.mutations.lock().await;
        match self.api.delete(id).await {
            Ok(()) => {
                debug!(resource = T::NAME, id, "Deleted");
                self.state.write().await.collection.items.retain(|i| i.id() != id);
                Ok(())
            }
            Err(e) => Err(self.fail("delete", Some(id), e).await),
        }
    }

    async fn fail(&self, op: &str, id: Option<&str>, e: ApiError) -> ApiError {
        warn!(resource = T::NAME, op, id, error = %e, "Mutation failed");
        self.state.write().await.collection.error = Some(e.to_string());
        e
    }

    pub async fn snapshot(&self) -> ResourceCollection<T> {
        self.state.read().await.collection.clone()
    }

    pub async fn find(&self, id: &str) -> Option<T> {
        self.state
            .read()
            .await
            .collection
            .items
            .iter()
            .find(|i| i.id() == id)
            .cloned()
    }

    /// Derives a value from the current items without copying the collection.
    pub async fn select<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.state.read().await.collection.items)
    }

    pub async fn clear_error(&self) {
        self.state.write().await.collection.error = None;
    }

    /// Drops all local state and invalidates any fetch still in flight.
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        state.generation += 1;
        state.collection = ResourceCollection::default();
    }
}
