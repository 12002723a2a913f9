//! Generic CRUD handlers, instantiated once per entity type in `build_router`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::errors::AppError;
use crate::resources::{Patch, Resource, ResourceCollection, ScopeParams};
use crate::state::{AppState, HasStore};
use crate::validation::{validate, FormRules, PatchKind};

/// GET /api/v1/{resource}
/// Fetches from the backend and returns the collection. A failed fetch is
/// reported in `error`, not as an HTTP failure; requesting again is the retry.
pub async fn handle_list<T>(
    State(state): State<AppState>,
    Query(scope): Query<ScopeParams>,
) -> Json<ResourceCollection<T>>
where
    T: Resource,
    AppState: HasStore<T>,
{
    let store = HasStore::<T>::store(&state);
    store.fetch_all(&scope).await;
    Json(store.snapshot().await)
}

/// GET /api/v1/{resource}/state
pub async fn handle_state<T>(State(state): State<AppState>) -> Json<ResourceCollection<T>>
where
    T: Resource,
    AppState: HasStore<T>,
{
    Json(HasStore::<T>::store(&state).snapshot().await)
}

/// DELETE /api/v1/{resource}/state
/// Drops the cached collection; a fetch still in flight will not land.
pub async fn handle_reset<T>(State(state): State<AppState>) -> StatusCode
where
    T: Resource,
    AppState: HasStore<T>,
{
    HasStore::<T>::store(&state).reset().await;
    StatusCode::NO_CONTENT
}

/// DELETE /api/v1/{resource}/state/error
pub async fn handle_clear_error<T>(State(state): State<AppState>) -> StatusCode
where
    T: Resource,
    AppState: HasStore<T>,
{
    HasStore::<T>::store(&state).clear_error().await;
    StatusCode::NO_CONTENT
}

/// POST /api/v1/{resource}
pub async fn handle_create<T>(
    State(state): State<AppState>,
    Json(patch): Json<Patch>,
) -> Result<(StatusCode, Json<T>), AppError>
where
    T: Resource + FormRules,
    AppState: HasStore<T>,
{
    validate::<T>(&patch, PatchKind::Create, &state.registries).map_err(AppError::Validation)?;
    let record = HasStore::<T>::store(&state).create(patch).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /api/v1/{resource}/:id
pub async fn handle_update<T>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<Patch>,
) -> Result<Json<T>, AppError>
where
    T: Resource + FormRules,
    AppState: HasStore<T>,
{
    validate::<T>(&patch, PatchKind::Update, &state.registries).map_err(AppError::Validation)?;
    let record = HasStore::<T>::store(&state).update(&id, patch).await?;
    Ok(Json(record))
}

/// DELETE /api/v1/{resource}/:id
pub async fn handle_delete<T>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError>
where
    T: Resource,
    AppState: HasStore<T>,
{
    HasStore::<T>::store(&state).delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
