//! PipelineBoard: a stage registry, the store behind it, and the live drag
//! sessions of every client looking at the board.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::pipeline::drag::{DragEndReason, DragSensor, DragSession, DragState, HoverOutcome, StageReassigner};
use crate::pipeline::grouping::{group_by_stage, PipelineItem};
use crate::pipeline::stages::{Stage, StageRegistry};
use crate::resources::{Patch, Resource, ResourceStore, ScopeParams};

/// Backend field a stage move writes.
pub const STAGE_FIELD: &str = "stageId";

/// Sessions untouched for this long are dropped.
pub const DEFAULT_DRAG_SESSION_TTL: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardColumn<T> {
    pub stage: Stage,
    pub count: usize,
    pub total_amount: f64,
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot<T> {
    pub columns: Vec<BoardColumn<T>>,
    /// Items whose stage id is not in the registry. Never shown in a column.
    pub unassigned: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DragTicket {
    pub session_id: Uuid,
    pub state: DragState,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DragEnded {
    pub item_id: Option<String>,
    pub reason: DragEndReason,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartDragRequest {
    pub item_id: String,
    #[serde(default)]
    pub sensor: DragSensor,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoverRequest {
    pub stage_id: String,
}

#[derive(Debug, Deserialize)]
pub struct EndDragRequest {
    pub reason: DragEndReason,
}

struct LiveSession {
    session: Arc<Mutex<DragSession>>,
    last_seen: Instant,
}

type Sessions = Arc<Mutex<HashMap<Uuid, LiveSession>>>;

pub struct PipelineBoard<T> {
    registry: StageRegistry,
    store: ResourceStore<T>,
    sessions: Sessions,
    session_ttl: Duration,
}

impl<T> Clone for PipelineBoard<T> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            store: self.store.clone(),
            sessions: Arc::clone(&self.sessions),
            session_ttl: self.session_ttl,
        }
    }
}

/// Moving a card is an ordinary update of its stage field.
#[async_trait]
impl<T: Resource + PipelineItem> StageReassigner for ResourceStore<T> {
    async fn reassign(&self, item_id: &str, new_stage_id: &str) -> Result<(), AppError> {
        let mut patch = Patch::new();
        patch.insert(STAGE_FIELD.to_string(), Value::String(new_stage_id.to_string()));
        self.update(item_id, patch).await?;
        Ok(())
    }
}

impl<T: Resource + PipelineItem> PipelineBoard<T> {
    pub fn new(registry: StageRegistry, store: ResourceStore<T>) -> Self {
        Self {
            registry,
            store,
            sessions: Arc::new(Mutex::new(HashMap::new())),
            session_ttl: DEFAULT_DRAG_SESSION_TTL,
        }
    }

    /// Clients that never end a drag (closed tab, dropped connection) leave
    /// their session behind; it expires after `ttl` without activity.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn registry(&self) -> &StageRegistry {
        &self.registry
    }

    pub fn store(&self) -> &ResourceStore<T> {
        &self.store
    }

    pub async fn refresh(&self, scope: &ScopeParams) -> BoardSnapshot<T> {
        self.store.fetch_all(scope).await;
        self.snapshot().await
    }

    pub async fn snapshot(&self) -> BoardSnapshot<T> {
        let collection = self.store.snapshot().await;
        let groups = group_by_stage(&collection.items, &self.registry);

        if !groups.unassigned.is_empty() {
            warn!(
                resource = T::NAME,
                count = groups.unassigned.len(),
                "Items reference unknown stages; listing them as unassigned"
            );
        }

        let columns = groups
            .columns
            .iter()
            .map(|column| BoardColumn {
                stage: column.stage.clone(),
                count: column.items.len(),
                total_amount: column.total_amount(),
                items: column.items.iter().map(|item| (*item).clone()).collect(),
            })
            .collect();
        let unassigned = groups.unassigned.iter().map(|item| (*item).clone()).collect();

        BoardSnapshot {
            columns,
            unassigned,
            loading: collection.loading,
            error: collection.error,
        }
    }

    pub async fn start_drag(&self, item_id: &str, sensor: DragSensor) -> Result<DragTicket, AppError> {
        if self.store.find(item_id).await.is_none() {
            return Err(AppError::NotFound(format!("{} {item_id} not found", T::NAME)));
        }

        let mut session = DragSession::new();
        session.start(item_id, sensor);
        let state = session.state();

        let session_id = Uuid::new_v4();
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, live| now.duration_since(live.last_seen) < self.session_ttl);
        let expired = before - sessions.len();
        sessions.insert(
            session_id,
            LiveSession {
                session: Arc::new(Mutex::new(session)),
                last_seen: now,
            },
        );
        drop(sessions);

        if expired > 0 {
            info!(resource = T::NAME, expired, "Dropped abandoned drag sessions");
        }
        info!(resource = T::NAME, %session_id, item_id, ?sensor, "Drag started");

        Ok(DragTicket { session_id, state })
    }

    pub async fn hover(&self, session_id: Uuid, stage_id: &str) -> Result<HoverOutcome, AppError> {
        if !self.registry.contains(stage_id) {
            return Err(AppError::UnknownStage(stage_id.to_string()));
        }

        let session = self.session(session_id).await?;
        // Held across the reassignment so hovers within one session apply in order.
        let mut session = session.lock().await;
        let item_id = session.active_item_id().ok_or(AppError::DragNotActive)?;

        let current_stage = self
            .store
            .select(|items| {
                items
                    .iter()
                    .find(|item| item.id() == item_id)
                    .map(|item| item.stage_id().to_string())
            })
            .await
            .ok_or_else(|| AppError::NotFound(format!("{} {item_id} not found", T::NAME)))?;

        session.hover(stage_id, &current_stage, &self.store).await
    }

    pub async fn end_drag(&self, session_id: Uuid, reason: DragEndReason) -> Result<DragEnded, AppError> {
        let session = self
            .sessions
            .lock()
            .await
            .remove(&session_id)
            .map(|live| live.session)
            .ok_or_else(|| session_not_found(session_id))?;

        let item_id = session.lock().await.end(reason);
        info!(resource = T::NAME, %session_id, ?reason, "Drag session closed");
        Ok(DragEnded { item_id, reason })
    }

    pub async fn drag_state(&self, session_id: Uuid) -> Result<DragState, AppError> {
        let session = self.session(session_id).await?;
        let state = session.lock().await.state();
        Ok(state)
    }

    /// Looks up a live session and marks it as active.
    async fn session(&self, session_id: Uuid) -> Result<Arc<Mutex<DragSession>>, AppError> {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        let live = sessions
            .get_mut(&session_id)
            .ok_or_else(|| session_not_found(session_id))?;
        if now.duration_since(live.last_seen) >= self.session_ttl {
            sessions.remove(&session_id);
            return Err(session_not_found(session_id));
        }
        live.last_seen = now;
        Ok(Arc::clone(&live.session))
    }
}

fn session_not_found(session_id: Uuid) -> AppError {
    AppError::NotFound(format!("drag session {session_id} not found"))
}
