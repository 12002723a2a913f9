//! Drag session state machine.
//!
//! ```text
//! Idle --start--> Dragging --hover(other stage)--> Dragging --end--> Idle
//!                        \--hover(same stage)--/
//! ```
//!
//! A stage change is committed the moment the pointer (or keyboard focus)
//! crosses into another stage's container, not on drop. Ending the session
//! never reverts a committed move, and a failed reassignment is neither
//! retried nor rolled back. The session holds only the active item id and
//! the last hovered container, never item data.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DragSensor {
    #[default]
    Pointer,
    Keyboard,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DragEndReason {
    Drop,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DragState {
    Idle,
    #[serde(rename_all = "camelCase")]
    Dragging {
        active_item_id: String,
        sensor: DragSensor,
        over_stage_id: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum HoverOutcome {
    /// Hovered the container the item already sits in.
    Unchanged,
    #[serde(rename_all = "camelCase")]
    Moved {
        item_id: String,
        from_stage_id: String,
        to_stage_id: String,
    },
}

/// Side effect fired on every stage crossing.
#[async_trait]
pub trait StageReassigner: Send + Sync {
    async fn reassign(&self, item_id: &str, new_stage_id: &str) -> Result<(), AppError>;
}

#[derive(Debug, Default)]
pub struct DragSession {
    state: Option<Active>,
}

#[derive(Debug)]
struct Active {
    item_id: String,
    sensor: DragSensor,
    over_stage_id: Option<String>,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idle -> Dragging. Starting while already dragging replaces the
    /// active item, matching a fresh drag-start event.
    pub fn start(&mut self, item_id: &str, sensor: DragSensor) {
        if let Some(previous) = &self.state {
            debug!(previous = %previous.item_id, item_id, "Drag restarted");
        }
        self.state = Some(Active {
            item_id: item_id.to_string(),
            sensor,
            over_stage_id: None,
        });
    }

    pub fn active_item_id(&self) -> Option<&str> {
        self.state.as_ref().map(|a| a.item_id.as_str())
    }

    pub fn state(&self) -> DragState {
        match &self.state {
            None => DragState::Idle,
            Some(active) => DragState::Dragging {
                active_item_id: active.item_id.clone(),
                sensor: active.sensor,
                over_stage_id: active.over_stage_id.clone(),
            },
        }
    }

    /// Dragging -> Dragging. `current_stage_id` is where the active item sits
    /// right now in the backing collection.
    pub async fn hover(
        &mut self,
        over_stage_id: &str,
        current_stage_id: &str,
        reassigner: &dyn StageReassigner,
    ) -> Result<HoverOutcome, AppError> {
        let active = self.state.as_mut().ok_or(AppError::DragNotActive)?;
        active.over_stage_id = Some(over_stage_id.to_string());

        if over_stage_id == current_stage_id {
            return Ok(HoverOutcome::Unchanged);
        }

        reassigner.reassign(&active.item_id, over_stage_id).await?;
        debug!(
            item_id = %active.item_id,
            from = current_stage_id,
            to = over_stage_id,
            "Stage committed on hover"
        );

        Ok(HoverOutcome::Moved {
            item_id: active.item_id.clone(),
            from_stage_id: current_stage_id.to_string(),
            to_stage_id: over_stage_id.to_string(),
        })
    }

    /// Dragging -> Idle. Returns the item that was being dragged.
    pub fn end(&mut self, reason: DragEndReason) -> Option<String> {
        let active = self.state.take()?;
        debug!(item_id = %active.item_id, ?reason, "Drag ended");
        Some(active.item_id)
    }
}
