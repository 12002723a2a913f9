#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::resources::Resource;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    pub assignee_id: Option<String>,
    /// Entity the task hangs off, e.g. "contact" / "deal".
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Task {
    const NAME: &'static str = "task";
    const PATH: &'static str = "tasks";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub body: String,
    pub author_id: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Comment {
    const NAME: &'static str = "comment";
    const PATH: &'static str = "comments";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A logged touchpoint with a client: call, meeting, email, note.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInteraction {
    pub id: String,
    pub kind: String,
    pub contact_id: Option<String>,
    pub summary: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for ClientInteraction {
    const NAME: &'static str = "client interaction";
    const PATH: &'static str = "interactions";

    fn id(&self) -> &str {
        &self.id
    }
}
