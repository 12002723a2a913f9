//! Stage Registry: the ordered, read-only list of stages a board groups by.
//!
//! Stages are fixed for the life of the process. Changing them is a
//! deployment concern (`DEAL_STAGES` / `JOB_STAGES`), never a runtime one.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub id: String,
    pub name: String,
    pub display_color: String,
}

impl Stage {
    pub fn new(id: &str, name: &str, display_color: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            display_color: display_color.to_string(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum StageError {
    #[error("stage registry must contain at least one stage")]
    Empty,

    #[error("malformed stage entry '{0}', expected id:Name:#color")]
    Malformed(String),

    #[error("duplicate stage id '{0}'")]
    DuplicateId(String),
}

const DEFAULT_DEAL_STAGES: &[(&str, &str, &str)] = &[
    ("lead", "Lead", "#94a3b8"),
    ("qualified", "Qualified", "#3b82f6"),
    ("proposal", "Proposal", "#8b5cf6"),
    ("negotiation", "Negotiation", "#f59e0b"),
    ("closed_won", "Closed Won", "#22c55e"),
    ("closed_lost", "Closed Lost", "#ef4444"),
];

const DEFAULT_JOB_STAGES: &[(&str, &str, &str)] = &[
    ("sourcing", "Sourcing", "#94a3b8"),
    ("screening", "Screening", "#3b82f6"),
    ("interviewing", "Interviewing", "#8b5cf6"),
    ("offer", "Offer", "#f59e0b"),
    ("hired", "Hired", "#22c55e"),
    ("on_hold", "On Hold", "#64748b"),
];

/// Ordered sequence of stages. Cloning shares the underlying list.
#[derive(Debug, Clone)]
pub struct StageRegistry {
    stages: Arc<[Stage]>,
}

impl StageRegistry {
    pub fn new(stages: Vec<Stage>) -> Result<Self, StageError> {
        if stages.is_empty() {
            return Err(StageError::Empty);
        }
        let mut seen = HashSet::new();
        for stage in &stages {
            if !seen.insert(stage.id.as_str()) {
                return Err(StageError::DuplicateId(stage.id.clone()));
            }
        }
        Ok(Self {
            stages: stages.into(),
        })
    }

    /// Parses `id:Name:#color` entries separated by commas.
    pub fn parse(raw: &str) -> Result<Self, StageError> {
        let stages = raw
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let parts: Vec<&str> = entry.splitn(3, ':').map(str::trim).collect();
                match parts.as_slice() {
                    [id, name, color]
                        if !id.is_empty() && !name.is_empty() && color.starts_with('#') =>
                    {
                        Ok(Stage::new(id, name, color))
                    }
                    _ => Err(StageError::Malformed(entry.to_string())),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(stages)
    }

    pub fn default_deals() -> Self {
        Self::from_table(DEFAULT_DEAL_STAGES)
    }

    pub fn default_jobs() -> Self {
        Self::from_table(DEFAULT_JOB_STAGES)
    }

    fn from_table(table: &[(&str, &str, &str)]) -> Self {
        Self {
            stages: table
                .iter()
                .map(|(id, name, color)| Stage::new(id, name, color))
                .collect(),
        }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stage> {
        self.stages.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }
}

/// The registries for every board the service hosts.
#[derive(Debug, Clone)]
pub struct Registries {
    pub deals: StageRegistry,
    pub jobs: StageRegistry,
}

impl Default for Registries {
    fn default() -> Self {
        Self {
            deals: StageRegistry::default_deals(),
            jobs: StageRegistry::default_jobs(),
        }
    }
}
