//! Grouping: stable, single-pass partition of pipeline items into stage columns.
//!
//! Columns follow registry order. Within a column, items keep the relative
//! order they had in the input. Items whose stage id is not in the registry
//! never land in a column; they are collected in `unassigned` instead so the
//! caller can decide how to surface them.

use std::collections::HashMap;

use crate::pipeline::stages::{Stage, StageRegistry};

/// Anything that can sit on a board.
pub trait PipelineItem {
    fn stage_id(&self) -> &str;

    /// Monetary value summed into the column total, if the item has one.
    fn amount(&self) -> Option<f64> {
        None
    }
}

#[derive(Debug)]
pub struct StageColumn<'a, T> {
    pub stage: &'a Stage,
    pub items: Vec<&'a T>,
}

impl<T: PipelineItem> StageColumn<'_, T> {
    pub fn total_amount(&self) -> f64 {
        self.items.iter().filter_map(|item| item.amount()).sum()
    }
}

#[derive(Debug)]
pub struct StageGroups<'a, T> {
    pub columns: Vec<StageColumn<'a, T>>,
    pub unassigned: Vec<&'a T>,
}

impl<'a, T> StageGroups<'a, T> {
    pub fn column(&self, stage_id: &str) -> Option<&StageColumn<'a, T>> {
        self.columns.iter().find(|c| c.stage.id == stage_id)
    }

    /// Items placed in a column (excludes `unassigned`).
    pub fn grouped_len(&self) -> usize {
        self.columns.iter().map(|c| c.items.len()).sum()
    }
}

/// O(n + s): one index build over the stages, one pass over the items.
pub fn group_by_stage<'a, T: PipelineItem>(
    items: &'a [T],
    registry: &'a StageRegistry,
) -> StageGroups<'a, T> {
    let index: HashMap<&str, usize> = registry
        .iter()
        .enumerate()
        .map(|(i, stage)| (stage.id.as_str(), i))
        .collect();

    let mut columns: Vec<StageColumn<'a, T>> = registry
        .iter()
        .map(|stage| StageColumn {
            stage,
            items: Vec::new(),
        })
        .collect();
    let mut unassigned = Vec::new();

    for item in items {
        match index.get(item.stage_id()) {
            Some(&i) => columns[i].items.push(item),
            None => unassigned.push(item),
        }
    }

    StageGroups {
        columns,
        unassigned,
    }
}
