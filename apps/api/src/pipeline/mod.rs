// Pipeline Board Engine
// Stage registry, stable grouping, drag sessions with commit-on-hover.
// Item I/O goes through the resource stores. This module never calls the backend directly.

pub mod board;
pub mod drag;
pub mod grouping;
pub mod stages;

pub use board::PipelineBoard;
pub use stages::{Registries, StageRegistry};
