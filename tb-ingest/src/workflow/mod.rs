//! Staged, resumable workflow
//!
//! - `storage`: checkpoint artifacts and the resolution journal
//! - `pipeline`: stage orchestration
//! - `report`: per-run summary

pub mod pipeline;
pub mod report;
pub mod storage;

pub use pipeline::{Pipeline, PipelineSettings};
pub use report::{ResolutionStats, RunReport, StageSource};
pub use storage::CheckpointStore;
