//! Error types for tb-ingest
//!
//! Per-recipe collaborator failures never surface here; the resolver turns
//! them into `FAILED` outcomes. These are the errors that end a run.

use crate::services::CatalogError;
use crate::types::ServiceError;
use thiserror::Error;

/// Run-ending pipeline error
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Trend discovery failed before any trending list was checkpointed
    #[error("Trend discovery failed: {0}")]
    TrendDiscovery(#[source] ServiceError),

    /// Checkpoint could not be read or written
    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] tb_common::Error),

    #[error("{0}")]
    Catalog(#[from] CatalogError),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
