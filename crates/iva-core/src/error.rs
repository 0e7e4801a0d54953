//! Unified error model for the pipeline engine.
use thiserror::Error;

use crate::stage::StageId;

/// Fatal, configuration-class failures. Per-stage analysis errors are
/// recovered inside the engine and never surface here.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The fixed registry walk hit an identifier with no bound
    /// implementation. Indicates a broken deployment; aborts the run.
    #[error("REGISTRY/UNKNOWN_STAGE: no implementation bound for '{0}'")]
    UnknownStage(StageId),
}
