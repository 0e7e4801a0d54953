//! IVA Core: stage contract, pipeline engine, and report assembly.
//!
//! Five-stage analysis core over in-memory data: each stage consumes
//! the original idea plus every prior stage's output, and the engine
//! folds the outcomes into one composite report, substituting a
//! stage's fallback when its real computation fails.

pub mod context;
pub mod data_model;
pub mod error;
pub mod merge;
pub mod metadata;
pub mod registry;
pub mod runner;
pub mod stage;

pub use context::StageContext;
pub use data_model::{CompositeReport, ErrorRecord, FollowUpAnswers, Idea, StageResult};
pub use error::PipelineError;
pub use metadata::RunMetadata;
pub use registry::StageRegistry;
pub use runner::{AnalysisPipeline, RunAccumulator};
pub use stage::{Stage, StageError, StageId};

/// Version of the IVA engine
pub const IVA_VERSION: &str = "1.0.0";
