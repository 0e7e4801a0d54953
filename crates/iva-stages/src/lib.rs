//! IVA Stages: the five concrete analysis stages.
//!
//! Each stage renders a prompt from the accumulated context, asks the
//! text-generation collaborator for a completion, and shapes the JSON
//! answer into its own result. Every stage also carries a neutral
//! fallback so the engine can substitute it on failure.
//!
//! # Pipeline Flow
//!
//! ```text
//! Idea → Summary → TargetUser → MarketAnalysis → Strategy → Scoring
//!          ↓           ↓              ↓              ↓         ↓
//!        prompt      prompt         prompt         prompt    prompt
//!        + prior     + prior        + prior        + prior   + prior
//! ```

mod generator;
mod market_analysis;
mod prompts;
mod scoring;
mod strategy;
mod summary;
mod target_user;

pub use generator::{GeneratorConfig, GeneratorError, HttpTextGenerator, TextGenerator};
pub use market_analysis::MarketAnalysisStage;
pub use scoring::ScoringStage;
pub use strategy::StrategyStage;
pub use summary::SummaryStage;
pub use target_user::TargetUserStage;

use std::sync::Arc;

use iva_core::{StageError, StageRegistry, StageResult};

/// Wires the five stages, in pipeline order, around one shared text
/// generator.
pub fn default_registry(generator: Arc<dyn TextGenerator>) -> StageRegistry {
    StageRegistry::new()
        .register(Box::new(SummaryStage::new(generator.clone())))
        .register(Box::new(TargetUserStage::new(generator.clone())))
        .register(Box::new(MarketAnalysisStage::new(generator.clone())))
        .register(Box::new(StrategyStage::new(generator.clone())))
        .register(Box::new(ScoringStage::new(generator)))
}

// ============================================================================
// SHARED COMPLETION HANDLING
// ============================================================================

/// Strips a fenced markdown block if the completion is wrapped in one.
pub(crate) fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let inner = match trimmed.strip_prefix("```") {
        Some(inner) => inner,
        None => return trimmed,
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    inner.trim()
}

/// Parses a model completion into a typed stage output.
pub(crate) fn parse_completion<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, StageError> {
    serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| StageError::MalformedResponse(e.to_string()))
}

/// Serializes a typed stage output into the engine's result shape.
pub(crate) fn to_result<T: serde::Serialize>(output: &T) -> Result<StageResult, StageError> {
    let value =
        serde_json::to_value(output).map_err(|e| StageError::ExecutionFailed(e.to_string()))?;
    Ok(StageResult::from_value(value))
}

/// Maps a generator failure onto the stage error taxonomy.
pub(crate) fn generation_error(err: GeneratorError) -> StageError {
    match err {
        GeneratorError::Timeout(msg) => StageError::Timeout(msg),
        other => StageError::Upstream(other.to_string()),
    }
}

// ============================================================================
// TEST SUPPORT
// ============================================================================
