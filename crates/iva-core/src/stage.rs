//! Stage contract: the single interface every analysis stage satisfies.
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::StageContext;
use crate::data_model::StageResult;

/// Identifier of one fixed pipeline position.
///
/// Declaration order is execution order: later stages read earlier
/// stages' output, so `ORDERED` is walked as-is on every run and the
/// derived `Ord` follows pipeline position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    Summary,
    TargetUser,
    MarketAnalysis,
    Strategy,
    Scoring,
}

impl StageId {
    /// Registry walk order, fixed for every run.
    pub const ORDERED: [StageId; 5] = [
        StageId::Summary,
        StageId::TargetUser,
        StageId::MarketAnalysis,
        StageId::Strategy,
        StageId::Scoring,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageId::Summary => "summary",
            StageId::TargetUser => "target_user",
            StageId::MarketAnalysis => "market_analysis",
            StageId::Strategy => "strategy",
            StageId::Scoring => "scoring",
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contract of a single analysis stage.
///
/// `execute` may reach a remote model and is allowed to fail;
/// `fallback` must always produce a well-formed neutral result without
/// external calls, shaped identically to a real one. The engine never
/// inspects a stage beyond these methods.
pub trait Stage: Send + Sync {
    /// Pipeline position this stage is bound to.
    fn id(&self) -> StageId;

    /// Runs the analysis against the given context.
    fn execute(&self, ctx: &StageContext<'_>) -> Result<StageResult, StageError>;

    /// Neutral substitute result used when `execute` fails.
    fn fallback(&self) -> StageResult;
}

/// Recoverable failure of one stage invocation. Caught by the engine,
/// never propagated to the caller.
#[derive(Debug, Clone, Error)]
pub enum StageError {
    #[error("STAGE/UPSTREAM: {0}")]
    Upstream(String),

    #[error("STAGE/TIMEOUT: {0}")]
    Timeout(String),

    #[error("STAGE/MALFORMED: {0}")]
    MalformedResponse(String),

    #[error("STAGE/EXEC: {0}")]
    ExecutionFailed(String),
}
