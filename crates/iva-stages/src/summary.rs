//! Summary stage: condenses the idea and its core value proposition.
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use iva_core::{Stage, StageContext, StageError, StageId, StageResult};

use crate::generator::TextGenerator;
use crate::{generation_error, parse_completion, prompts, to_result};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SummaryOutput {
    summary: String,
    core_value: String,
}

pub struct SummaryStage {
    generator: Arc<dyn TextGenerator>,
}

impl SummaryStage {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

impl Stage for SummaryStage {
    fn id(&self) -> StageId {
        StageId::Summary
    }

    fn execute(&self, ctx: &StageContext<'_>) -> Result<StageResult, StageError> {
        let prompt = prompts::render(self.id(), ctx)?;
        let raw = self.generator.generate(&prompt).map_err(generation_error)?;
        let output: SummaryOutput = parse_completion(&raw)?;

        if output.summary.trim().is_empty() {
            return Err(StageError::MalformedResponse(
                "completion contained an empty summary".to_string(),
            ));
        }
        to_result(&output)
    }

    fn fallback(&self) -> StageResult {
        StageResult::from_value(json!({
            "summary": "Summary unavailable",
            "core_value": "Not assessed",
        }))
    }
}
