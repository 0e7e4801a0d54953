use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use iva_core::{Stage, StageContext, StageError, StageId, StageResult};

use crate::generator::TextGenerator;
use crate::{generation_error, parse_completion, prompts, to_result};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StrategyOutput {
    recommendations: Vec<String>,
    differentiation: String,
    #[serde(default)]
    risks: Vec<String>,
}

pub struct StrategyStage {
    generator: Arc<dyn TextGenerator>,
}

impl StrategyStage {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

impl Stage for StrategyStage {
    fn id(&self) -> StageId {
        StageId::Strategy
    }

    fn execute(&self, ctx: &StageContext<'_>) -> Result<StageResult, StageError> {
        let prompt = prompts::render(self.id(), ctx)?;
        let raw = self.generator.generate(&prompt).map_err(generation_error)?;
        let output: StrategyOutput = parse_completion(&raw)?;

        if output.recommendations.is_empty() {
            return Err(StageError::MalformedResponse(
                "completion contained no recommendations".to_string(),
            ));
        }
        to_result(&output)
    }

    fn fallback(&self) -> StageResult {
        StageResult::from_value(json!({
            "recommendations": [],
            "differentiation": "Not assessed",
            "risks": [],
        }))
    }
}
