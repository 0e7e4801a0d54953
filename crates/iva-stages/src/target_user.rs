use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use iva_core::{Stage, StageContext, StageError, StageId, StageResult};

use crate::generator::TextGenerator;
use crate::{generation_error, parse_completion, prompts, to_result};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserSegment {
    segment: String,
    description: String,
    #[serde(default)]
    pain_points: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TargetUserOutput {
    target_users: Vec<UserSegment>,
    #[serde(default)]
    pain_points: Vec<String>,
}

pub struct TargetUserStage {
    generator: Arc<dyn TextGenerator>,
}

impl TargetUserStage {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

impl Stage for TargetUserStage {
    fn id(&self) -> StageId {
        StageId::TargetUser
    }

    fn execute(&self, ctx: &StageContext<'_>) -> Result<StageResult, StageError> {
        let prompt = prompts::render(self.id(), ctx)?;
        let raw = self.generator.generate(&prompt).map_err(generation_error)?;
        let output: TargetUserOutput = parse_completion(&raw)?;

        if output.target_users.is_empty() {
            return Err(StageError::MalformedResponse(
                "completion named no user segments".to_string(),
            ));
        }
        to_result(&output)
    }

    fn fallback(&self) -> StageResult {
        StageResult::from_value(json!({
            "target_users": [],
            "pain_points": [],
        }))
    }
}
