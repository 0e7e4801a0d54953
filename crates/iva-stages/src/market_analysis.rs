use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use iva_core::{Stage, StageContext, StageError, StageId, StageResult};

use crate::generator::TextGenerator;
use crate::{generation_error, parse_completion, prompts, to_result};

fn default_market_size() -> String {
    "Unknown".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MarketAnalysisOutput {
    market_analysis: String,
    #[serde(default)]
    competitors: Vec<String>,
    #[serde(default = "default_market_size")]
    market_size: String,
}

pub struct MarketAnalysisStage {
    generator: Arc<dyn TextGenerator>,
}

impl MarketAnalysisStage {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

impl Stage for MarketAnalysisStage {
    fn id(&self) -> StageId {
        StageId::MarketAnalysis
    }

    fn execute(&self, ctx: &StageContext<'_>) -> Result<StageResult, StageError> {
        let prompt = prompts::render(self.id(), ctx)?;
        let raw = self.generator.generate(&prompt).map_err(generation_error)?;
        let output: MarketAnalysisOutput = parse_completion(&raw)?;

        if output.market_analysis.trim().is_empty() {
            return Err(StageError::MalformedResponse(
                "completion contained an empty market analysis".to_string(),
            ));
        }
        to_result(&output)
    }

    fn fallback(&self) -> StageResult {
        StageResult::from_value(json!({
            "market_analysis": "Market analysis unavailable",
            "competitors": [],
            "market_size": "Unknown",
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{idea_fixture, StaticGenerator};
    use iva_core::FollowUpAnswers;
    use std::collections::BTreeMap;

    #[test]
    fn missing_market_size_defaults_to_unknown() {
        let stage = MarketAnalysisStage::new(Arc::new(StaticGenerator(
            json!({
                "market_analysis": "Fragmented informal charging shops",
                "competitors": ["Diesel charging shops"],
            })
            .to_string(),
        )));
        let idea = idea_fixture();
        let answers = FollowUpAnswers::new();
        let ctx = StageContext::new(&idea, &answers, BTreeMap::new());

        let result = stage.execute(&ctx).unwrap();
        assert_eq!(result.get("market_size"), Some(&json!("Unknown")));
    }

    #[test]
    fn fallback_matches_the_real_shape() {
        let stage = MarketAnalysisStage::new(Arc::new(StaticGenerator(String::new())));
        let fallback = stage.fallback();
        for field in ["market_analysis", "competitors", "market_size"] {
            assert!(fallback.get(field).is_some(), "missing field {field}");
        }
    }
}
