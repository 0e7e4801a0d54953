//! Scoring stage: overall score, breakdown, and confidence label.
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use iva_core::{Stage, StageContext, StageError, StageId, StageResult};

use crate::generator::TextGenerator;
use crate::{generation_error, parse_completion, prompts, to_result};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScoreBreakdown {
    problem_severity: f64,
    market_potential: f64,
    feasibility: f64,
    differentiation: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScoringOutput {
    score: f64,
    confidence_level: String,
    score_breakdown: ScoreBreakdown,
}

impl ScoringOutput {
    /// Clamps every score into the 0-100 band and normalizes the
    /// confidence label to High/Medium/Low.
    fn shaped(mut self) -> Self {
        self.score = self.score.clamp(0.0, 100.0);
        self.score_breakdown.problem_severity = self.score_breakdown.problem_severity.clamp(0.0, 100.0);
        self.score_breakdown.market_potential = self.score_breakdown.market_potential.clamp(0.0, 100.0);
        self.score_breakdown.feasibility = self.score_breakdown.feasibility.clamp(0.0, 100.0);
        self.score_breakdown.differentiation = self.score_breakdown.differentiation.clamp(0.0, 100.0);
        self.confidence_level = match self.confidence_level.trim().to_lowercase().as_str() {
            "high" => "High".to_string(),
            "low" => "Low".to_string(),
            _ => "Medium".to_string(),
        };
        self
    }
}

pub struct ScoringStage {
    generator: Arc<dyn TextGenerator>,
}

impl ScoringStage {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

impl Stage for ScoringStage {
    fn id(&self) -> StageId {
        StageId::Scoring
    }

    fn execute(&self, ctx: &StageContext<'_>) -> Result<StageResult, StageError> {
        let prompt = prompts::render(self.id(), ctx)?;
        let raw = self.generator.generate(&prompt).map_err(generation_error)?;
        let output: ScoringOutput = parse_completion(&raw)?;
        to_result(&output.shaped())
    }

    fn fallback(&self) -> StageResult {
        StageResult::from_value(json!({
            "score": 50.0,
            "confidence_level": "Medium",
            "score_breakdown": {
                "problem_severity": 50.0,
                "market_potential": 50.0,
                "feasibility": 50.0,
                "differentiation": 50.0,
            },
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{idea_fixture, StaticGenerator};
    use iva_core::FollowUpAnswers;
    use std::collections::BTreeMap;

    fn run_with(completion: serde_json::Value) -> Result<StageResult, StageError> {
        let stage = ScoringStage::new(Arc::new(StaticGenerator(completion.to_string())));
        let idea = idea_fixture();
        let answers = FollowUpAnswers::new();
        let ctx = StageContext::new(&idea, &answers, BTreeMap::new());
        stage.execute(&ctx)
    }

    #[test]
    fn clamps_out_of_band_scores() {
        let result = run_with(json!({
            "score": 140.0,
            "confidence_level": "High",
            "score_breakdown": {
                "problem_severity": -5.0,
                "market_potential": 90.0,
                "feasibility": 70.0,
                "differentiation": 60.0,
            },
        }))
        .unwrap();

        assert_eq!(result.get("score"), Some(&json!(100.0)));
        assert_eq!(
            result.get("score_breakdown").unwrap()["problem_severity"],
            json!(0.0)
        );
    }

    #[test]
    fn normalizes_the_confidence_label() {
        let result = run_with(json!({
            "score": 60.0,
            "confidence_level": "HIGH",
            "score_breakdown": {
                "problem_severity": 60.0,
                "market_potential": 60.0,
                "feasibility": 60.0,
                "differentiation": 60.0,
            },
        }))
        .unwrap();
        assert_eq!(result.get("confidence_level"), Some(&json!("High")));

        let result = run_with(json!({
            "score": 60.0,
            "confidence_level": "very sure",
            "score_breakdown": {
                "problem_severity": 60.0,
                "market_potential": 60.0,
                "feasibility": 60.0,
                "differentiation": 60.0,
            },
        }))
        .unwrap();
        assert_eq!(result.get("confidence_level"), Some(&json!("Medium")));
    }

    #[test]
    fn rejects_a_breakdown_with_missing_dimensions() {
        let err = run_with(json!({
            "score": 60.0,
            "confidence_level": "High",
            "score_breakdown": { "problem_severity": 60.0 },
        }))
        .unwrap_err();
        assert!(matches!(err, StageError::MalformedResponse(_)));
    }

    #[test]
    fn fallback_is_neutral_and_well_formed() {
        let stage = ScoringStage::new(Arc::new(StaticGenerator(String::new())));
        let fallback = stage.fallback();
        assert_eq!(fallback.get("score"), Some(&json!(50.0)));
        assert_eq!(fallback.get("confidence_level"), Some(&json!("Medium")));
        assert!(fallback.get("score_breakdown").is_some());
    }
}
