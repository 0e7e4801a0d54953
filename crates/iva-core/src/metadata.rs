//! Run-level metadata attached to every composite report.
use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::data_model::{ErrorRecord, StageResult};
use crate::stage::StageId;

/// Confidence label used when the scoring stage produced none.
pub const DEFAULT_CONFIDENCE: &str = "Medium";

/// Statistics for one pipeline run.
///
/// The report schema presents each analysis stage as an "agent".
/// `partial_success` and the error records are the only externally
/// visible signal that a run was degraded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub agents_total: u32,
    pub agents_completed: u32,
    pub agents_failed: u32,
    pub partial_success: bool,
    pub confidence_level: String,
    pub elapsed_seconds: f64,
    pub errors: Vec<ErrorRecord>,
}

/// Computes run statistics from the finished result map and error
/// list. Clock-free: the caller supplies the measured duration.
pub fn build_metadata(
    results: &BTreeMap<StageId, StageResult>,
    errors: &[ErrorRecord],
    elapsed: Duration,
) -> RunMetadata {
    let total = StageId::ORDERED.len() as u32;
    let failed = errors.len() as u32;
    let confidence_level = results
        .get(&StageId::Scoring)
        .and_then(|r| r.get("confidence_level"))
        .and_then(|v| v.as_str())
        .unwrap_or(DEFAULT_CONFIDENCE)
        .to_string();

    RunMetadata {
        agents_total: total,
        agents_completed: total.saturating_sub(failed),
        agents_failed: failed,
        partial_success: failed > 0,
        confidence_level,
        elapsed_seconds: elapsed.as_secs_f64(),
        errors: errors.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn scoring_result(confidence: &str) -> BTreeMap<StageId, StageResult> {
        let mut results = BTreeMap::new();
        results.insert(
            StageId::Scoring,
            StageResult::from_value(json!({
                "score": 64.0,
                "confidence_level": confidence,
            })),
        );
        results
    }

    #[test]
    fn clean_run_counts() {
        let metadata = build_metadata(&scoring_result("High"), &[], Duration::from_millis(1500));
        assert_eq!(metadata.agents_total, 5);
        assert_eq!(metadata.agents_completed, 5);
        assert_eq!(metadata.agents_failed, 0);
        assert!(!metadata.partial_success);
        assert_eq!(metadata.confidence_level, "High");
        assert!((metadata.elapsed_seconds - 1.5).abs() < 1e-9);
    }

    #[test]
    fn failed_stages_flip_partial_success() {
        let errors = vec![
            ErrorRecord {
                stage: StageId::MarketAnalysis,
                message: "STAGE/UPSTREAM: model unreachable".to_string(),
                timestamp: Utc::now(),
            },
            ErrorRecord {
                stage: StageId::Strategy,
                message: "STAGE/MALFORMED: bad json".to_string(),
                timestamp: Utc::now(),
            },
        ];

        let metadata = build_metadata(&scoring_result("Low"), &errors, Duration::from_secs(3));
        assert_eq!(metadata.agents_completed, 3);
        assert_eq!(metadata.agents_failed, 2);
        assert!(metadata.partial_success);
        assert_eq!(metadata.errors.len(), 2);
    }

    #[test]
    fn missing_scoring_defaults_confidence() {
        let metadata = build_metadata(&BTreeMap::new(), &[], Duration::ZERO);
        assert_eq!(metadata.confidence_level, DEFAULT_CONFIDENCE);
        assert!(metadata.elapsed_seconds >= 0.0);
    }

    #[test]
    fn elapsed_tracks_injected_duration() {
        for millis in [0u64, 250, 90_000] {
            let metadata = build_metadata(&BTreeMap::new(), &[], Duration::from_millis(millis));
            assert!((metadata.elapsed_seconds - millis as f64 / 1000.0).abs() < 1e-9);
        }
    }
}
