//! Pipeline engine: fixed-order stage walk with fallback substitution.
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::context::StageContext;
use crate::data_model::{CompositeReport, ErrorRecord, FollowUpAnswers, Idea, StageResult};
use crate::error::PipelineError;
use crate::merge;
use crate::metadata;
use crate::registry::StageRegistry;
use crate::stage::StageId;

/// State owned by a single `run` call.
///
/// Never shared across runs: concurrent runs each own one, so no
/// synchronization is needed.
#[derive(Debug)]
pub struct RunAccumulator {
    results: BTreeMap<StageId, StageResult>,
    errors: Vec<ErrorRecord>,
    started_at: DateTime<Utc>,
    started: Instant,
}

impl RunAccumulator {
    pub fn new() -> Self {
        Self {
            results: BTreeMap::new(),
            errors: Vec::new(),
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    /// Stores a stage's result, real or substitute, under its id.
    pub fn record_result(&mut self, id: StageId, result: StageResult) {
        self.results.insert(id, result);
    }

    /// Appends an error record for a failed stage. Recording the
    /// error and substituting the fallback are separate steps.
    pub fn record_error(&mut self, id: StageId, message: String) {
        self.errors.push(ErrorRecord {
            stage: id,
            message,
            timestamp: Utc::now(),
        });
    }

    pub fn results(&self) -> &BTreeMap<StageId, StageResult> {
        &self.results
    }

    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Borrowed view of the results so far, for the next stage's
    /// context.
    fn prior_view(&self) -> BTreeMap<StageId, &StageResult> {
        self.results.iter().map(|(id, r)| (*id, r)).collect()
    }
}

impl Default for RunAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives the ordered walk over the registry and assembles the
/// composite report.
pub struct AnalysisPipeline {
    registry: StageRegistry,
}

impl AnalysisPipeline {
    pub fn new(registry: StageRegistry) -> Self {
        Self { registry }
    }

    /// Runs all five stages against the idea and folds the outcomes
    /// into one composite report.
    ///
    /// A stage failure is recovered in place: the error is recorded
    /// and the stage's fallback feeds forward, so downstream stages
    /// always see a value for every earlier identifier. Only a
    /// registry gap aborts the run.
    pub fn run(
        &self,
        idea: &Idea,
        answers: &FollowUpAnswers,
    ) -> Result<CompositeReport, PipelineError> {
        let mut acc = RunAccumulator::new();
        let run_id = Uuid::new_v4();
        tracing::info!(%run_id, idea_id = %idea.id, "analysis run started");

        for id in StageId::ORDERED {
            let stage = self
                .registry
                .get(id)
                .ok_or(PipelineError::UnknownStage(id))?;

            let stage_started = Instant::now();
            // The context borrows the accumulator and is dropped as
            // soon as the stage returns.
            let outcome = {
                let ctx = StageContext::new(idea, answers, acc.prior_view());
                stage.execute(&ctx)
            };
            let elapsed_ms = stage_started.elapsed().as_millis() as u64;

            match outcome {
                Ok(result) => {
                    tracing::info!(stage = %id, elapsed_ms, "stage completed");
                    acc.record_result(id, result);
                }
                Err(err) => {
                    tracing::warn!(
                        stage = %id,
                        elapsed_ms,
                        error = %err,
                        "stage failed, substituting fallback"
                    );
                    acc.record_error(id, err.to_string());
                    acc.record_result(id, stage.fallback());
                }
            }
        }

        let fields = merge::merge(acc.results());
        let metadata = metadata::build_metadata(acc.results(), acc.errors(), acc.elapsed());
        tracing::info!(
            %run_id,
            completed = metadata.agents_completed,
            failed = metadata.agents_failed,
            elapsed_seconds = metadata.elapsed_seconds,
            "analysis run finished"
        );

        Ok(CompositeReport {
            run_id,
            idea: idea.clone(),
            generated_at: Utc::now(),
            fields,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_recording_is_independent_of_substitution() {
        let mut acc = RunAccumulator::new();
        acc.record_error(StageId::Strategy, "STAGE/EXEC: boom".to_string());
        assert!(acc.results().is_empty());
        assert_eq!(acc.errors().len(), 1);
        assert_eq!(acc.errors()[0].stage, StageId::Strategy);

        acc.record_result(
            StageId::Strategy,
            StageResult::from_value(json!({ "recommendations": [] })),
        );
        assert_eq!(acc.results().len(), 1);
    }

    #[test]
    fn prior_view_tracks_recorded_results() {
        let mut acc = RunAccumulator::new();
        acc.record_result(
            StageId::Summary,
            StageResult::from_value(json!({ "summary": "short" })),
        );
        acc.record_result(
            StageId::TargetUser,
            StageResult::from_value(json!({ "target_users": [] })),
        );

        let prior = acc.prior_view();
        assert_eq!(prior.len(), 2);
        assert!(prior.contains_key(&StageId::Summary));
        assert!(!prior.contains_key(&StageId::Scoring));
    }

    #[test]
    fn elapsed_is_non_negative() {
        let acc = RunAccumulator::new();
        assert!(acc.elapsed().as_secs_f64() >= 0.0);
        assert!(acc.started_at() <= Utc::now());
    }
}
