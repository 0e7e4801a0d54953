//! Stage context: the read-only bundle assembled for one invocation.
use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::data_model::{FollowUpAnswers, Idea, StageResult};
use crate::stage::StageId;

/// Input bundle for a single stage invocation.
///
/// Holds the original idea, the caller's follow-up answers, and the
/// result of every stage that already ran. Fallback substitutes are
/// included and indistinguishable by shape from real results. Built
/// fresh before each invocation and dropped when the stage returns.
#[derive(Debug, Clone)]
pub struct StageContext<'run> {
    idea: &'run Idea,
    answers: &'run FollowUpAnswers,
    prior: BTreeMap<StageId, &'run StageResult>,
}

impl<'run> StageContext<'run> {
    pub fn new(
        idea: &'run Idea,
        answers: &'run FollowUpAnswers,
        prior: BTreeMap<StageId, &'run StageResult>,
    ) -> Self {
        Self {
            idea,
            answers,
            prior,
        }
    }

    pub fn idea(&self) -> &Idea {
        self.idea
    }

    pub fn answers(&self) -> &FollowUpAnswers {
        self.answers
    }

    /// Result of an earlier stage, if it already ran.
    pub fn prior(&self, id: StageId) -> Option<&StageResult> {
        self.prior.get(&id).copied()
    }

    /// Identifiers with a result present, in pipeline order.
    pub fn prior_ids(&self) -> impl Iterator<Item = StageId> + '_ {
        self.prior.keys().copied()
    }

    /// Prior results as one JSON object keyed by stage identifier,
    /// for splicing the accumulated analysis into a prompt.
    pub fn prior_as_json(&self) -> Value {
        let mut map = Map::new();
        for (id, result) in &self.prior {
            map.insert(
                id.as_str().to_string(),
                Value::Object(result.fields().clone()),
            );
        }
        Value::Object(map)
    }
}
