//! Data model: Idea, StageResult, ErrorRecord, CompositeReport.
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::metadata::RunMetadata;
use crate::stage::StageId;

/// User-submitted idea under analysis. Owned by the caller and only
/// read by the pipeline for the duration of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Idea {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub industry: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl Idea {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            industry: None,
            submitted_at: Utc::now(),
        }
    }

    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }
}

/// Follow-up answers keyed by question. May be empty.
pub type FollowUpAnswers = HashMap<String, String>;

/// Structured output of one stage: named fields mapped to JSON values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageResult(Map<String, Value>);

impl StageResult {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builds a result from any JSON value. Non-object values land
    /// under a single `value` field.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                Self(map)
            }
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Record of one recovered stage failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub stage: StageId,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Final merged report handed back to the caller.
///
/// The merged per-stage fields serialize flat next to `idea` and
/// `metadata`; a degraded run still yields the full field set, with
/// fallback values where a stage failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeReport {
    pub run_id: Uuid,
    /// Copy of the analyzed idea, kept for traceability.
    pub idea: Idea,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    pub metadata: RunMetadata,
}

impl CompositeReport {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}
