//! Result merger: projects per-stage results into the flat report.
use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::data_model::StageResult;
use crate::stage::StageId;

/// Which stage owns each composite-report field.
const REPORT_FIELDS: &[(StageId, &str)] = &[
    (StageId::Summary, "summary"),
    (StageId::Summary, "core_value"),
    (StageId::TargetUser, "target_users"),
    (StageId::TargetUser, "pain_points"),
    (StageId::MarketAnalysis, "market_analysis"),
    (StageId::MarketAnalysis, "competitors"),
    (StageId::MarketAnalysis, "market_size"),
    (StageId::Strategy, "recommendations"),
    (StageId::Strategy, "differentiation"),
    (StageId::Strategy, "risks"),
    (StageId::Scoring, "score"),
    (StageId::Scoring, "score_breakdown"),
    (StageId::Scoring, "confidence_level"),
];

/// Flattens the per-stage results into the composite field map.
///
/// A field whose owning result is absent, or missing from that result,
/// is omitted rather than failing. No type validation happens here;
/// shape conformance is each stage's responsibility.
pub fn merge(results: &BTreeMap<StageId, StageResult>) -> Map<String, Value> {
    let mut fields = Map::new();
    for (owner, name) in REPORT_FIELDS {
        if let Some(value) = results.get(owner).and_then(|r| r.get(name)) {
            fields.insert((*name).to_string(), value.clone());
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_pulls_fields_from_owning_stage() {
        let mut results = BTreeMap::new();
        results.insert(
            StageId::Summary,
            StageResult::from_value(json!({
                "summary": "short",
                "core_value": "fast",
            })),
        );
        results.insert(
            StageId::Scoring,
            StageResult::from_value(json!({
                "score": 72.0,
                "confidence_level": "High",
            })),
        );

        let fields = merge(&results);
        assert_eq!(fields.get("summary"), Some(&json!("short")));
        assert_eq!(fields.get("score"), Some(&json!(72.0)));
        // scoring result had no breakdown, so the field is omitted
        assert!(!fields.contains_key("score_breakdown"));
    }

    #[test]
    fn merge_omits_fields_of_absent_stages() {
        let mut results = BTreeMap::new();
        results.insert(
            StageId::Summary,
            StageResult::from_value(json!({ "summary": "short" })),
        );

        let fields = merge(&results);
        assert!(fields.contains_key("summary"));
        assert!(!fields.contains_key("market_analysis"));
        assert!(!fields.contains_key("recommendations"));
    }

    #[test]
    fn merge_of_empty_map_is_empty() {
        assert!(merge(&BTreeMap::new()).is_empty());
    }
}
