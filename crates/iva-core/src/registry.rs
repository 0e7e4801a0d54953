//! Stage registry: binds each pipeline position to an implementation.
use std::collections::BTreeMap;

use crate::stage::{Stage, StageId};

/// Table from stage identifier to bound implementation, built once at
/// process start.
pub struct StageRegistry {
    stages: BTreeMap<StageId, Box<dyn Stage>>,
}

impl StageRegistry {
    pub fn new() -> Self {
        Self {
            stages: BTreeMap::new(),
        }
    }

    /// Binds a stage under its own identifier. A later registration
    /// for the same identifier replaces the earlier one.
    pub fn register(mut self, stage: Box<dyn Stage>) -> Self {
        self.stages.insert(stage.id(), stage);
        self
    }

    pub fn get(&self, id: StageId) -> Option<&dyn Stage> {
        self.stages.get(&id).map(|s| s.as_ref())
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::StageContext;
    use crate::data_model::StageResult;
    use crate::stage::StageError;

    struct NullStage(StageId);

    impl Stage for NullStage {
        fn id(&self) -> StageId {
            self.0
        }

        fn execute(&self, _ctx: &StageContext<'_>) -> Result<StageResult, StageError> {
            Ok(StageResult::new())
        }

        fn fallback(&self) -> StageResult {
            StageResult::new()
        }
    }

    #[test]
    fn register_keys_by_stage_id() {
        let registry = StageRegistry::new()
            .register(Box::new(NullStage(StageId::Summary)))
            .register(Box::new(NullStage(StageId::Scoring)));

        assert_eq!(registry.len(), 2);
        assert!(registry.get(StageId::Summary).is_some());
        assert!(registry.get(StageId::Strategy).is_none());
    }

    #[test]
    fn later_registration_replaces_earlier() {
        let registry = StageRegistry::new()
            .register(Box::new(NullStage(StageId::Summary)))
            .register(Box::new(NullStage(StageId::Summary)));

        assert_eq!(registry.len(), 1);
    }
}
