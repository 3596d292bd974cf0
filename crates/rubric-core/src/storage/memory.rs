use super::{sort_window, ResultStore};
use crate::errors::EvalError;
use crate::model::EvaluationResult;
use chrono::{DateTime, Utc};
use std::sync::Mutex;

/// Process-local store for tests and single-shot CLI sessions.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<EvaluationResult>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultStore for MemoryStore {
    fn save(&self, result: &EvaluationResult) -> Result<(), EvalError> {
        self.rows.lock().unwrap().push(result.clone());
        Ok(())
    }

    fn query_by_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<EvaluationResult>, EvalError> {
        let mut hits: Vec<_> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.meta.evaluated_at >= start && r.meta.evaluated_at < end)
            .cloned()
            .collect();
        sort_window(&mut hits);
        Ok(hits)
    }
}
