pub mod jsonl;
pub mod memory;

pub use jsonl::JsonlStore;
pub use memory::MemoryStore;

use crate::errors::EvalError;
use crate::model::EvaluationResult;
use chrono::{DateTime, Utc};

/// The persistence contract the engine needs from its surroundings: append
/// results, read a time window back. Everything else about storage is the
/// caller's concern.
pub trait ResultStore: Send + Sync {
    fn save(&self, result: &EvaluationResult) -> Result<(), EvalError>;

    /// Results with `evaluated_at` in `[start, end)`, ordered by timestamp
    /// then evaluation id so reads are stable.
    fn query_by_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<EvaluationResult>, EvalError>;
}

pub(crate) fn sort_window(results: &mut [EvaluationResult]) {
    results.sort_by(|a, b| {
        a.meta
            .evaluated_at
            .cmp(&b.meta.evaluated_at)
            .then_with(|| a.meta.evaluation_id.cmp(&b.meta.evaluation_id))
    });
}
