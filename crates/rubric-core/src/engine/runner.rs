use crate::errors::EvalError;
use crate::evaluator::Evaluator;
use crate::model::{
    round_score, BatchEvaluationResult, BatchItem, BatchOutcome, BatchSummary, EvaluationRequest,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Fans a batch out over the evaluator. Items run independently; one
/// failure never aborts the batch, it just becomes that item's outcome.
pub struct BatchRunner {
    evaluator: Arc<Evaluator>,
    /// In-flight cap; `None` dispatches everything at once. Callers talking
    /// to a rate-limited judge should set one.
    concurrency: Option<usize>,
}

impl BatchRunner {
    pub fn new(evaluator: Arc<Evaluator>) -> Self {
        Self {
            evaluator,
            concurrency: None,
        }
    }

    pub fn with_concurrency(mut self, concurrency: Option<usize>) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Evaluate all requests, preserving input order in the returned item
    /// list no matter how completions interleave: each task carries its
    /// index and writes into a pre-sized slot vector.
    ///
    /// Cancellation drops the JoinSet; in-flight judge calls run to
    /// completion on the runtime and their results are discarded.
    pub async fn run(
        &self,
        requests: Vec<EvaluationRequest>,
    ) -> Result<BatchEvaluationResult, EvalError> {
        let started = Instant::now();
        let total = requests.len();
        info!(total, concurrency = ?self.concurrency, "batch evaluation started");

        let sem = self
            .concurrency
            .map(|cap| Arc::new(Semaphore::new(cap.max(1))));
        let mut join_set = JoinSet::new();

        for (idx, request) in requests.into_iter().enumerate() {
            let permit = match &sem {
                Some(sem) => Some(
                    sem.clone()
                        .acquire_owned()
                        .await
                        .map_err(|e| EvalError::internal(format!("semaphore closed: {}", e)))?,
                ),
                None => None,
            };
            let evaluator = self.evaluator.clone();
            join_set.spawn(async move {
                let _permit = permit;
                let outcome = evaluator.evaluate(&request).await;
                (idx, request.target_id, outcome)
            });
        }

        let mut slots: Vec<Option<BatchItem>> = (0..total).map(|_| None).collect();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((idx, target_id, Ok(result))) => {
                    slots[idx] = Some(BatchItem {
                        target_id,
                        outcome: BatchOutcome::Success { result },
                    });
                }
                Ok((idx, target_id, Err(err))) => {
                    warn!(%target_id, error = %err, "batch item failed");
                    slots[idx] = Some(BatchItem {
                        target_id,
                        // Preserved verbatim for later inspection.
                        outcome: BatchOutcome::Failure {
                            error: err.to_string(),
                        },
                    });
                }
                Err(join_err) => {
                    warn!(error = %join_err, "batch task aborted");
                }
            }
        }

        let items: Vec<BatchItem> = slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| BatchItem {
                    target_id: "unknown".to_string(),
                    outcome: BatchOutcome::Failure {
                        error: "task aborted before completion".to_string(),
                    },
                })
            })
            .collect();

        let summary = summarize(&items, started.elapsed().as_millis() as u64);
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "batch evaluation finished"
        );
        Ok(BatchEvaluationResult { items, summary })
    }
}

fn summarize(items: &[BatchItem], duration_ms: u64) -> BatchSummary {
    let scores: Vec<f64> = items
        .iter()
        .filter_map(|i| i.result())
        .map(|r| r.overall_score)
        .collect();
    let succeeded = scores.len();
    let average_score = if scores.is_empty() {
        None
    } else {
        Some(round_score(scores.iter().sum::<f64>() / scores.len() as f64))
    };
    let total_cost_usd = items
        .iter()
        .filter_map(|i| i.result())
        .filter_map(|r| r.meta.cost_usd)
        .sum();

    BatchSummary {
        total: items.len(),
        succeeded,
        failed: items.len() - succeeded,
        average_score,
        total_cost_usd,
        duration_ms,
    }
}
