//! Batch orchestration contract: input order is preserved under concurrency,
//! per-item failures stay isolated, and the summary is computed over
//! successes only.

use async_trait::async_trait;
use rubric_core::engine::{Engine, EngineOptions};
use rubric_core::errors::EvalError;
use rubric_core::judge::RetryPolicy;
use rubric_core::model::EvaluationRequest;
use rubric_core::providers::llm::{JudgeCompletion, LlmClient};
use rubric_core::storage::MemoryStore;
use std::sync::Arc;

/// Deterministic regardless of scheduling: reads a directive out of the
/// rendered prompt instead of relying on call order. Content like
/// "score=8" yields a uniform payload at that score; "poison" fails.
struct MarkerClient;

fn payload(score: f64) -> String {
    let dims = ["accuracy", "clarity", "completeness", "relevance"];
    let body: Vec<String> = dims
        .iter()
        .map(|d| {
            format!(
                r#""{}": {{"score": {}, "justification": "{} at {}", "issues": []}}"#,
                d, score, d, score
            )
        })
        .collect();
    format!("{{{}}}", body.join(","))
}

#[async_trait]
impl LlmClient for MarkerClient {
    async fn complete(&self, _system: &str, prompt: &str) -> Result<JudgeCompletion, EvalError> {
        if prompt.contains("poison") {
            return Err(EvalError::provider_server(
                "marker",
                503,
                "injected judge failure",
            ));
        }
        let score = prompt
            .split("score=")
            .nth(1)
            .and_then(|rest| rest.split_whitespace().next())
            .and_then(|token| token.parse::<f64>().ok())
            .unwrap_or(7.0);
        Ok(JudgeCompletion {
            text: payload(score),
            provider: "marker".to_string(),
            model: "marker-model".to_string(),
            cost_usd: Some(0.01),
        })
    }

    fn provider_name(&self) -> &'static str {
        "marker"
    }
}

fn engine(concurrency: Option<usize>) -> Engine {
    Engine::new(
        Arc::new(MarkerClient),
        Arc::new(MemoryStore::new()),
        EngineOptions {
            retry: RetryPolicy::none(),
            concurrency,
            ..EngineOptions::default()
        },
    )
}

fn request(id: &str, content: &str) -> EvaluationRequest {
    EvaluationRequest::new(id, content)
}

#[tokio::test]
async fn order_preserved_with_failures_at_fixed_indices() -> anyhow::Result<()> {
    let requests = vec![
        request("r0", "score=7 text"),
        request("r1", "score=7 text"),
        request("r2", "poison"),
        request("r3", "score=7 text"),
        request("r4", "score=7 text"),
        request("r5", "poison"),
    ];
    let batch = engine(Some(3)).batch_evaluate(requests).await?;

    assert_eq!(batch.items.len(), 6);
    let ids: Vec<&str> = batch.items.iter().map(|i| i.target_id.as_str()).collect();
    assert_eq!(ids, vec!["r0", "r1", "r2", "r3", "r4", "r5"]);

    for (idx, item) in batch.items.iter().enumerate() {
        let should_fail = idx == 2 || idx == 5;
        assert_eq!(!item.is_success(), should_fail, "item {}", idx);
    }
    assert!(batch.items[2]
        .error()
        .unwrap()
        .contains("injected judge failure"));
    Ok(())
}

#[tokio::test]
async fn summary_counts_all_but_averages_successes_only() -> anyhow::Result<()> {
    let requests = vec![
        request("a", "score=6 text"),
        request("bad-1", "poison"),
        request("b", "score=8 text"),
        request("bad-2", "poison"),
        request("c", "score=10 text"),
    ];
    let batch = engine(Some(2)).batch_evaluate(requests).await?;

    let s = &batch.summary;
    assert_eq!(s.total, 5);
    assert_eq!(s.succeeded, 3);
    assert_eq!(s.failed, 2);
    assert_eq!(s.succeeded + s.failed, s.total);
    assert_eq!(s.average_score, Some(8.0));
    assert!((s.total_cost_usd - 0.03).abs() < 1e-9);
    Ok(())
}

#[tokio::test]
async fn all_failures_yield_no_average() {
    let requests = vec![request("x", "poison"), request("y", "poison")];
    let batch = engine(None).batch_evaluate(requests).await.unwrap();

    assert_eq!(batch.summary.succeeded, 0);
    assert_eq!(batch.summary.failed, 2);
    assert_eq!(batch.summary.average_score, None);
    assert_eq!(batch.summary.total_cost_usd, 0.0);
}

#[tokio::test]
async fn empty_batch_is_a_valid_empty_result() {
    let batch = engine(None).batch_evaluate(vec![]).await.unwrap();
    assert!(batch.items.is_empty());
    assert_eq!(batch.summary.total, 0);
    assert_eq!(batch.summary.average_score, None);
}
