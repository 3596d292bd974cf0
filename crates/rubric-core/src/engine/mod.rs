pub mod runner;

pub use runner::BatchRunner;

use crate::analytics::AnalyticsAggregator;
use crate::compare::Comparator;
use crate::errors::EvalError;
use crate::evaluator::Evaluator;
use crate::judge::{JudgeClient, RetryPolicy};
use crate::model::{
    AnalyticsWindow, BatchEvaluationResult, ComparisonResult, EvaluationRequest,
    EvaluationResult, QualityAnalytics, RecommendationReport,
};
use crate::providers::llm::LlmClient;
use crate::storage::ResultStore;
use crate::templates::{EvaluationTemplate, TemplateStore};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub retry: RetryPolicy,
    pub call_timeout: Duration,
    /// Batch in-flight cap; `None` is unbounded.
    pub concurrency: Option<usize>,
    /// Score analytics recommendations steer dimensions toward.
    pub target_score: f64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            call_timeout: Duration::from_secs(45),
            concurrency: None,
            target_score: 8.0,
        }
    }
}

/// The engine's programmatic surface: single and batch evaluation,
/// reference comparison, template management, and analytics. Transport
/// bindings (HTTP, CLI) sit outside this crate and call straight through.
pub struct Engine {
    templates: Arc<TemplateStore>,
    store: Arc<dyn ResultStore>,
    evaluator: Arc<Evaluator>,
    runner: BatchRunner,
    comparator: Comparator,
    analytics: AnalyticsAggregator,
}

impl Engine {
    pub fn new(
        client: Arc<dyn LlmClient>,
        store: Arc<dyn ResultStore>,
        options: EngineOptions,
    ) -> Self {
        Self::with_templates(Arc::new(TemplateStore::with_builtins()), client, store, options)
    }

    /// Variant for callers that want their own (e.g. preloaded or isolated
    /// per-test) template store.
    pub fn with_templates(
        templates: Arc<TemplateStore>,
        client: Arc<dyn LlmClient>,
        store: Arc<dyn ResultStore>,
        options: EngineOptions,
    ) -> Self {
        let judge = JudgeClient::new(client)
            .with_retry_policy(options.retry.clone())
            .with_call_timeout(options.call_timeout);
        let evaluator = Arc::new(Evaluator::new(templates.clone(), judge));
        let runner = BatchRunner::new(evaluator.clone()).with_concurrency(options.concurrency);
        let comparator = Comparator::new(evaluator.clone());
        let analytics = AnalyticsAggregator::new(store.clone(), templates.clone())
            .with_target_score(options.target_score);
        Self {
            templates,
            store,
            evaluator,
            runner,
            comparator,
            analytics,
        }
    }

    pub async fn evaluate_content(
        &self,
        request: EvaluationRequest,
    ) -> Result<EvaluationResult, EvalError> {
        let result = self.evaluator.evaluate(&request).await?;
        self.store.save(&result)?;
        Ok(result)
    }

    /// Per-item failures stay inside the returned batch; only
    /// infrastructure breakage surfaces as an error.
    pub async fn batch_evaluate(
        &self,
        requests: Vec<EvaluationRequest>,
    ) -> Result<BatchEvaluationResult, EvalError> {
        let batch = self.runner.run(requests).await?;
        for item in &batch.items {
            if let Some(result) = item.result() {
                self.store.save(result)?;
            }
        }
        Ok(batch)
    }

    pub async fn compare_with_reference(
        &self,
        candidate_content: &str,
        reference_content: &str,
        content_type: &str,
    ) -> Result<ComparisonResult, EvalError> {
        self.comparator
            .compare_with_reference(candidate_content, reference_content, content_type)
            .await
    }

    pub fn all_templates(&self) -> Vec<Arc<EvaluationTemplate>> {
        self.templates.all()
    }

    pub fn recommend_template(
        &self,
        content_type: &str,
        audience: &str,
    ) -> Option<Arc<EvaluationTemplate>> {
        self.templates.recommend(content_type, audience)
    }

    pub fn create_custom_template(&self, template: EvaluationTemplate) -> Result<(), EvalError> {
        self.templates.create_custom(template)
    }

    pub fn delete_template(&self, id: &str) -> bool {
        self.templates.delete(id)
    }

    pub fn quality_analytics(
        &self,
        window: &AnalyticsWindow,
    ) -> Result<QualityAnalytics, EvalError> {
        self.analytics.quality_analytics(window)
    }

    pub fn improvement_recommendations(&self) -> Result<RecommendationReport, EvalError> {
        self.analytics.improvement_recommendations()
    }
}
