pub mod prompt;

use crate::errors::EvalError;
use crate::judge::{JudgeClient, RawJudgeResponse};
use crate::model::{
    round_score, DimensionScore, EvaluationMeta, EvaluationRequest, EvaluationResult,
    EvaluationSummary,
};
use crate::templates::{EvaluationTemplate, TemplateStore, GENERAL_TEMPLATE_ID};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Dimension scores at or above this threshold count as strengths,
/// below `CRITICAL_THRESHOLD` as critical issues, in between as
/// improvement areas.
const STRENGTH_THRESHOLD: f64 = 8.0;
const CRITICAL_THRESHOLD: f64 = 5.0;

pub struct Evaluator {
    templates: Arc<TemplateStore>,
    judge: JudgeClient,
}

impl Evaluator {
    pub fn new(templates: Arc<TemplateStore>, judge: JudgeClient) -> Self {
        Self { templates, judge }
    }

    /// Score one piece of content against its resolved template. Any judge
    /// or validation failure propagates; retries live in the judge client.
    pub async fn evaluate(
        &self,
        request: &EvaluationRequest,
    ) -> Result<EvaluationResult, EvalError> {
        if request.content.trim().is_empty() {
            return Err(EvalError::validation(format!(
                "content for '{}' is empty",
                request.target_id
            )));
        }

        let template = self.resolve_template(request)?;
        let started = Instant::now();

        let (system, body) = prompt::render(&template, request);
        let raw = self.judge.score(&system, &body).await?;
        let dimensions = validate_scores(&template, &raw)?;
        let overall_score = weighted_overall(&template, &dimensions);
        let summary = summarize(&template, &dimensions);

        let result = EvaluationResult {
            target_id: request.target_id.clone(),
            overall_score,
            dimensions,
            summary,
            meta: EvaluationMeta {
                evaluation_id: uuid::Uuid::new_v4().to_string(),
                template_id: template.id.clone(),
                duration_ms: started.elapsed().as_millis() as u64,
                cost_usd: raw.cost_usd,
                evaluated_at: Utc::now(),
            },
        };

        info!(
            target_id = %request.target_id,
            template = %template.id,
            score = result.overall_score,
            "evaluation complete"
        );
        Ok(result)
    }

    fn resolve_template(
        &self,
        request: &EvaluationRequest,
    ) -> Result<Arc<EvaluationTemplate>, EvalError> {
        if let Some(template) = self
            .templates
            .recommend(&request.content_type, &request.audience)
        {
            return Ok(template);
        }
        debug!(
            content_type = %request.content_type,
            "no template for content type, falling back to general"
        );
        self.templates.get(GENERAL_TEMPLATE_ID)
    }
}

/// Every dimension the template declares must come back in range; a missing
/// dimension or an out-of-range score fails the evaluation outright. Scores
/// are never clamped or defaulted, that would silently corrupt the
/// weighted aggregate. Undeclared dimensions in the response are dropped.
fn validate_scores(
    template: &EvaluationTemplate,
    raw: &RawJudgeResponse,
) -> Result<BTreeMap<String, DimensionScore>, EvalError> {
    let mut out = BTreeMap::new();
    for spec in &template.dimensions {
        let raw_score = raw.dimensions.get(&spec.name).ok_or_else(|| {
            EvalError::invalid_judge_response(format!(
                "judge response missing dimension '{}'",
                spec.name
            ))
        })?;
        if !(0.0..=10.0).contains(&raw_score.score) {
            return Err(EvalError::invalid_judge_response(format!(
                "dimension '{}' score {} outside [0, 10]",
                spec.name, raw_score.score
            )));
        }
        out.insert(
            spec.name.clone(),
            DimensionScore {
                dimension: spec.name.clone(),
                score: raw_score.score,
                justification: raw_score.justification.clone(),
                issues: raw_score.issues.clone(),
            },
        );
    }
    Ok(out)
}

fn weighted_overall(
    template: &EvaluationTemplate,
    dimensions: &BTreeMap<String, DimensionScore>,
) -> f64 {
    let sum = template
        .dimensions
        .iter()
        .map(|spec| dimensions[&spec.name].score * spec.weight)
        .sum();
    round_score(sum)
}

fn summarize(
    template: &EvaluationTemplate,
    dimensions: &BTreeMap<String, DimensionScore>,
) -> EvaluationSummary {
    let mut summary = EvaluationSummary::default();
    // Template order, not map order, so buckets read in rubric order.
    for spec in &template.dimensions {
        let scored = &dimensions[&spec.name];
        let note = if scored.justification.is_empty() {
            format!("{}: no justification given", spec.name)
        } else {
            scored.justification.clone()
        };
        if scored.score >= STRENGTH_THRESHOLD {
            summary.strengths.push(note);
        } else if scored.score < CRITICAL_THRESHOLD {
            summary.critical_issues.push(note);
        } else {
            summary.improvements.push(note);
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EvalErrorKind;
    use crate::judge::RetryPolicy;
    use crate::providers::llm::fake::FakeClient;

    fn payload(scores: &[(&str, f64)]) -> String {
        let body: Vec<String> = scores
            .iter()
            .map(|(name, score)| {
                format!(
                    r#""{}": {{"score": {}, "justification": "{} note", "issues": []}}"#,
                    name, score, name
                )
            })
            .collect();
        format!("{{{}}}", body.join(","))
    }

    fn evaluator_with(response: String) -> Evaluator {
        let client = FakeClient::new("fake-model").with_response(response);
        Evaluator::new(
            Arc::new(TemplateStore::with_builtins()),
            JudgeClient::new(Arc::new(client)).with_retry_policy(RetryPolicy::none()),
        )
    }

    fn general_request() -> EvaluationRequest {
        EvaluationRequest::new("term-1", "Gradient descent is an optimizer.")
    }

    #[tokio::test]
    async fn overall_is_weighted_sum_rounded() {
        // general template: accuracy .30, clarity .30, completeness .25, relevance .15
        let evaluator = evaluator_with(payload(&[
            ("accuracy", 9.0),
            ("clarity", 6.0),
            ("completeness", 4.0),
            ("relevance", 8.0),
        ]));
        let result = evaluator.evaluate(&general_request()).await.unwrap();
        assert_eq!(result.overall_score, 6.7);
        assert_eq!(result.dimensions.len(), 4);
        assert_eq!(result.meta.template_id, "general");
    }

    #[tokio::test]
    async fn summary_buckets_follow_thresholds() {
        let evaluator = evaluator_with(payload(&[
            ("accuracy", 9.0),
            ("clarity", 6.0),
            ("completeness", 4.0),
            ("relevance", 8.0),
        ]));
        let result = evaluator.evaluate(&general_request()).await.unwrap();
        assert_eq!(result.summary.strengths, vec!["accuracy note", "relevance note"]);
        assert_eq!(result.summary.improvements, vec!["clarity note"]);
        assert_eq!(result.summary.critical_issues, vec!["completeness note"]);
    }

    #[tokio::test]
    async fn missing_dimension_fails_hard() {
        let evaluator = evaluator_with(payload(&[("accuracy", 9.0), ("clarity", 6.0)]));
        let err = evaluator.evaluate(&general_request()).await.unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::InvalidJudgeResponse);
        assert!(err.message.contains("completeness"));
    }

    #[tokio::test]
    async fn out_of_range_score_fails_hard() {
        let evaluator = evaluator_with(payload(&[
            ("accuracy", 11.0),
            ("clarity", 6.0),
            ("completeness", 4.0),
            ("relevance", 8.0),
        ]));
        let err = evaluator.evaluate(&general_request()).await.unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::InvalidJudgeResponse);
        assert!(err.message.contains("outside [0, 10]"));
    }

    #[tokio::test]
    async fn empty_content_rejected_before_judge_call() {
        let evaluator = evaluator_with(payload(&[("accuracy", 9.0)]));
        let err = evaluator
            .evaluate(&EvaluationRequest::new("t", "   "))
            .await
            .unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::Validation);
    }

    #[tokio::test]
    async fn unknown_content_type_falls_back_to_general() {
        let evaluator = evaluator_with(payload(&[
            ("accuracy", 7.0),
            ("clarity", 7.0),
            ("completeness", 7.0),
            ("relevance", 7.0),
        ]));
        let request = general_request().with_content_type("screenplay");
        let result = evaluator.evaluate(&request).await.unwrap();
        assert_eq!(result.meta.template_id, "general");
        assert_eq!(result.overall_score, 7.0);
    }

    #[tokio::test]
    async fn undeclared_dimensions_are_dropped() {
        let evaluator = evaluator_with(payload(&[
            ("accuracy", 7.0),
            ("clarity", 7.0),
            ("completeness", 7.0),
            ("relevance", 7.0),
            ("vibes", 10.0),
        ]));
        let result = evaluator.evaluate(&general_request()).await.unwrap();
        assert!(!result.dimensions.contains_key("vibes"));
        assert_eq!(result.overall_score, 7.0);
    }
}
