use crate::errors::EvalError;
use crate::evaluator::Evaluator;
use crate::model::{round_score, ComparisonResult, EvaluationRequest, EvaluationResult};
use std::sync::Arc;
use tracing::info;

/// Per-dimension gap above which the candidate is told to catch up to the
/// reference even if its own summary did not flag the dimension.
const TRAILING_GAP: f64 = 1.0;

pub struct Comparator {
    evaluator: Arc<Evaluator>,
}

impl Comparator {
    pub fn new(evaluator: Arc<Evaluator>) -> Self {
        Self { evaluator }
    }

    /// Evaluate candidate and reference through the same template and
    /// derive how far apart they landed.
    pub async fn compare_with_reference(
        &self,
        candidate_content: &str,
        reference_content: &str,
        content_type: &str,
    ) -> Result<ComparisonResult, EvalError> {
        let candidate_req = EvaluationRequest::new("comparison:candidate", candidate_content)
            .with_content_type(content_type);
        let reference_req = EvaluationRequest::new("comparison:reference", reference_content)
            .with_content_type(content_type);

        let candidate = self.evaluator.evaluate(&candidate_req).await?;
        let reference = self.evaluator.evaluate(&reference_req).await?;

        let similarity_score = similarity(&candidate, &reference);

        let candidate_elements = elements(&candidate);
        let reference_elements = elements(&reference);
        let missing_elements = difference(&reference_elements, &candidate_elements);
        let additional_elements = difference(&candidate_elements, &reference_elements);

        let mut improvements = candidate.summary.improvements.clone();
        for (name, dim) in &reference.dimensions {
            let Some(candidate_dim) = candidate.dimensions.get(name) else {
                continue;
            };
            let gap = dim.score - candidate_dim.score;
            if gap > TRAILING_GAP {
                improvements.push(format!(
                    "{}: trails the reference by {:.1} points",
                    name, gap
                ));
            }
        }

        info!(
            similarity = similarity_score,
            missing = missing_elements.len(),
            additional = additional_elements.len(),
            "comparison complete"
        );
        Ok(ComparisonResult {
            similarity_score,
            missing_elements,
            additional_elements,
            improvements,
        })
    }
}

/// 100 minus ten times the mean absolute per-dimension gap, clamped to
/// [0, 100]. Identical score vectors map to exactly 100.
fn similarity(candidate: &EvaluationResult, reference: &EvaluationResult) -> f64 {
    let gaps: Vec<f64> = reference
        .dimensions
        .iter()
        .filter_map(|(name, dim)| {
            candidate
                .dimensions
                .get(name)
                .map(|c| (c.score - dim.score).abs())
        })
        .collect();
    if gaps.is_empty() {
        return 0.0;
    }
    let mean_gap = gaps.iter().sum::<f64>() / gaps.len() as f64;
    round_score((100.0 - mean_gap * 10.0).clamp(0.0, 100.0))
}

/// Notable elements of an evaluation: what the judge singled out as
/// strengths or critical issues.
fn elements(result: &EvaluationResult) -> Vec<String> {
    let mut out = Vec::new();
    for entry in result
        .summary
        .strengths
        .iter()
        .chain(result.summary.critical_issues.iter())
    {
        if !out.contains(entry) {
            out.push(entry.clone());
        }
    }
    out
}

fn difference(from: &[String], subtract: &[String]) -> Vec<String> {
    from.iter()
        .filter(|e| !subtract.contains(e))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::{JudgeClient, RetryPolicy};
    use crate::providers::llm::fake::FakeClient;
    use crate::templates::TemplateStore;

    fn payload(scores: &[(&str, f64, &str)]) -> String {
        let body: Vec<String> = scores
            .iter()
            .map(|(name, score, note)| {
                format!(
                    r#""{}": {{"score": {}, "justification": "{}", "issues": []}}"#,
                    name, score, note
                )
            })
            .collect();
        format!("{{{}}}", body.join(","))
    }

    fn comparator(client: FakeClient) -> Comparator {
        let evaluator = Evaluator::new(
            Arc::new(TemplateStore::with_builtins()),
            JudgeClient::new(Arc::new(client)).with_retry_policy(RetryPolicy::none()),
        );
        Comparator::new(Arc::new(evaluator))
    }

    #[tokio::test]
    async fn identical_content_scores_100_with_empty_diffs() {
        // Same fixed response for both evaluations; identical verdicts.
        let client = FakeClient::new("fake-model").with_response(payload(&[
            ("accuracy", 9.0, "precise"),
            ("clarity", 8.0, "readable"),
            ("completeness", 7.0, "mostly there"),
            ("relevance", 9.0, "on topic"),
        ]));
        let result = comparator(client)
            .compare_with_reference("same text", "same text", "general")
            .await
            .unwrap();

        assert_eq!(result.similarity_score, 100.0);
        assert!(result.missing_elements.is_empty());
        assert!(result.additional_elements.is_empty());
    }

    #[tokio::test]
    async fn impoverished_candidate_drops_similarity_and_reports_missing() {
        let client = FakeClient::new("fake-model");
        // Candidate is evaluated first, reference second.
        client.push_text(payload(&[
            ("accuracy", 6.0, "thin but correct"),
            ("clarity", 7.0, "plain"),
            ("completeness", 3.0, "misses the why and all examples"),
            ("relevance", 7.0, "on topic"),
        ]));
        client.push_text(payload(&[
            ("accuracy", 9.0, "precise and sourced"),
            ("clarity", 8.0, "crisp opening definition"),
            ("completeness", 9.0, "covers what, why, and examples"),
            ("relevance", 8.0, "every paragraph earns its place"),
        ]));

        let result = comparator(client)
            .compare_with_reference("short stub", "full article", "general")
            .await
            .unwrap();

        // Mean gap = (3 + 1 + 6 + 1) / 4 = 2.75 -> 72.5
        assert_eq!(result.similarity_score, 72.5);
        assert!(!result.missing_elements.is_empty());
        assert!(result
            .missing_elements
            .contains(&"precise and sourced".to_string()));
        // Candidate's critical issue is an element the reference lacks.
        assert!(result
            .additional_elements
            .contains(&"misses the why and all examples".to_string()));
        // accuracy and completeness trail by > 1.0.
        assert!(result
            .improvements
            .iter()
            .any(|i| i.starts_with("accuracy:")));
        assert!(result
            .improvements
            .iter()
            .any(|i| i.starts_with("completeness:")));
    }
}
