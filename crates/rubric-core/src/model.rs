use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// One piece of content to be scored by the judge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRequest {
    /// Opaque caller identifier (content id, term slug, ...).
    pub target_id: String,
    pub content: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default = "default_audience")]
    pub audience: String,
}

fn default_content_type() -> String {
    "general".to_string()
}

fn default_audience() -> String {
    "general".to_string()
}

impl EvaluationRequest {
    pub fn new(target_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            content: content.into(),
            content_type: default_content_type(),
            audience: default_audience(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }
}

/// Judge verdict for a single quality dimension, scored on [0,10].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionScore {
    pub dimension: String,
    pub score: f64,
    pub justification: String,
    #[serde(default)]
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub critical_issues: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationMeta {
    pub evaluation_id: String,
    pub template_id: String,
    pub duration_ms: u64,
    /// Judge-reported spend. `None` when the provider reports no usage;
    /// aggregates must not coerce unknown to zero.
    pub cost_usd: Option<f64>,
    pub evaluated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub target_id: String,
    /// Weighted mean of dimension scores, rounded to one decimal.
    pub overall_score: f64,
    pub dimensions: BTreeMap<String, DimensionScore>,
    pub summary: EvaluationSummary,
    pub meta: EvaluationMeta,
}

/// Outcome of one batch item. Failures are data, not aborts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchOutcome {
    Success { result: EvaluationResult },
    Failure { error: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    pub target_id: String,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

impl BatchItem {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, BatchOutcome::Success { .. })
    }

    pub fn result(&self) -> Option<&EvaluationResult> {
        match &self.outcome {
            BatchOutcome::Success { result } => Some(result),
            BatchOutcome::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            BatchOutcome::Success { .. } => None,
            BatchOutcome::Failure { error } => Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Mean overall score across successful items only; `None` when no
    /// item succeeded. Callers must check `succeeded > 0` before use.
    pub average_score: Option<f64>,
    /// Sum of known judge costs across successful items.
    pub total_cost_usd: f64,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEvaluationResult {
    /// Same order as the input request list, regardless of completion order.
    pub items: Vec<BatchItem>,
    pub summary: BatchSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Closeness of the candidate's evaluation to the reference's, 0-100.
    pub similarity_score: f64,
    pub missing_elements: Vec<String>,
    pub additional_elements: Vec<String>,
    pub improvements: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            other => Err(format!("unknown granularity '{other}' (day|week|month)")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub granularity: Granularity,
}

impl AnalyticsWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, granularity: Granularity) -> Self {
        Self {
            start,
            end,
            granularity,
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramBucket {
    /// Display label, e.g. "4-6".
    pub label: String,
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueFrequency {
    pub issue: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub dimension: String,
    pub action: String,
    pub priority: Priority,
    /// Estimated score headroom: target score minus current mean.
    pub expected_impact: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityAnalytics {
    pub window: AnalyticsWindow,
    pub total_evaluations: usize,
    pub dimension_averages: BTreeMap<String, f64>,
    pub histogram: Vec<HistogramBucket>,
    pub common_issues: Vec<IssueFrequency>,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationReport {
    pub total_evaluations: usize,
    pub dimension_averages: BTreeMap<String, f64>,
    pub recommendations: Vec<Recommendation>,
}

/// Round to one decimal place; the resolution of all reported scores.
pub fn round_score(score: f64) -> f64 {
    (score * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_score_one_decimal() {
        assert_eq!(round_score(7.25), 7.3);
        assert_eq!(round_score(7.24), 7.2);
        assert_eq!(round_score(10.0), 10.0);
        assert_eq!(round_score(0.0), 0.0);
    }

    #[test]
    fn batch_outcome_serializes_with_status_tag() {
        let item = BatchItem {
            target_id: "t1".into(),
            outcome: BatchOutcome::Failure {
                error: "judge unavailable".into(),
            },
        };
        let v = serde_json::to_value(&item).unwrap();
        assert_eq!(v["status"], "failure");
        assert_eq!(v["error"], "judge unavailable");
        assert_eq!(v["target_id"], "t1");
    }

    #[test]
    fn granularity_parses_known_values() {
        assert_eq!("day".parse::<Granularity>().unwrap(), Granularity::Day);
        assert!("hour".parse::<Granularity>().is_err());
    }

    #[test]
    fn window_contains_is_half_open() {
        let start = Utc::now();
        let end = start + chrono::Duration::days(1);
        let w = AnalyticsWindow::new(start, end, Granularity::Day);
        assert!(w.contains(start));
        assert!(!w.contains(end));
    }
}
