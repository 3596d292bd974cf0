use crate::errors::EvalError;
use crate::model::{
    round_score, AnalyticsWindow, EvaluationResult, HistogramBucket, IssueFrequency, Priority,
    QualityAnalytics, Recommendation, RecommendationReport,
};
use crate::storage::ResultStore;
use crate::templates::TemplateStore;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

const DEFAULT_TARGET_SCORE: f64 = 8.0;

/// Mean dimension score below this gets a high-priority recommendation.
const HIGH_PRIORITY_BELOW: f64 = 5.0;

const HISTOGRAM_EDGES: [(f64, f64); 5] =
    [(0.0, 2.0), (2.0, 4.0), (4.0, 6.0), (6.0, 8.0), (8.0, 10.0)];

/// Rolls persisted evaluation history up into score distributions, issue
/// frequencies, and remediation recommendations. Everything is recomputed
/// from the store per query; an empty window is a valid empty report.
pub struct AnalyticsAggregator {
    store: Arc<dyn ResultStore>,
    templates: Arc<TemplateStore>,
    target_score: f64,
}

impl AnalyticsAggregator {
    pub fn new(store: Arc<dyn ResultStore>, templates: Arc<TemplateStore>) -> Self {
        Self {
            store,
            templates,
            target_score: DEFAULT_TARGET_SCORE,
        }
    }

    pub fn with_target_score(mut self, target_score: f64) -> Self {
        self.target_score = target_score;
        self
    }

    pub fn quality_analytics(
        &self,
        window: &AnalyticsWindow,
    ) -> Result<QualityAnalytics, EvalError> {
        let results = self.store.query_by_window(window.start, window.end)?;
        let dimension_averages = dimension_averages(&results);
        Ok(QualityAnalytics {
            window: window.clone(),
            total_evaluations: results.len(),
            histogram: histogram(&results),
            common_issues: common_issues(&results),
            recommendations: self.recommendations(&dimension_averages),
            dimension_averages,
        })
    }

    /// Recommendations over the full stored history. Deterministic for a
    /// given store state: no sampling, no clock reads.
    pub fn improvement_recommendations(&self) -> Result<RecommendationReport, EvalError> {
        let results = self
            .store
            .query_by_window(DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC)?;
        let dimension_averages = dimension_averages(&results);
        Ok(RecommendationReport {
            total_evaluations: results.len(),
            recommendations: self.recommendations(&dimension_averages),
            dimension_averages,
        })
    }

    /// One recommendation per dimension in the bottom third of means
    /// (ceil(n/3) lowest, name as tie-break). Action text comes from the
    /// template's guidance for that dimension.
    fn recommendations(&self, averages: &BTreeMap<String, f64>) -> Vec<Recommendation> {
        if averages.is_empty() {
            return Vec::new();
        }
        let mut ranked: Vec<(&String, f64)> = averages.iter().map(|(k, v)| (k, *v)).collect();
        ranked.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap().then_with(|| a.0.cmp(b.0)));

        let take = ranked.len().div_ceil(3);
        ranked
            .into_iter()
            .take(take)
            .map(|(name, mean)| {
                let action = self
                    .templates
                    .find_dimension(name)
                    .filter(|spec| !spec.guidance.is_empty())
                    .map(|spec| spec.guidance)
                    .unwrap_or_else(|| {
                        format!("Review content against the '{}' rubric criteria", name)
                    });
                Recommendation {
                    dimension: name.clone(),
                    action,
                    priority: if mean < HIGH_PRIORITY_BELOW {
                        Priority::High
                    } else {
                        Priority::Medium
                    },
                    expected_impact: round_score((self.target_score - mean).max(0.0)),
                }
            })
            .collect()
    }
}

fn dimension_averages(results: &[EvaluationResult]) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for result in results {
        for (name, dim) in &result.dimensions {
            let entry = sums.entry(name.clone()).or_insert((0.0, 0));
            entry.0 += dim.score;
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(name, (sum, count))| (name, round_score(sum / count as f64)))
        .collect()
}

fn histogram(results: &[EvaluationResult]) -> Vec<HistogramBucket> {
    let total = results.len();
    HISTOGRAM_EDGES
        .iter()
        .map(|&(lower, upper)| {
            let last = upper >= 10.0;
            let count = results
                .iter()
                .filter(|r| {
                    let s = r.overall_score;
                    // Top bucket closes the range so a perfect 10 lands somewhere.
                    s >= lower && (s < upper || (last && s <= upper))
                })
                .count();
            let percentage = if total == 0 {
                0.0
            } else {
                round_score(count as f64 * 100.0 / total as f64)
            };
            HistogramBucket {
                label: format!("{}-{}", lower as u32, upper as u32),
                lower,
                upper,
                count,
                percentage,
            }
        })
        .collect()
}

fn common_issues(results: &[EvaluationResult]) -> Vec<IssueFrequency> {
    let mut counts: BTreeMap<&String, usize> = BTreeMap::new();
    for result in results {
        for issue in &result.summary.critical_issues {
            *counts.entry(issue).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<IssueFrequency> = counts
        .into_iter()
        .map(|(issue, count)| IssueFrequency {
            issue: issue.clone(),
            count,
        })
        .collect();
    // Highest frequency first; lexicographic within a frequency so equal
    // inputs always rank identically.
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.issue.cmp(&b.issue)));
    ranked
}
