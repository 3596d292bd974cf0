use crate::model::{
    BatchEvaluationResult, ComparisonResult, EvaluationResult, QualityAnalytics,
    RecommendationReport,
};

fn fmt_cost(cost: Option<f64>) -> String {
    match cost {
        Some(c) => format!("${:.4}", c),
        None => "n/a".to_string(),
    }
}

pub fn print_evaluation(result: &EvaluationResult) {
    println!(
        "{}  score={:.1}  template={}  cost={}  {}ms",
        result.target_id,
        result.overall_score,
        result.meta.template_id,
        fmt_cost(result.meta.cost_usd),
        result.meta.duration_ms
    );
    for (name, dim) in &result.dimensions {
        println!("  {:<16} {:>4.1}  {}", name, dim.score, dim.justification);
    }
    if !result.summary.critical_issues.is_empty() {
        println!("  critical:");
        for issue in &result.summary.critical_issues {
            println!("    - {}", issue);
        }
    }
}

pub fn print_batch(batch: &BatchEvaluationResult) {
    for item in &batch.items {
        match item.result() {
            Some(result) => {
                println!("PASS {}  score={:.1}", item.target_id, result.overall_score)
            }
            None => println!(
                "FAIL {}  {}",
                item.target_id,
                item.error().unwrap_or_default()
            ),
        }
    }
    let s = &batch.summary;
    let average = s
        .average_score
        .map(|a| format!("{:.1}", a))
        .unwrap_or_else(|| "n/a".to_string());
    eprintln!(
        "Batch: total={} ok={} failed={} avg={} cost=${:.4} in {}ms",
        s.total, s.succeeded, s.failed, average, s.total_cost_usd, s.duration_ms
    );
}

pub fn print_comparison(result: &ComparisonResult) {
    println!("similarity: {:.1}/100", result.similarity_score);
    for (title, list) in [
        ("missing", &result.missing_elements),
        ("additional", &result.additional_elements),
        ("improvements", &result.improvements),
    ] {
        if list.is_empty() {
            continue;
        }
        println!("{}:", title);
        for entry in list {
            println!("  - {}", entry);
        }
    }
}

pub fn print_analytics(report: &QualityAnalytics) {
    println!("evaluations: {}", report.total_evaluations);
    println!("dimension averages:");
    for (name, mean) in &report.dimension_averages {
        println!("  {:<16} {:.1}", name, mean);
    }
    println!("score distribution:");
    for bucket in &report.histogram {
        println!(
            "  {:<6} {:>4}  {:>5.1}%",
            bucket.label, bucket.count, bucket.percentage
        );
    }
    if !report.common_issues.is_empty() {
        println!("common issues:");
        for issue in &report.common_issues {
            println!("  {:>3}x {}", issue.count, issue.issue);
        }
    }
    print_recommendation_list(&report.recommendations);
}

pub fn print_recommendations(report: &RecommendationReport) {
    println!("evaluations: {}", report.total_evaluations);
    print_recommendation_list(&report.recommendations);
}

fn print_recommendation_list(recommendations: &[crate::model::Recommendation]) {
    if recommendations.is_empty() {
        return;
    }
    println!("recommendations:");
    for rec in recommendations {
        println!(
            "  [{:?}] {} (+{:.1} expected): {}",
            rec.priority, rec.dimension, rec.expected_impact, rec.action
        );
    }
}
