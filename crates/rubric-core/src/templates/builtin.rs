use super::{DimensionSpec, EvaluationTemplate, PromptFragments, TemplateMeta};
use chrono::TimeZone;
use chrono::Utc;

fn meta(tags: &[&str]) -> TemplateMeta {
    TemplateMeta {
        version: "1.2".to_string(),
        author: "content-quality".to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        // Pinned so built-in templates hash/serialize identically across runs.
        updated_at: Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap(),
    }
}

fn dim(
    name: &str,
    weight: f64,
    criteria: &[&str],
    guidance: &str,
    good: Option<&str>,
    bad: Option<&str>,
) -> DimensionSpec {
    DimensionSpec {
        name: name.to_string(),
        weight,
        criteria: criteria.iter().map(|c| c.to_string()).collect(),
        guidance: guidance.to_string(),
        good_example: good.map(str::to_string),
        bad_example: bad.map(str::to_string),
    }
}

fn definition_template() -> EvaluationTemplate {
    EvaluationTemplate {
        id: "definition".to_string(),
        content_type: "definition".to_string(),
        audiences: vec![
            "beginner".to_string(),
            "intermediate".to_string(),
            "advanced".to_string(),
        ],
        dimensions: vec![
            dim(
                "accuracy",
                0.30,
                &[
                    "Technical claims are correct and current",
                    "Terminology is used consistently with field conventions",
                    "No overgeneralizations or false equivalences",
                ],
                "Verify each technical claim against an authoritative source and qualify statements that only hold in specific settings.",
                Some("A transformer is a neural architecture built on self-attention, introduced in 2017."),
                Some("Transformers are just better RNNs."),
            ),
            dim(
                "clarity",
                0.25,
                &[
                    "First sentence states what the term is",
                    "Jargon is introduced before it is used",
                    "Sentences are short and direct",
                ],
                "Lead with a one-sentence plain-language definition before expanding into detail.",
                None,
                None,
            ),
            dim(
                "completeness",
                0.20,
                &[
                    "Covers what it is, why it matters, and where it is used",
                    "Mentions at least one concrete example",
                    "Notes common confusions with adjacent terms",
                ],
                "Add the missing why-it-matters or example section; a definition without context does not teach.",
                None,
                None,
            ),
            dim(
                "relevance",
                0.15,
                &[
                    "Examples reflect real current usage",
                    "No tangents unrelated to the term",
                ],
                "Cut material that does not serve understanding of this specific term.",
                None,
                None,
            ),
            dim(
                "engagement",
                0.10,
                &[
                    "Opens with a hook or motivating question",
                    "Uses an analogy where one genuinely helps",
                ],
                "Open with the problem this concept solves rather than a dry restatement.",
                None,
                None,
            ),
        ],
        prompts: PromptFragments {
            system_role: "You are an exacting reviewer of AI/ML glossary definitions. \
                          You score educational content for a {audience} audience and \
                          justify every score with specifics from the text."
                .to_string(),
            evaluation_instruction: "Evaluate the following {content_type} written for a \
                                     {audience} reader. Judge only the text provided; do \
                                     not reward length for its own sake."
                .to_string(),
            scoring_instruction: "Score every dimension from 0 to 10 using the listed \
                                  criteria. Be strict: reserve 9-10 for content with no \
                                  meaningful defect on that dimension."
                .to_string(),
        },
        meta: meta(&["glossary", "definition"]),
    }
}

fn tutorial_template() -> EvaluationTemplate {
    EvaluationTemplate {
        id: "tutorial".to_string(),
        content_type: "tutorial".to_string(),
        audiences: vec!["beginner".to_string(), "intermediate".to_string()],
        dimensions: vec![
            dim(
                "accuracy",
                0.25,
                &[
                    "Steps work as written",
                    "Code snippets and commands are syntactically valid",
                ],
                "Dry-run every step and fix any that cannot be reproduced as written.",
                None,
                None,
            ),
            dim(
                "clarity",
                0.20,
                &[
                    "Each step has a single action",
                    "Prerequisites are stated up front",
                ],
                "Split compound steps and move prerequisites to the top.",
                None,
                None,
            ),
            dim(
                "structure",
                0.20,
                &[
                    "Goal stated before the first step",
                    "Steps appear in dependency order",
                    "Ends with a verification step",
                ],
                "State the end goal first and close with how the reader verifies success.",
                None,
                None,
            ),
            dim(
                "progression",
                0.20,
                &[
                    "Difficulty ramps gradually",
                    "New concepts build on earlier steps",
                ],
                "Reorder so each step relies only on concepts already introduced.",
                None,
                None,
            ),
            dim(
                "engagement",
                0.15,
                &[
                    "Explains why each step matters",
                    "Anticipates common mistakes",
                ],
                "Annotate steps with the failure the reader avoids by doing it this way.",
                None,
                None,
            ),
        ],
        prompts: PromptFragments {
            system_role: "You are a hands-on technical educator reviewing AI/ML tutorials \
                          for a {audience} audience. You check that a motivated reader \
                          could actually follow the material end to end."
                .to_string(),
            evaluation_instruction: "Evaluate the following {content_type} aimed at a \
                                     {audience} learner. Judge whether the steps teach, \
                                     in order, what they claim to teach."
                .to_string(),
            scoring_instruction: "Score every dimension from 0 to 10 using the listed \
                                  criteria. A tutorial a reader cannot complete scores \
                                  low on accuracy no matter how well written."
                .to_string(),
        },
        meta: meta(&["tutorial", "hands-on"]),
    }
}

fn general_template() -> EvaluationTemplate {
    EvaluationTemplate {
        id: "general".to_string(),
        content_type: "general".to_string(),
        audiences: vec![],
        dimensions: vec![
            dim(
                "accuracy",
                0.30,
                &["Factual claims are correct", "Sources of uncertainty are flagged"],
                "Check factual claims and flag the ones that depend on context.",
                None,
                None,
            ),
            dim(
                "clarity",
                0.30,
                &["Main point is identifiable in one read", "Free of unexplained jargon"],
                "Rewrite the opening so the main point lands in the first two sentences.",
                None,
                None,
            ),
            dim(
                "completeness",
                0.25,
                &["No obvious unanswered question a reader would have"],
                "Answer the next question a reader would naturally ask.",
                None,
                None,
            ),
            dim(
                "relevance",
                0.15,
                &["All content serves the stated topic"],
                "Remove or relocate material that serves a different topic.",
                None,
                None,
            ),
        ],
        prompts: PromptFragments {
            system_role: "You are a careful editorial reviewer of educational AI/ML \
                          content for a {audience} audience."
                .to_string(),
            evaluation_instruction: "Evaluate the following {content_type} content for a \
                                     {audience} reader."
                .to_string(),
            scoring_instruction: "Score every dimension from 0 to 10 using the listed \
                                  criteria, with a short justification per dimension."
                .to_string(),
        },
        meta: meta(&["general", "fallback"]),
    }
}

/// Templates registered at store construction. The `general` template is the
/// fallback for unknown content types and must always be present.
pub fn builtin_templates() -> Vec<EvaluationTemplate> {
    vec![definition_template(), tutorial_template(), general_template()]
}
