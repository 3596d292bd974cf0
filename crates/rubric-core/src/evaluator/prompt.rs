use crate::model::EvaluationRequest;
use crate::templates::EvaluationTemplate;
use std::fmt::Write as _;

fn fill(fragment: &str, request: &EvaluationRequest) -> String {
    fragment
        .replace("{content_type}", &request.content_type)
        .replace("{audience}", &request.audience)
}

/// Render the judge prompt from template fragments: system role, evaluation
/// instruction, dimension rubric, and the required output shape. Returns
/// `(system, body)`.
pub fn render(template: &EvaluationTemplate, request: &EvaluationRequest) -> (String, String) {
    let system = fill(&template.prompts.system_role, request);

    let mut body = String::new();
    let _ = writeln!(body, "{}\n", fill(&template.prompts.evaluation_instruction, request));
    let _ = writeln!(
        body,
        "### Content:\n<content>\n{}\n</content>\n",
        request.content
    );

    body.push_str("### Dimensions:\n");
    for dim in &template.dimensions {
        let _ = writeln!(body, "- {} (weight {:.2}):", dim.name, dim.weight);
        for criterion in &dim.criteria {
            let _ = writeln!(body, "    * {}", criterion);
        }
        if let Some(good) = &dim.good_example {
            let _ = writeln!(body, "    good example: {}", good);
        }
        if let Some(bad) = &dim.bad_example {
            let _ = writeln!(body, "    bad example: {}", bad);
        }
    }

    let _ = writeln!(body, "\n{}\n", fill(&template.prompts.scoring_instruction, request));

    body.push_str("Respond with ONLY a JSON object of the form:\n{\n");
    for (i, dim) in template.dimensions.iter().enumerate() {
        let comma = if i + 1 == template.dimensions.len() { "" } else { "," };
        let _ = writeln!(
            body,
            "  \"{}\": {{\"score\": <0-10>, \"justification\": \"...\", \"issues\": [\"...\"]}}{}",
            dim.name, comma
        );
    }
    body.push('}');

    (system, body)
}
