use crate::errors::EvalError;
use crate::providers::llm::JudgeCompletion;
use std::collections::BTreeMap;

/// Parsed judge payload: one raw score block per dimension plus whatever
/// cost figure was available (provider usage wins over an in-payload one).
#[derive(Debug, Clone)]
pub struct RawJudgeResponse {
    pub dimensions: BTreeMap<String, RawDimensionScore>,
    pub cost_usd: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct RawDimensionScore {
    pub score: f64,
    pub justification: String,
    pub issues: Vec<String>,
}

/// Keys the judge may legally emit next to the dimension map.
const COST_KEYS: [&str; 2] = ["cost", "usage_usd"];

/// Extract the first JSON object from the completion text and read it as a
/// `{dimension: {score, justification, issues[]}}` map. Judges wrap JSON in
/// prose often enough that scanning for the opening brace is mandatory.
pub fn parse_completion(completion: &JudgeCompletion) -> Result<RawJudgeResponse, EvalError> {
    let text = completion.text.trim();
    let start = text.find('{').ok_or_else(|| {
        EvalError::invalid_judge_response("no JSON object found in judge output")
    })?;

    let value: serde_json::Value = serde_json::Deserializer::from_str(&text[start..])
        .into_iter::<serde_json::Value>()
        .next()
        .ok_or_else(|| EvalError::invalid_judge_response("no JSON value in judge output"))?
        .map_err(|e| EvalError::invalid_judge_response(format!("invalid judge JSON: {}", e)))?;

    let object = value
        .as_object()
        .ok_or_else(|| EvalError::invalid_judge_response("judge output is not a JSON object"))?;

    let mut dimensions = BTreeMap::new();
    let mut payload_cost = None;

    for (key, entry) in object {
        if COST_KEYS.contains(&key.as_str()) {
            payload_cost = entry.as_f64();
            continue;
        }
        let block = entry.as_object().ok_or_else(|| {
            EvalError::invalid_judge_response(format!(
                "dimension '{}' is not an object",
                key
            ))
        })?;
        let score = block.get("score").and_then(|v| v.as_f64()).ok_or_else(|| {
            EvalError::invalid_judge_response(format!(
                "dimension '{}' missing numeric score",
                key
            ))
        })?;
        let justification = block
            .get("justification")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let issues = block
            .get("issues")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|i| i.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        dimensions.insert(
            key.clone(),
            RawDimensionScore {
                score,
                justification,
                issues,
            },
        );
    }

    if dimensions.is_empty() {
        return Err(EvalError::invalid_judge_response(
            "judge output contains no dimension scores",
        ));
    }

    Ok(RawJudgeResponse {
        dimensions,
        cost_usd: completion.cost_usd.or(payload_cost),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EvalErrorKind;

    fn completion(text: &str) -> JudgeCompletion {
        JudgeCompletion {
            text: text.to_string(),
            provider: "fake".to_string(),
            model: "fake-model".to_string(),
            cost_usd: None,
        }
    }

    #[test]
    fn parses_dimension_map_with_prose_preamble() {
        let raw = parse_completion(&completion(
            r#"Here is my verdict:
               {"accuracy": {"score": 8.5, "justification": "solid", "issues": []},
                "clarity": {"score": 6, "justification": "dense", "issues": ["long sentences"]}}"#,
        ))
        .unwrap();
        assert_eq!(raw.dimensions.len(), 2);
        assert_eq!(raw.dimensions["accuracy"].score, 8.5);
        assert_eq!(raw.dimensions["clarity"].issues, vec!["long sentences"]);
    }

    #[test]
    fn payload_cost_read_when_provider_reports_none() {
        let raw = parse_completion(&completion(
            r#"{"accuracy": {"score": 7, "justification": ""}, "cost": 0.004}"#,
        ))
        .unwrap();
        assert_eq!(raw.cost_usd, Some(0.004));
    }

    #[test]
    fn provider_cost_wins_over_payload_cost() {
        let mut c = completion(r#"{"accuracy": {"score": 7, "justification": ""}, "cost": 0.004}"#);
        c.cost_usd = Some(0.009);
        assert_eq!(parse_completion(&c).unwrap().cost_usd, Some(0.009));
    }

    #[test]
    fn missing_json_is_invalid_response() {
        let err = parse_completion(&completion("I refuse to answer in JSON.")).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::InvalidJudgeResponse);
    }

    #[test]
    fn non_numeric_score_is_invalid_response() {
        let err = parse_completion(&completion(
            r#"{"accuracy": {"score": "great", "justification": ""}}"#,
        ))
        .unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::InvalidJudgeResponse);
        assert!(err.message.contains("accuracy"));
    }

    #[test]
    fn empty_object_is_invalid_response() {
        let err = parse_completion(&completion("{}")).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::InvalidJudgeResponse);
    }
}
