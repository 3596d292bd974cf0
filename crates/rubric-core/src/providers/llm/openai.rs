use super::{JudgeCompletion, LlmClient};
use crate::errors::EvalError;
use async_trait::async_trait;
use serde_json::json;

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Per-1k-token pricing used to turn usage counts into dollars. When the
/// caller does not supply pricing, cost stays unknown rather than zero.
#[derive(Debug, Clone, Copy)]
pub struct TokenPricing {
    pub prompt_per_1k: f64,
    pub completion_per_1k: f64,
}

pub struct OpenAIClient {
    pub model: String,
    pub api_key: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pricing: Option<TokenPricing>,
    client: reqwest::Client,
}

impl OpenAIClient {
    pub fn new(model: String, api_key: String, temperature: f32, max_tokens: u32) -> Self {
        Self {
            model,
            api_key,
            temperature,
            max_tokens,
            pricing: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_pricing(mut self, pricing: TokenPricing) -> Self {
        self.pricing = Some(pricing);
        self
    }

    fn classify_status(&self, status: u16, body: &str) -> EvalError {
        match status {
            401 | 403 => EvalError::provider_auth(self.provider_name(), status),
            400 | 404 | 422 => EvalError::bad_request(
                self.provider_name(),
                format!("chat API rejected request ({}): {}", status, body),
            ),
            408 => EvalError::provider_timeout(
                self.provider_name(),
                format!("chat API timeout ({}): {}", status, body),
            ),
            429 => EvalError::provider_rate_limit(self.provider_name(), status),
            s if s >= 500 => EvalError::provider_server(
                self.provider_name(),
                status,
                format!("chat API error ({}): {}", status, body),
            ),
            _ => EvalError::bad_request(
                self.provider_name(),
                format!("unexpected chat API status {}: {}", status, body),
            ),
        }
    }

    fn classify_transport(&self, err: reqwest::Error) -> EvalError {
        if err.is_timeout() {
            EvalError::provider_timeout(self.provider_name(), err.to_string())
        } else {
            EvalError::network(self.provider_name(), err.to_string())
        }
    }

    fn cost_from_usage(&self, usage: &serde_json::Value) -> Option<f64> {
        let pricing = self.pricing?;
        let prompt = usage.get("prompt_tokens")?.as_f64()?;
        let completion = usage.get("completion_tokens")?.as_f64()?;
        Some(
            prompt / 1000.0 * pricing.prompt_per_1k
                + completion / 1000.0 * pricing.completion_per_1k,
        )
    }
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<JudgeCompletion, EvalError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": prompt },
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "response_format": { "type": "json_object" },
        });

        let resp = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify_transport(e))?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(self.classify_status(status, &body));
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| self.classify_transport(e))?;

        let text = json
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                EvalError::invalid_judge_response("chat API response missing message content")
            })?
            .to_string();

        let cost_usd = json.get("usage").and_then(|u| self.cost_from_usage(u));

        Ok(JudgeCompletion {
            text,
            provider: self.provider_name().to_string(),
            model: self.model.clone(),
            cost_usd,
        })
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}
