use super::{JudgeCompletion, LlmClient};
use crate::errors::EvalError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

enum Scripted {
    Text(String),
    Error(EvalError),
}

/// Deterministic offline client. Replays a scripted sequence of completions
/// and failures; once the script is exhausted it keeps returning the fixed
/// response, so identical inputs get identical outputs.
pub struct FakeClient {
    model: String,
    fixed_response: Option<String>,
    script: Mutex<VecDeque<Scripted>>,
    cost_usd: Option<f64>,
}

impl FakeClient {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            fixed_response: None,
            script: Mutex::new(VecDeque::new()),
            cost_usd: None,
        }
    }

    /// Response returned whenever the script is empty.
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.fixed_response = Some(response.into());
        self
    }

    /// Cost attached to every successful completion.
    pub fn with_cost(mut self, cost_usd: f64) -> Self {
        self.cost_usd = Some(cost_usd);
        self
    }

    pub fn push_text(&self, text: impl Into<String>) {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Text(text.into()));
    }

    pub fn push_error(&self, err: EvalError) {
        self.script.lock().unwrap().push_back(Scripted::Error(err));
    }
}

#[async_trait]
impl LlmClient for FakeClient {
    async fn complete(&self, _system: &str, _prompt: &str) -> Result<JudgeCompletion, EvalError> {
        let next = self.script.lock().unwrap().pop_front();
        let text = match next {
            Some(Scripted::Error(err)) => return Err(err),
            Some(Scripted::Text(text)) => text,
            None => self.fixed_response.clone().ok_or_else(|| {
                EvalError::internal("fake client script exhausted and no fixed response set")
            })?,
        };

        Ok(JudgeCompletion {
            text,
            provider: self.provider_name().to_string(),
            model: self.model.clone(),
            cost_usd: self.cost_usd,
        })
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}
