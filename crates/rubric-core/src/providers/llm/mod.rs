pub mod fake;
pub mod openai;

use crate::errors::EvalError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Raw completion from the judge provider, before any score parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeCompletion {
    pub text: String,
    pub provider: String,
    pub model: String,
    /// Spend derived from provider usage figures; `None` when not reported.
    pub cost_usd: Option<f64>,
}

/// Narrow seam to the external completion service. Implementations map
/// their transport failures onto `EvalError` kinds so the retry policy can
/// classify them without knowing the provider.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<JudgeCompletion, EvalError>;

    fn provider_name(&self) -> &'static str;
}
