pub mod parse;

pub use parse::{RawDimensionScore, RawJudgeResponse};

use crate::errors::EvalError;
use crate::providers::llm::LlmClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Retry policy for transient judge failures. Delay grows as
/// `base * 2^retry`, with optional jitter so concurrent batch items do not
/// re-hit a rate-limited provider in lockstep.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(2),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// No retries, no waiting. For tests and fail-fast callers.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            jitter: false,
        }
    }

    pub fn backoff_delay(&self, retry: u32) -> Duration {
        let base = self.base_delay.mul_f64(2f64.powi(retry as i32));
        if self.jitter {
            base.mul_f64(1.0 + rand::random::<f64>() * 0.25)
        } else {
            base
        }
    }
}

/// Client for the external judge service: one outbound call per attempt,
/// bounded by a per-call timeout, retrying only transient failures.
pub struct JudgeClient {
    client: Arc<dyn LlmClient>,
    retry: RetryPolicy,
    call_timeout: Duration,
}

impl JudgeClient {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            retry: RetryPolicy::default(),
            call_timeout: Duration::from_secs(45),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn provider_name(&self) -> &'static str {
        self.client.provider_name()
    }

    /// Send one rendered prompt to the judge and parse its structured
    /// response. Non-transient failures (auth, malformed request, unparsable
    /// response) surface immediately; transient ones retry with backoff and
    /// exhaust into `JudgeUnavailable` carrying the last error.
    pub async fn score(&self, system: &str, prompt: &str) -> Result<RawJudgeResponse, EvalError> {
        let attempts = self.retry.max_retries + 1;
        let mut last_err: Option<EvalError> = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = self.retry.backoff_delay(attempt - 1);
                let delay_ms = delay.as_millis() as u64;
                warn!(
                    attempt,
                    delay_ms, "transient judge failure, backing off before retry"
                );
                tokio::time::sleep(delay).await;
            }

            let call = self.client.complete(system, prompt);
            match timeout(self.call_timeout, call).await {
                Err(_) => {
                    last_err = Some(EvalError::provider_timeout(
                        self.client.provider_name(),
                        format!("judge call exceeded {:?}", self.call_timeout),
                    ));
                }
                Ok(Err(err)) if err.is_transient() => {
                    debug!(kind = err.kind.as_str(), "judge attempt failed");
                    last_err = Some(err);
                }
                Ok(Err(err)) => return Err(err),
                Ok(Ok(completion)) => return parse::parse_completion(&completion),
            }
        }

        // last_err is always set here: the loop only falls through after at
        // least one transient failure.
        let last = last_err
            .unwrap_or_else(|| EvalError::internal("retry loop exited without an error"));
        Err(EvalError::judge_unavailable(attempts, &last))
    }
}
