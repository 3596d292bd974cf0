use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalErrorKind {
    Validation,
    NotFound,
    InvalidJudgeResponse,
    JudgeUnavailable,
    ProviderTimeout,
    ProviderRateLimit,
    ProviderServer,
    ProviderAuth,
    BadRequest,
    Network,
    Storage,
    Internal,
}

impl EvalErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::InvalidJudgeResponse => "invalid_judge_response",
            Self::JudgeUnavailable => "judge_unavailable",
            Self::ProviderTimeout => "provider_timeout",
            Self::ProviderRateLimit => "provider_rate_limit",
            Self::ProviderServer => "provider_server",
            Self::ProviderAuth => "provider_auth",
            Self::BadRequest => "bad_request",
            Self::Network => "network",
            Self::Storage => "storage",
            Self::Internal => "internal",
        }
    }
}

impl Display for EvalErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine error carrying a stable kind tag so callers can branch without
/// string matching. Transport constructors capture provider/status context.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub message: String,
    pub provider: Option<String>,
    pub status: Option<u16>,
    pub detail: Option<String>,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            provider: None,
            status: None,
            detail: None,
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(EvalErrorKind::Validation, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(EvalErrorKind::NotFound, message)
    }

    pub fn invalid_judge_response(message: impl Into<String>) -> Self {
        Self::new(EvalErrorKind::InvalidJudgeResponse, message)
    }

    /// Terminal retry-exhaustion error; keeps the last underlying failure.
    pub fn judge_unavailable(attempts: u32, last: &EvalError) -> Self {
        Self::new(
            EvalErrorKind::JudgeUnavailable,
            format!("judge unavailable after {} attempts: {}", attempts, last),
        )
        .with_detail(last.to_string())
    }

    pub fn provider_timeout(provider: impl Into<String>, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self::new(EvalErrorKind::ProviderTimeout, detail.clone())
            .with_provider(provider)
            .with_detail(detail)
    }

    pub fn provider_rate_limit(provider: impl Into<String>, status: u16) -> Self {
        Self::new(
            EvalErrorKind::ProviderRateLimit,
            format!("provider returned {}", status),
        )
        .with_provider(provider)
        .with_status(status)
    }

    pub fn provider_server(
        provider: impl Into<String>,
        status: u16,
        detail: impl Into<String>,
    ) -> Self {
        let detail = detail.into();
        Self::new(EvalErrorKind::ProviderServer, detail.clone())
            .with_provider(provider)
            .with_status(status)
            .with_detail(detail)
    }

    pub fn provider_auth(provider: impl Into<String>, status: u16) -> Self {
        Self::new(
            EvalErrorKind::ProviderAuth,
            format!("authentication rejected ({})", status),
        )
        .with_provider(provider)
        .with_status(status)
    }

    pub fn bad_request(provider: impl Into<String>, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self::new(EvalErrorKind::BadRequest, detail.clone())
            .with_provider(provider)
            .with_detail(detail)
    }

    pub fn network(provider: impl Into<String>, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self::new(EvalErrorKind::Network, detail.clone())
            .with_provider(provider)
            .with_detail(detail)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(EvalErrorKind::Storage, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(EvalErrorKind::Internal, message)
    }

    /// Whether the retry policy should re-attempt after this failure.
    /// Malformed requests and auth rejections never are.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind,
            EvalErrorKind::ProviderTimeout
                | EvalErrorKind::ProviderRateLimit
                | EvalErrorKind::ProviderServer
                | EvalErrorKind::Network
        )
    }
}

#[derive(Debug)]
pub struct ConfigError(pub String);

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ConfigError: {}", self.0)
    }
}
impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_kinds_are_retryable() {
        assert!(EvalError::provider_timeout("openai", "deadline exceeded").is_transient());
        assert!(EvalError::provider_rate_limit("openai", 429).is_transient());
        assert!(EvalError::provider_server("openai", 503, "unavailable").is_transient());
        assert!(EvalError::network("openai", "dns failure").is_transient());
    }

    #[test]
    fn permanent_kinds_fail_fast() {
        assert!(!EvalError::provider_auth("openai", 401).is_transient());
        assert!(!EvalError::bad_request("openai", "missing model").is_transient());
        assert!(!EvalError::invalid_judge_response("no json").is_transient());
        assert!(!EvalError::validation("empty content").is_transient());
    }

    #[test]
    fn judge_unavailable_keeps_last_error() {
        let last = EvalError::provider_server("openai", 502, "bad gateway");
        let err = EvalError::judge_unavailable(4, &last);
        assert_eq!(err.kind, EvalErrorKind::JudgeUnavailable);
        assert!(err.to_string().contains("after 4 attempts"));
        assert!(err.detail.as_deref().unwrap().contains("bad gateway"));
    }

    #[test]
    fn display_carries_stable_kind_token() {
        let err = EvalError::not_found("template 'x'");
        assert_eq!(err.to_string(), "not_found: template 'x'");
    }
}
