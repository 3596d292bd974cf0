use anyhow::{bail, Context as _};
use rubric_core::config::{load_config, EngineConfig};
use rubric_core::engine::Engine;
use rubric_core::providers::llm::fake::FakeClient;
use rubric_core::providers::llm::openai::OpenAIClient;
use rubric_core::providers::llm::LlmClient;
use rubric_core::storage::{JsonlStore, MemoryStore, ResultStore};
use std::path::Path;
use std::sync::Arc;

/// Canned response covering every built-in dimension, so `provider: fake`
/// gives working offline/demo runs; the evaluator drops undeclared
/// dimensions per template.
const FAKE_PAYLOAD: &str = r#"{
    "accuracy": {"score": 8, "justification": "claims check out", "issues": []},
    "clarity": {"score": 7, "justification": "mostly plain language", "issues": []},
    "completeness": {"score": 6, "justification": "examples are thin", "issues": ["few examples"]},
    "relevance": {"score": 8, "justification": "on topic throughout", "issues": []},
    "structure": {"score": 7, "justification": "order is sensible", "issues": []},
    "progression": {"score": 7, "justification": "builds step by step", "issues": []},
    "engagement": {"score": 6, "justification": "dry in places", "issues": []}
}"#;

pub fn build_engine(config_path: &Path) -> anyhow::Result<(Engine, EngineConfig)> {
    let cfg = load_config(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let client: Arc<dyn LlmClient> = match cfg.judge.provider.as_str() {
        "fake" => Arc::new(FakeClient::new(cfg.judge.model.clone()).with_response(FAKE_PAYLOAD)),
        "openai" => {
            let api_key = std::env::var(&cfg.judge.api_key_env).with_context(|| {
                format!("judge provider 'openai' needs {} set", cfg.judge.api_key_env)
            })?;
            Arc::new(OpenAIClient::new(
                cfg.judge.model.clone(),
                api_key,
                cfg.judge.temperature,
                cfg.judge.max_tokens,
            ))
        }
        other => bail!("unknown judge provider '{}'", other),
    };

    let store: Arc<dyn ResultStore> = match &cfg.results_path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("creating {}", parent.display()))?;
                }
            }
            Arc::new(JsonlStore::new(path.clone()))
        }
        None => Arc::new(MemoryStore::new()),
    };

    let options = cfg.engine_options();
    tracing::debug!(
        provider = %cfg.judge.provider,
        model = %cfg.judge.model,
        concurrency = ?cfg.batch.concurrency,
        "engine configured"
    );
    Ok((Engine::new(client, store, options), cfg))
}
