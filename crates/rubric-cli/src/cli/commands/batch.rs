use crate::cli::args::BatchArgs;
use crate::cli::context::build_engine;
use crate::exit_codes;
use anyhow::Context as _;
use rubric_core::model::EvaluationRequest;
use rubric_core::report::{console, json};
use std::path::Path;

fn read_requests(path: &Path) -> anyhow::Result<Vec<EvaluationRequest>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let mut requests = Vec::new();
    for (no, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let request: EvaluationRequest = serde_json::from_str(line)
            .with_context(|| format!("{}:{}: malformed request", path.display(), no + 1))?;
        requests.push(request);
    }
    Ok(requests)
}

pub async fn run(config: &Path, as_json: bool, args: BatchArgs) -> anyhow::Result<i32> {
    let (engine, _cfg) = build_engine(config)?;
    let requests = read_requests(&args.input)?;

    match engine.batch_evaluate(requests).await {
        Ok(batch) => {
            if as_json {
                json::to_stdout(&batch)?;
            } else {
                console::print_batch(&batch);
            }
            // Per-item failures are data, not an exit condition.
            Ok(exit_codes::SUCCESS)
        }
        Err(err) => {
            eprintln!("batch failed: {}", err);
            Ok(exit_codes::for_error(&err))
        }
    }
}
