use crate::cli::args::EvaluateArgs;
use crate::cli::context::build_engine;
use crate::exit_codes;
use anyhow::Context as _;
use rubric_core::model::EvaluationRequest;
use rubric_core::report::{console, json};
use std::path::Path;

pub async fn run(config: &Path, as_json: bool, args: EvaluateArgs) -> anyhow::Result<i32> {
    let (engine, _cfg) = build_engine(config)?;

    let content = std::fs::read_to_string(&args.content)
        .with_context(|| format!("reading {}", args.content.display()))?;
    let target_id = args.target_id.unwrap_or_else(|| {
        args.content
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "content".to_string())
    });

    let request = EvaluationRequest::new(target_id, content)
        .with_content_type(args.content_type)
        .with_audience(args.audience);

    match engine.evaluate_content(request).await {
        Ok(result) => {
            if as_json {
                json::to_stdout(&result)?;
            } else {
                console::print_evaluation(&result);
            }
            Ok(exit_codes::SUCCESS)
        }
        Err(err) => {
            eprintln!("evaluation failed: {}", err);
            Ok(exit_codes::for_error(&err))
        }
    }
}
