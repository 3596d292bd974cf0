use crate::cli::args::CompareArgs;
use crate::cli::context::build_engine;
use crate::exit_codes;
use anyhow::Context as _;
use rubric_core::report::{console, json};
use std::path::Path;

pub async fn run(config: &Path, as_json: bool, args: CompareArgs) -> anyhow::Result<i32> {
    let (engine, _cfg) = build_engine(config)?;

    let candidate = std::fs::read_to_string(&args.candidate)
        .with_context(|| format!("reading {}", args.candidate.display()))?;
    let reference = std::fs::read_to_string(&args.reference)
        .with_context(|| format!("reading {}", args.reference.display()))?;

    match engine
        .compare_with_reference(&candidate, &reference, &args.content_type)
        .await
    {
        Ok(comparison) => {
            if as_json {
                json::to_stdout(&comparison)?;
            } else {
                console::print_comparison(&comparison);
            }
            Ok(exit_codes::SUCCESS)
        }
        Err(err) => {
            eprintln!("comparison failed: {}", err);
            Ok(exit_codes::for_error(&err))
        }
    }
}
