pub mod analytics;
pub mod batch;
pub mod compare;
pub mod evaluate;
pub mod templates;

use crate::cli::args::{Cli, Command};
use crate::exit_codes;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let Cli { config, json, cmd } = cli;
    match cmd {
        Command::Init(args) => {
            rubric_core::config::write_sample_config(&args.path)?;
            eprintln!("wrote {}", args.path.display());
            Ok(exit_codes::SUCCESS)
        }
        Command::Evaluate(args) => evaluate::run(&config, json, args).await,
        Command::Batch(args) => batch::run(&config, json, args).await,
        Command::Compare(args) => compare::run(&config, json, args).await,
        Command::Templates(args) => templates::run(&config, json, args),
        Command::Analytics(args) => analytics::run(&config, json, args),
        Command::Recommend => analytics::recommend(&config, json),
    }
}
