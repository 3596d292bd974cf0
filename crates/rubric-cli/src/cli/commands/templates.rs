use crate::cli::args::{TemplatesArgs, TemplatesCmd};
use crate::cli::context::build_engine;
use crate::exit_codes;
use anyhow::Context as _;
use rubric_core::report::json;
use rubric_core::templates::EvaluationTemplate;
use std::path::Path;

pub fn run(config: &Path, as_json: bool, args: TemplatesArgs) -> anyhow::Result<i32> {
    let (engine, _cfg) = build_engine(config)?;

    match args.cmd {
        TemplatesCmd::List => {
            let templates = engine.all_templates();
            if as_json {
                // Serialize through references; Arc itself has no serde impl.
                let rows: Vec<&EvaluationTemplate> =
                    templates.iter().map(|t| t.as_ref()).collect();
                json::to_stdout(&rows)?;
            } else {
                for t in &templates {
                    println!(
                        "{:<16} type={:<12} audiences=[{}] dimensions={}",
                        t.id,
                        t.content_type,
                        t.audiences.join(","),
                        t.dimensions.len()
                    );
                }
            }
            Ok(exit_codes::SUCCESS)
        }
        TemplatesCmd::Recommend {
            content_type,
            audience,
        } => {
            match engine.recommend_template(&content_type, &audience) {
                Some(t) if as_json => json::to_stdout(t.as_ref())?,
                Some(t) => println!("{}", t.id),
                None => println!("no match; evaluation would fall back to 'general'"),
            }
            Ok(exit_codes::SUCCESS)
        }
        TemplatesCmd::Add { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let template: EvaluationTemplate =
                serde_yaml::from_str(&raw).with_context(|| "parsing template YAML")?;
            let id = template.id.clone();
            match engine.create_custom_template(template) {
                Ok(()) => {
                    eprintln!("registered template '{}'", id);
                    Ok(exit_codes::SUCCESS)
                }
                Err(err) => {
                    eprintln!("rejected: {}", err);
                    Ok(exit_codes::for_error(&err))
                }
            }
        }
        TemplatesCmd::Delete { id } => {
            if engine.delete_template(&id) {
                eprintln!("deleted template '{}'", id);
            } else {
                eprintln!("template '{}' was not registered (no-op)", id);
            }
            Ok(exit_codes::SUCCESS)
        }
    }
}
