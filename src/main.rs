use anyhow::{Context, Result};
use clap::Parser;
use serde_json::{Value, json};
use symgraph::cli::{self, AnalyzeFlags};
use symgraph::{Pipeline, grammar, logging};

fn print_json(value: &Value, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{text}");
    Ok(())
}

fn main() -> Result<()> {
    let args = cli::Args::parse();

    match args.command {
        cli::Command::Analyze {
            root,
            include,
            ignore,
            no_gitignore,
            ranking,
            max_workers,
            log_level,
            top,
            pretty,
        } => {
            let options = AnalyzeFlags {
                root,
                include,
                ignore,
                no_gitignore,
                ranking,
                max_workers,
                log_level,
            }
            .into_run_options();
            logging::init(&options.log_level)?;
            let pipeline = Pipeline::new(options)?;
            let (ranked, stats) = pipeline
                .run_with_stats()
                .context("analysis failed")?;

            let output = match top {
                Some(n) => {
                    let nodes: Vec<Value> = ranked
                        .top(n)
                        .into_iter()
                        .map(|(node, rank)| {
                            json!({
                                "id": node.id,
                                "kind": node.kind,
                                "name": node.name,
                                "filePath": node.file_path,
                                "rank": rank,
                            })
                        })
                        .collect();
                    json!({
                        "stats": stats,
                        "digest": ranked.graph().digest(),
                        "ranking": pipeline.options().ranking().as_str(),
                        "top": nodes,
                    })
                }
                None => serde_json::to_value(&ranked)?,
            };
            print_json(&output, pretty)
        }
        cli::Command::Languages => {
            let languages: Vec<Value> = grammar::language_configs()
                .iter()
                .map(|config| {
                    json!({
                        "name": config.name,
                        "extensions": config.extensions,
                    })
                })
                .collect();
            print_json(&Value::Array(languages), true)
        }
    }
}
