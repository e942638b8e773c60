use router::{build, AutoApproveGate, ConfigError, RouteOptions, RouterConfig};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Usage(String),
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("router error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), CliError> {
    let mut config_path: Option<PathBuf> = None;
    let mut principal: String = "default".to_string();
    let mut prompt: Option<String> = None;
    let mut tool: Option<String> = None;
    let mut params: Option<String> = None;

    let mut remaining: Vec<String> = std::env::args().skip(1).collect();
    while let Some(flag) = remaining.first().cloned() {
        remaining.remove(0);
        match flag.as_str() {
            "--config" => config_path = Some(PathBuf::from(take_arg("--config", &mut remaining)?)),
            "--principal" => principal = take_arg("--principal", &mut remaining)?,
            "--prompt" => prompt = Some(take_arg("--prompt", &mut remaining)?),
            "--tool" => tool = Some(take_arg("--tool", &mut remaining)?),
            "--params" => params = Some(take_arg("--params", &mut remaining)?),
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            other => return Err(CliError::Usage(format!("unknown flag: {other}"))),
        }
    }

    let config = match config_path {
        Some(path) => RouterConfig::from_path(&path)?,
        None => {
            let default_path = PathBuf::from("router.toml");
            if default_path.exists() {
                RouterConfig::from_path(&default_path)?
            } else {
                RouterConfig::default()
            }
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(config.log_level.clone()))
        .init();

    let (facade, load_report) = build(&config, Arc::new(AutoApproveGate))?;
    for failure in &load_report.failed {
        tracing::warn!(unit_path = %failure.unit_path, error = %failure.error_message, "tool unit failed to load");
    }
    tracing::info!(loaded = load_report.loaded_count, "tool discovery complete");

    if let Some(tool_name) = tool {
        let parsed_params: serde_json::Value = match params {
            Some(text) => serde_json::from_str(&text).map_err(|e| CliError::Usage(format!("invalid --params JSON: {e}")))?,
            None => serde_json::json!({}),
        };
        let result = facade
            .execute_tool(&principal, &tool_name, parsed_params, &Default::default())
            .await;
        println!("{}", serde_json::to_string_pretty(&result).expect("ToolResult is always serializable"));
    } else {
        let user_message = match prompt {
            Some(text) => text,
            None => {
                let mut buffer = String::new();
                std::io::Read::read_to_string(&mut std::io::stdin(), &mut buffer)
                    .map_err(|e| CliError::Usage(format!("could not read stdin: {e}")))?;
                let trimmed = buffer.trim().to_string();
                if trimmed.is_empty() {
                    return Err(CliError::Usage("missing prompt: pass --prompt or pipe stdin".to_string()));
                }
                trimmed
            }
        };
        let result = facade.route_and_execute(&principal, &user_message, &RouteOptions::default()).await;
        println!("{}", serde_json::to_string_pretty(&result).expect("ExecutionResult is always serializable"));
    }

    facade.close().await;
    Ok(())
}

fn take_arg(flag: &str, remaining: &mut Vec<String>) -> Result<String, CliError> {
    if remaining.is_empty() {
        return Err(CliError::Usage(format!("missing value for {flag}")));
    }
    Ok(remaining.remove(0))
}

fn print_usage() {
    println!(
        "router [--config router.toml] [--principal NAME] [--prompt TEXT] [--tool NAME --params JSON]\n\
If neither --prompt nor --tool is given, the prompt is read from stdin."
    );
}
