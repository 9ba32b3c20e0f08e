mod cli;
mod config;
mod error;
mod executor;
mod k8s;
mod locator;
mod materializer;
mod model;
mod namespaces;
mod prompt;
#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{CliArgs, Command};
use config::PluginConfig;
use executor::{Executor, OutputFormat};
use k8s::KubeGateway;
use prompt::DialoguerPrompter;
use std::io::{self, Write};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(&args.log_filter)?;

    let config = PluginConfig::load(args.config.as_deref())?;
    debug!(
        source = config.source.as_deref().unwrap_or("-"),
        pipeline = %config.kinds.pipeline,
        "configuration resolved"
    );

    let gateway = KubeGateway::new(args.context.clone()).await?;
    debug!(
        context = gateway.context(),
        cluster = gateway.cluster(),
        "connected"
    );
    let prompter = DialoguerPrompter::new(config.editor.clone());
    let executor = Executor::new(&gateway, &prompter, &config.kinds);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(&executor, &gateway, &config, args.command, &args.args, &mut out).await?;
    out.flush().context("failed to flush stdout")?;
    Ok(())
}

async fn run(
    executor: &Executor<'_>,
    gateway: &KubeGateway,
    config: &PluginConfig,
    command: Option<Command>,
    root_args: &[String],
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        None => {
            executor.list(root_args, out).await?;
        }
        Some(Command::View { args, output }) => {
            executor
                .view(&args, OutputFormat::from(output), out)
                .await?;
        }
        Some(Command::Delete { args }) => {
            executor.delete(&args, out).await?;
        }
        Some(Command::Edit { args }) => {
            if let Err(error) = executor.edit(&args, out).await {
                if error.is_commit_failure() {
                    warn!(
                        "changes were not applied, run edit again to start from the current server version"
                    );
                }
                return Err(error.into());
            }
        }
        Some(Command::Namespaces) => {
            for namespace in namespaces::list_namespaces(gateway, &config.kinds).await {
                writeln!(out, "{namespace}")?;
            }
        }
    }
    Ok(())
}

fn init_tracing(level_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level_filter)
        .or_else(|_| EnvFilter::try_new("warn"))
        .context("failed to initialize tracing filter")?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .try_init();

    Ok(())
}
