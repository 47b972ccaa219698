mod actions;
mod cli;
mod config;
mod error;
mod registry;
mod runner;
mod sequence;
mod ui;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Command};
use config::RunbookConfig;
use runner::{ActionRunner, CancelHandle};
use sequence::parse_spec;
use ui::RunProgress;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = RunbookConfig::load(&cli.config)?;

    match &cli.command {
        Command::Run { sequence } => {
            let exit_code = run_sequence(&cli, &config, sequence).await?;
            std::process::exit(exit_code);
        }
        Command::List => {
            list_actions(&config)?;
        }
    }

    Ok(())
}

async fn run_sequence(cli: &Cli, config: &RunbookConfig, sequence: &str) -> Result<i32> {
    let mut steps = parse_spec(sequence)?;
    for step in &mut steps {
        step.post_delay_ms = config
            .post_delay_for(&step.action)
            .or(cli.delay_ms)
            .or((config.default_delay_ms > 0).then_some(config.default_delay_ms));
    }

    let registry = actions::build_registry(config)?;
    let progress = RunProgress::start();
    let runner = ActionRunner::new(Arc::new(registry))
        .abort_on_failure(cli.abort_on_failure || config.abort_on_failure)
        .default_timeout_ms((config.default_timeout_ms > 0).then_some(config.default_timeout_ms))
        .with_progress(progress.clone());

    // Ctrl-C asks the run to stop; the in-flight step finishes first.
    let (handle, token) = CancelHandle::new();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.cancel();
        }
    });

    let result = runner.run(&steps, token).await;
    progress.finish(&result);
    if cli.verbose {
        progress.print_audit(&result);
    }
    Ok(result.exit_code())
}

fn list_actions(config: &RunbookConfig) -> Result<()> {
    // Builds the registry so duplicate ids in the file surface here too.
    let registry = actions::build_registry(config)?;
    if registry.is_empty() {
        println!("No actions configured.");
        return Ok(());
    }

    println!("{} action(s):", registry.len());
    for id in registry.ids() {
        // Every registered id comes from the config, so the lookup succeeds.
        if let Some(action) = config.actions.iter().find(|a| a.id == id) {
            let timeout = action
                .timeout_ms
                .map(|ms| format!("{ms}ms"))
                .unwrap_or_else(|| "default".into());
            let delay = action
                .post_delay_ms
                .map(|ms| format!("{ms}ms"))
                .unwrap_or_else(|| "none".into());
            println!(
                "  {:<24} timeout: {:<10} post-delay: {:<8} {}",
                action.id, timeout, delay, action.command
            );
        }
    }
    Ok(())
}
