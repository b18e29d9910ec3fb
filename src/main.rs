use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

mod agent;
mod classify;
mod cli;
mod config;
mod content;
mod graph;
mod model;
mod output;
mod render;
mod session;
mod setup_type;
mod staging;
mod util;
mod validate;
mod workflow;

use cli::{Command, RootArgs};

fn main() -> Result<ExitCode> {
    let args = RootArgs::parse();
    init_tracing(args.verbose);

    let config = config::load_effective_config(args.config.as_deref())?;
    let ok = match args.command {
        Command::Classify(cmd) => workflow::run_classify(cmd, &config)?,
        Command::Validate(cmd) => workflow::run_validate(cmd, &config)?,
        Command::Build(cmd) => workflow::run_build(cmd, &config)?,
        Command::Merge(cmd) => workflow::run_merge(cmd, &config)?,
        Command::Chat(cmd) => workflow::run_chat(cmd, &config)?,
        Command::Info(cmd) => workflow::run_info(cmd)?,
    };
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Logs go to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
