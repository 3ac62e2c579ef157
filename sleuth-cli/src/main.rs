//! sleuth -- annotates build tool output with rule-based hints.
//!
//! ```text
//! colcon build 2>&1 | sleuth --rules https://example.com/ros-rules.yml
//! ```

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;

use crate::cli::{Cli, Commands, RunArgs};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(()) => 0,
        // downstream closed (e.g. `| head`), not a failure
        Err(e) if e.is_broken_pipe() => 0,
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    };

    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let (config_path, explicit) = cli.config_location();
    let loaded = commands::config::load_config(&config_path, explicit).await;

    // Logging comes up even when the config is broken so `config validate` can report it.
    let mut general = loaded
        .as_ref()
        .map(|c| c.general.clone())
        .unwrap_or_default();
    if let Some(level) = &cli.log_level {
        general.log_level = level.clone();
    }
    logging::init_tracing(&general)?;

    tracing::debug!(config = %config_path.display(), explicit, "sleuth starting");

    let writer = OutputWriter::new(cli.output);

    match cli.command {
        Some(Commands::Config(args)) => {
            commands::config::execute(args, &config_path, explicit, &writer).await
        }
        Some(Commands::Rules(args)) => commands::rules::execute(args, &loaded?, &writer).await,
        Some(Commands::Run(args)) => commands::run::execute(args, loaded?).await,
        None => commands::run::execute(RunArgs::default(), loaded?).await,
    }
}
