//! `sleuth run` command handler (also the default without a subcommand)

use tracing::info;

use sleuth_annotator::{AnnotationEngine, AnnotatorConfig};
use sleuth_core::config::SleuthConfig;

use crate::cli::RunArgs;
use crate::error::CliError;

/// Build the effective annotator configuration from file, env and flags.
pub fn annotator_config(
    args: &RunArgs,
    mut config: SleuthConfig,
) -> Result<AnnotatorConfig, CliError> {
    args.apply(&mut config.annotate);
    config.validate()?;

    let mut annotator_config = AnnotatorConfig::from_core(&config.annotate)?;
    annotator_config.prefix = args.prefix.clone();
    Ok(annotator_config)
}

/// Execute the `run` command.
///
/// Rules are loaded and compiled before any input is read, so a bad rule
/// document fails the run without consuming stdin.
pub async fn execute(args: RunArgs, config: SleuthConfig) -> Result<(), CliError> {
    let annotator_config = annotator_config(&args, config)?;
    let engine = AnnotationEngine::load(annotator_config).await?;

    let skipped = engine.rules().compile_failures().len();
    if skipped > 0 {
        info!(skipped, "running with rules disabled by compile failures");
    }

    let stats = engine.run_stdio().await?;

    info!(
        lines = stats.lines,
        hints = stats.hints,
        sections = stats.sections,
        "annotation finished"
    );

    Ok(())
}
