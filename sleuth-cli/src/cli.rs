//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use sleuth_core::config::AnnotateConfig;

/// Default configuration file, optional when not given explicitly.
pub const DEFAULT_CONFIG_PATH: &str = "sleuth.toml";

/// sleuth -- annotates build tool output with rule-based hints.
///
/// Pipe a build into it: `colcon build 2>&1 | sleuth`.
/// Use `sleuth <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "sleuth", version, about, long_about = None)]
pub struct Cli {
    /// Path to the sleuth.toml configuration file (default: ./sleuth.toml if present).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format for the rules and config commands.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand; annotates stdin when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Configuration path and whether the user named it explicitly.
    pub fn config_location(&self) -> (PathBuf, bool) {
        match &self.config {
            Some(path) => (path.clone(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        }
    }
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Annotate stdin and write the result to stdout.
    Run(RunArgs),

    /// Inspect and validate rule documents.
    Rules(RulesArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- run ----

/// Execution mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Single synchronous line-at-a-time loop.
    Direct,
    /// Sectionize, annotate and print as concurrent stages.
    Pipeline,
}

/// Annotation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Apply line rules to every line.
    Line,
    /// Apply section rules to every section (pipeline mode only).
    Section,
}

/// Color policy for hint lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorArg {
    /// Color only when stdout is a terminal.
    Auto,
    Always,
    Never,
}

/// Annotate stdin with hints from a rule document.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Rule document: local path or http(s) URL.
    #[arg(short, long)]
    pub rules: Option<String>,

    /// Execution mode.
    #[arg(long)]
    pub mode: Option<ModeArg>,

    /// Annotation strategy.
    #[arg(long)]
    pub strategy: Option<StrategyArg>,

    /// Abort when any rule pattern fails to compile.
    #[arg(long)]
    pub strict: bool,

    /// Prefix printed before every hint (overrides the rule document).
    #[arg(long)]
    pub prefix: Option<String>,

    /// When to color hint lines.
    #[arg(long)]
    pub color: Option<ColorArg>,
}

impl RunArgs {
    /// Apply command-line overrides on top of file and environment settings.
    pub fn apply(&self, config: &mut AnnotateConfig) {
        if let Some(rules) = &self.rules {
            config.rules = rules.clone();
        }
        if let Some(mode) = self.mode {
            config.mode = value_name(mode);
        }
        if let Some(strategy) = self.strategy {
            config.strategy = value_name(strategy);
        }
        if self.strict {
            config.strict = true;
        }
        if let Some(color) = self.color {
            config.color = value_name(color);
        }
    }
}

fn value_name<T: ValueEnum>(value: T) -> String {
    value
        .to_possible_value()
        .map(|v| v.get_name().to_owned())
        .unwrap_or_default()
}

// ---- rules ----

/// Inspect and validate rule documents.
#[derive(Args, Debug)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub action: RulesAction,
}

#[derive(Subcommand, Debug)]
pub enum RulesAction {
    /// List line and section rules of a rule document.
    List {
        /// Rule document (default: annotate.rules from the configuration).
        #[arg(long)]
        rules: Option<String>,
    },
    /// Compile every pattern and report all failures.
    Validate {
        /// Rule document (default: annotate.rules from the configuration).
        #[arg(long)]
        rules: Option<String>,
    },
}

// ---- config ----

/// Manage sleuth configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, annotate).
        #[arg(long)]
        section: Option<String>,
    },
}
