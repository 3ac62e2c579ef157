//! CLI-specific error types and exit code mapping

use sleuth_annotator::AnnotatorError;
use sleuth_core::error::SleuthError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// The rule document could not be read or downloaded.
    #[error("{0}")]
    RuleFetch(String),

    /// The rule document could not be decoded.
    #[error("{0}")]
    RuleParse(String),

    /// One or more rule patterns failed to compile.
    #[error("{0}")]
    InvalidPattern(String),

    /// Reading or annotating the input stream failed.
    #[error("stream error: {0}")]
    Stream(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from sleuth-core.
    #[error("{0}")]
    Core(#[from] SleuthError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                               |
    /// |------|---------------------------------------|
    /// | 0    | Success                               |
    /// | 1    | General / command error               |
    /// | 2    | Configuration error                   |
    /// | 3    | Rule document fetch failed            |
    /// | 4    | Rule document parse failed            |
    /// | 5    | Invalid rule pattern                  |
    /// | 6    | Input stream error                    |
    /// | 10   | IO error                              |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(SleuthError::Config(_)) => 2,
            Self::RuleFetch(_) => 3,
            Self::RuleParse(_) => 4,
            Self::InvalidPattern(_) => 5,
            Self::Stream(_) => 6,
            Self::Io(_) | Self::Core(SleuthError::Io(_)) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) => 1,
        }
    }

    /// Whether the error is a closed stdout (e.g. `sleuth | head`).
    pub fn is_broken_pipe(&self) -> bool {
        match self {
            Self::Io(e) | Self::Core(SleuthError::Io(e)) => {
                e.kind() == std::io::ErrorKind::BrokenPipe
            }
            _ => false,
        }
    }
}

impl From<AnnotatorError> for CliError {
    fn from(e: AnnotatorError) -> Self {
        match e {
            AnnotatorError::ConfigFetch { .. } => Self::RuleFetch(e.to_string()),
            AnnotatorError::ConfigParse { .. } => Self::RuleParse(e.to_string()),
            AnnotatorError::PatternCompile(_) | AnnotatorError::InvalidPatterns(_) => {
                Self::InvalidPattern(e.to_string())
            }
            AnnotatorError::StreamRead { .. }
            | AnnotatorError::EmptyLine { .. }
            | AnnotatorError::Channel(_)
            | AnnotatorError::Task(_) => Self::Stream(e.to_string()),
            AnnotatorError::Config { .. } => Self::Config(e.to_string()),
            AnnotatorError::Io(io) => Self::Io(io),
        }
    }
}
