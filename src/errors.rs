use thiserror::Error;

use crate::forms::Step;

/// Contract violations raised by the sign-up wizard.
///
/// Validation failures are never reported through this type; they live in the
/// wizard's error map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("`{action}` is not available on {step}")]
    InvalidTransition { action: &'static str, step: Step },
    #[error("Unknown field: `{0}`")]
    UnknownField(String),
}

/// Failures while loading or saving shell preferences.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
}

/// Errors surfaced by the interactive shell.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Line editor error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}
