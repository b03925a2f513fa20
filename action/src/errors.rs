//! Error types for the deploy action

use thiserror::Error;

/// Main error type for the deploy action
#[derive(Error, Debug)]
pub enum DeployError {
    /// A required input, or a field derived from the inputs, is absent.
    /// The deploy is skipped but the step is not marked failed.
    #[error("{0}")]
    MissingArgument(String),

    /// The combined deploy parameters input is not valid JSON
    #[error("Unable to parse the deploy parameters: {0}")]
    Parse(String),

    /// The deployment service reported a failure, or sent nothing back
    #[error("{0}")]
    DeployFailure(String),

    /// The request never got an answer; reqwest's message is kept as is
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with an error status and no structured body
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Certificate error: {0}")]
    Certificate(String),
}

impl DeployError {
    /// Whether the step should end without being marked failed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DeployError::MissingArgument(_))
    }
}
