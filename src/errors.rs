use thiserror::Error;

use crate::escalation::EscalationStage;

/// Failure of a call to the RAG backend. Displayed to the user verbatim.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Server error: {status}")]
    Server { status: u16 },

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("Please provide your first name, last name, and student ID.")]
    Validation,

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("cannot {action} while {stage}")]
    InvalidState {
        action: &'static str,
        stage: EscalationStage,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base URL '{url}': {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("base URL must use http or https, got '{0}'")]
    UnsupportedScheme(String),
}
