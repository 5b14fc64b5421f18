//! Error types for Pipeforge.
//!
//! All errors are represented by the `PipeforgeError` enum. The first four
//! variants are the kinds the editor reacts to; the rest come from the
//! configuration and decoding layers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for all Pipeforge operations.
#[derive(Deserialize, Serialize, Error, Debug, Clone, PartialEq)]
pub enum PipeforgeError {
    /// A referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A required field is missing or a value is invalid. Raised before any
    /// network call when detected locally.
    #[error("{0}")]
    Validation(String),

    /// The backend refused the operation because of a dependent reference.
    /// The message is the server's, verbatim.
    #[error("{0}")]
    Conflict(String),

    /// Transport failure or unexpected response from the backend.
    #[error("{0}")]
    Network(String),

    /// Configuration parsing or backend wiring errors.
    #[error("{0}")]
    Config(String),

    /// A backend response body could not be decoded.
    #[error("{0}")]
    Convert(String),
}

impl PipeforgeError {
    /// Message shown to the user when an operation fails.
    ///
    /// Transport failures get a generic text; everything else is shown as is.
    pub fn user_message(&self) -> String {
        match self {
            PipeforgeError::Network(_) => "The request could not be completed. Please try again later.".to_string(),
            other => other.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PipeforgeError::NotFound(_))
    }
}

impl From<toml::de::Error> for PipeforgeError {
    fn from(error: toml::de::Error) -> Self {
        PipeforgeError::Config(error.to_string())
    }
}

impl From<reqwest::Error> for PipeforgeError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            return PipeforgeError::Convert(error.to_string());
        }
        PipeforgeError::Network(error.to_string())
    }
}
