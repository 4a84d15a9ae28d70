//! Error handling and custom error types
//!
//! Provides unified error handling across the crate using thiserror.

use crate::models::{Mode, Operation, Transition};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("An API credential is required for this operation")]
    MissingCredential,

    #[error("Provider API error: {status} {status_text}")]
    Provider {
        status: u16,
        status_text: String,
        body: String,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode provider response: {0}")]
    Decode(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0} is already in progress")]
    Busy(Operation),

    #[error("{0} result discarded: the session changed while the request was in flight")]
    Discarded(Operation),

    #[error("Cannot apply {transition} while {from}")]
    InvalidTransition { from: Mode, transition: Transition },

    #[error("Credential storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),
}

impl Error {
    /// HTTP status carried by a provider rejection, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Provider { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
