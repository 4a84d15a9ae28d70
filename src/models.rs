//! Data models and structures
//!
//! Defines the credential and brief value types, the session mode with its
//! transition table, and the operation labels used in notices.

use crate::{Error, Result};
use std::fmt;

/// Opaque API token. Only ever leaves the process as a bearer header.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Accepts any string that is non-empty after trimming; the format is only
    /// checked by the provider.
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation(
                "Please enter an API key before continuing.".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Free-form marketing brief, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Brief(String);

impl Brief {
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(Error::Validation(
                "Please enter a brief before generating the prompt.".to_string(),
            ));
        }
        Ok(Self(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Unconfigured,
    Simulated,
    Live,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    SubmitCredential,
    ChooseSimulation,
    Reset,
    SwitchMode,
}

impl Mode {
    /// The transition table. `None` means the intent is not available from
    /// this mode.
    pub fn apply(self, transition: Transition) -> Option<Mode> {
        use Mode::*;
        use Transition::*;

        match (self, transition) {
            (Unconfigured, SubmitCredential) => Some(Live),
            (Unconfigured, ChooseSimulation) => Some(Simulated),
            (Simulated | Live, Reset) => Some(Unconfigured),
            // Leaving simulation re-presents the credential form.
            (Simulated, SwitchMode) => Some(Unconfigured),
            (Live, SwitchMode) => Some(Simulated),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Mode::Unconfigured => "unconfigured",
            Mode::Simulated => "simulated",
            Mode::Live => "live",
        };
        f.write_str(label)
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Transition::SubmitCredential => "credential submission",
            Transition::ChooseSimulation => "simulation choice",
            Transition::Reset => "reset",
            Transition::SwitchMode => "mode switch",
        };
        f.write_str(label)
    }
}

/// The two independently tracked provider operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Prompt,
    Image,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Prompt => f.write_str("Prompt generation"),
            Operation::Image => f.write_str("Image generation"),
        }
    }
}
