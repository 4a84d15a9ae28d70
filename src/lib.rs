//! Advertising brief to image-prompt generator.
//!
//! Takes a short marketing brief, asks a hosted chat model for a structured
//! image-generation prompt (or fills a canned template in simulation mode),
//! and can then request an image for that prompt. The API key lives in a
//! single durable slot managed by [`store::CredentialStore`].

pub mod ai;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod prompts;
pub mod store;

pub use error::{Error, Result};
