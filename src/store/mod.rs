//! Durable storage for the single API credential
//!
//! The orchestrator only sees the [`CredentialStore`] trait; the terminal
//! front-end backs it with a small JSON file and tests use an in-memory slot.

pub mod file;
pub mod mock;

pub use file::FileCredentialStore;
pub use mock::MemoryCredentialStore;

use crate::models::Credential;
use crate::Result;
use async_trait::async_trait;

/// Key under which the credential is persisted.
pub const CREDENTIAL_KEY: &str = "openai_api_key";

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load(&self) -> Result<Option<Credential>>;
    async fn save(&self, credential: &Credential) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}
