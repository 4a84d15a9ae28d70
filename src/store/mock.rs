use super::CredentialStore;
use crate::models::Credential;
use crate::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// In-memory credential slot with call counters, for tests and harnesses.
#[derive(Clone, Default)]
pub struct MemoryCredentialStore {
    slot: Arc<Mutex<Option<Credential>>>,
    save_count: Arc<Mutex<usize>>,
    clear_count: Arc<Mutex<usize>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(self, credential: Credential) -> Self {
        *self.slot.lock().unwrap() = Some(credential);
        self
    }

    pub fn current(&self) -> Option<Credential> {
        self.slot.lock().unwrap().clone()
    }

    pub fn get_save_count(&self) -> usize {
        *self.save_count.lock().unwrap()
    }

    pub fn get_clear_count(&self) -> usize {
        *self.clear_count.lock().unwrap()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Result<Option<Credential>> {
        Ok(self.current())
    }

    async fn save(&self, credential: &Credential) -> Result<()> {
        *self.save_count.lock().unwrap() += 1;
        *self.slot.lock().unwrap() = Some(credential.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.clear_count.lock().unwrap() += 1;
        *self.slot.lock().unwrap() = None;
        Ok(())
    }
}
