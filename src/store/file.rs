use super::{CredentialStore, CREDENTIAL_KEY};
use crate::models::Credential;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Key-value slots in a JSON object on disk, one of which holds the credential.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_slots(&self) -> Result<BTreeMap<String, String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                Error::Storage(format!(
                    "Failed to parse {}: {}",
                    self.path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_slots(&self, slots: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(slots)?;

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);
        let mut file = options.open(&self.path).await?;

        // A file that already existed keeps its old mode; tighten it before
        // the key is written.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))
                .await?;
        }

        file.write_all(json.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Option<Credential>> {
        let slots = self.read_slots().await?;
        match slots.get(CREDENTIAL_KEY) {
            Some(raw) => match Credential::new(raw.as_str()) {
                Ok(credential) => Ok(Some(credential)),
                Err(_) => {
                    tracing::warn!(
                        "Ignoring blank credential stored in {}",
                        self.path.display()
                    );
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    async fn save(&self, credential: &Credential) -> Result<()> {
        let mut slots = self.read_slots().await?;
        slots.insert(CREDENTIAL_KEY.to_string(), credential.expose().to_string());
        self.write_slots(&slots).await?;
        tracing::debug!("Saved credential to {}", self.path.display());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut slots = self.read_slots().await?;
        if slots.remove(CREDENTIAL_KEY).is_none() {
            return Ok(());
        }

        if slots.is_empty() {
            match tokio::fs::remove_file(&self.path).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        } else {
            self.write_slots(&slots).await?;
        }

        tracing::debug!("Cleared credential from {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> FileCredentialStore {
        FileCredentialStore::new(dir.path().join("nested").join("credentials.json"))
    }

    #[tokio::test]
    async fn test_load_without_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let credential = Credential::new("sk-test").unwrap();

        store.save(&credential).await.unwrap();

        assert_eq!(store.load().await.unwrap(), Some(credential));
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save(&Credential::new("sk-old").unwrap()).await.unwrap();
        store.save(&Credential::new("sk-new").unwrap()).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.expose(), "sk-new");
    }

    #[tokio::test]
    async fn test_clear_then_load_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save(&Credential::new("sk-test").unwrap()).await.unwrap();
        store.clear().await.unwrap();

        assert!(store.load().await.unwrap().is_none());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_clear_without_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_clear_keeps_unrelated_slots() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, r#"{"openai_api_key":"sk-test","theme":"dark"}"#).unwrap();
        let store = FileCredentialStore::new(&path);

        store.clear().await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("theme"));
        assert!(!contents.contains("sk-test"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save(&Credential::new("sk-test").unwrap()).await.unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_save_tightens_existing_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        let store = FileCredentialStore::new(&path);

        store.save(&Credential::new("sk-test").unwrap()).await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(store.load().await.unwrap().unwrap().expose(), "sk-test");
    }

    #[tokio::test]
    async fn test_blank_stored_value_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, r#"{"openai_api_key":"  "}"#).unwrap();

        let store = FileCredentialStore::new(&path);
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileCredentialStore::new(&path);
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }
}
