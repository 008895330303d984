//! Persistence of the last accepted media configuration per session and user.
//!
//! Records are raw JSON strings, stored and returned verbatim. Keys are the
//! pair `(session_id, user_id)`.

use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::errors::StoreError;

const RECORD_EXTENSION: &str = "json";

/// Storage backend for session configuration records.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Returns the stored blob, or `None` if nothing was ever saved for the key.
    async fn get(&self, session_id: &str, user_id: &str) -> Result<Option<String>, StoreError>;

    /// Saves `raw_json`, replacing any previous record for the key.
    async fn put(&self, session_id: &str, user_id: &str, raw_json: &str) -> Result<(), StoreError>;

    /// Users having a record in `session_id`, sorted.
    async fn users(&self, session_id: &str) -> Result<Vec<String>, StoreError>;
}

/// In-memory store, lost with the process.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    records: RwLock<HashMap<String, BTreeMap<String, String>>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn get(&self, session_id: &str, user_id: &str) -> Result<Option<String>, StoreError> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records
            .get(session_id)
            .and_then(|users| users.get(user_id))
            .cloned())
    }

    async fn put(&self, session_id: &str, user_id: &str, raw_json: &str) -> Result<(), StoreError> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records
            .entry(session_id.to_string())
            .or_default()
            .insert(user_id.to_string(), raw_json.to_string());
        Ok(())
    }

    async fn users(&self, session_id: &str) -> Result<Vec<String>, StoreError> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records
            .get(session_id)
            .map(|users| users.keys().cloned().collect())
            .unwrap_or_default())
    }
}

/// File-backed store: one file per record, at `<base>/<session>/<user>.json`.
///
/// Writes go through a temporary file renamed over the target, so a reader
/// never sees a partially written record.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    base_dir: PathBuf,
}

impl FileConfigStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Opens the store in the directory configured by pmoconfig.
    #[cfg(feature = "pmoconfig")]
    pub fn from_config() -> anyhow::Result<Self> {
        use crate::config_ext::MediaStoreConfigExt;

        let dir = pmoconfig::get_config().config_store_dir()?;
        Ok(Self::new(dir))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn session_dir(&self, session_id: &str) -> Result<PathBuf, StoreError> {
        check_key(session_id)?;
        Ok(self.base_dir.join(session_id))
    }

    fn record_path(&self, session_id: &str, user_id: &str) -> Result<PathBuf, StoreError> {
        check_key(user_id)?;
        Ok(self
            .session_dir(session_id)?
            .join(format!("{user_id}.{RECORD_EXTENSION}")))
    }
}

/// Keys become path components: anything that could escape the session
/// directory or hide the file is refused.
fn check_key(key: &str) -> Result<(), StoreError> {
    let invalid = key.trim().is_empty()
        || key.starts_with('.')
        || key.contains(['/', '\\', '\0'])
        || key.contains("..");
    if invalid {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn get(&self, session_id: &str, user_id: &str) -> Result<Option<String>, StoreError> {
        let path = self.record_path(session_id, user_id)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => {
                debug!(path = %path.display(), "Loaded session config record");
                Ok(Some(raw))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    async fn put(&self, session_id: &str, user_id: &str, raw_json: &str) -> Result<(), StoreError> {
        let path = self.record_path(session_id, user_id)?;
        let dir = self.session_dir(session_id)?;

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::io(&dir, e))?;

        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, raw_json.as_bytes())
            .await
            .map_err(|e| {
                error!(path = %temp_path.display(), error = %e, "Failed to write temp file");
                StoreError::io(&temp_path, e)
            })?;

        if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            error!(
                from = %temp_path.display(),
                to = %path.display(),
                error = %e,
                "Failed to rename temp file to target"
            );
            return Err(StoreError::io(path, e));
        }

        info!(
            session = session_id,
            user = user_id,
            path = %path.display(),
            "Session config saved"
        );
        Ok(())
    }

    async fn users(&self, session_id: &str) -> Result<Vec<String>, StoreError> {
        let dir = self.session_dir(session_id)?;
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(dir, e)),
        };

        let mut users = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(&dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            if let Some(user) = path.file_stem().and_then(|stem| stem.to_str()) {
                users.push(user.to_string());
            }
        }
        users.sort();
        Ok(users)
    }
}
