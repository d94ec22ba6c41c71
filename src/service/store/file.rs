//! JSON file implementation of the chat store.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::base::types::{ChatId, Res, Void};

use super::GenericChatStore;

/// On-disk layout of the state file.
///
/// Keys this store does not know about are carried through rewrites untouched.
#[serde_as]
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StateFile {
    /// Older files store the id as a string.
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    chat_id: Option<ChatId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    registered_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Chat store backed by a small JSON file.
#[derive(Debug)]
pub struct FileChatStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles.
    lock: Mutex<()>,
}

impl FileChatStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the state file; a missing or unreadable file reads as empty.
    async fn read(&self) -> StateFile {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return StateFile::default(),
            Err(e) => {
                warn!("Failed to read `{}`: {}", self.path.display(), e);
                return StateFile::default();
            }
        };

        serde_json::from_str(&text).unwrap_or_else(|e| {
            warn!("Ignoring malformed `{}`: {}", self.path.display(), e);
            StateFile::default()
        })
    }

    async fn write(&self, state: &StateFile) -> Void {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let text = serde_json::to_string_pretty(state)?;

        // Write next to the target and rename, so a crash never leaves half a file.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, text).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        Ok(())
    }
}

#[async_trait]
impl GenericChatStore for FileChatStore {
    async fn get(&self) -> Res<Option<ChatId>> {
        let _guard = self.lock.lock().await;

        Ok(self.read().await.chat_id)
    }

    #[instrument(skip(self))]
    async fn set(&self, chat_id: ChatId) -> Void {
        let _guard = self.lock.lock().await;

        let mut state = self.read().await;
        state.chat_id = Some(chat_id);
        state.registered_at = Some(Utc::now());

        self.write(&state).await?;

        info!("Chat `{}` registered in `{}`.", chat_id, self.path.display());

        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Void {
        let _guard = self.lock.lock().await;

        let mut state = self.read().await;
        state.chat_id = None;
        state.registered_at = None;

        self.write(&state).await?;

        info!("Registered chat cleared in `{}`.", self.path.display());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileChatStore::new(dir.path().join("state.json"));

        assert_eq!(store.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_get_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileChatStore::new(dir.path().join("nested").join("state.json"));

        store.set(-100500).await.unwrap();
        assert_eq!(store.get().await.unwrap(), Some(-100500));

        // A fresh instance sees the persisted value.
        let reopened = FileChatStore::new(store.path());
        assert_eq!(reopened.get().await.unwrap(), Some(-100500));

        store.clear().await.unwrap();
        assert_eq!(store.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reads_string_id_and_keeps_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, r#"{ "chatId": "12345", "theme": "dark" }"#).unwrap();

        let store = FileChatStore::new(&path);
        assert_eq!(store.get().await.unwrap(), Some(12345));

        store.clear().await.unwrap();

        let saved: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved, serde_json::json!({ "theme": "dark" }));
    }

    #[tokio::test]
    async fn test_writes_numeric_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let store = FileChatStore::new(&path);

        store.set(77).await.unwrap();

        let saved: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["chatId"], serde_json::json!(77));
        assert!(saved["registeredAt"].is_string());
    }

    #[tokio::test]
    async fn test_malformed_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileChatStore::new(&path);
        assert_eq!(store.get().await.unwrap(), None);

        store.set(1).await.unwrap();
        assert_eq!(store.get().await.unwrap(), Some(1));
    }
}
