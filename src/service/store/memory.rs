//! In-process chat store, used in tests and when nothing needs to survive a restart.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::base::types::{ChatId, Res, Void};

use super::GenericChatStore;

#[derive(Debug, Default)]
pub struct MemoryChatStore {
    chat_id: RwLock<Option<ChatId>>,
}

#[async_trait]
impl GenericChatStore for MemoryChatStore {
    async fn get(&self) -> Res<Option<ChatId>> {
        Ok(*self.chat_id.read().await)
    }

    async fn set(&self, chat_id: ChatId) -> Void {
        *self.chat_id.write().await = Some(chat_id);
        Ok(())
    }

    async fn clear(&self) -> Void {
        *self.chat_id.write().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryChatStore::default();

        assert_eq!(store.get().await.unwrap(), None);

        store.set(3).await.unwrap();
        store.set(4).await.unwrap();
        assert_eq!(store.get().await.unwrap(), Some(4));

        store.clear().await.unwrap();
        assert_eq!(store.get().await.unwrap(), None);
    }
}
