use std::{ops::Deref, path::Path, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{ChatId, Res, Void};

pub mod file;
pub mod memory;

// Traits.

/// Generic store for the single chat registered for autoposting.
///
/// Implementing this trait allows different persistence backends to be used
/// with the event bot.
#[async_trait]
pub trait GenericChatStore: Send + Sync + 'static {
    /// Gets the registered chat, if any.
    async fn get(&self) -> Res<Option<ChatId>>;

    /// Registers `chat_id`, replacing any previously registered chat.
    async fn set(&self, chat_id: ChatId) -> Void;

    /// Forgets the registered chat.
    async fn clear(&self) -> Void;
}

/// Chat store for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatStore {
    /// The store instance.
    pub inner: Arc<dyn GenericChatStore>,
}

impl Deref for ChatStore {
    type Target = dyn GenericChatStore;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl ChatStore {
    pub fn new(inner: Arc<dyn GenericChatStore>) -> Self {
        Self { inner }
    }

    /// Creates a store persisted to a JSON file.
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self::new(Arc::new(file::FileChatStore::new(path)))
    }

    /// Creates a store that only lives as long as the process.
    pub fn memory() -> Self {
        Self::new(Arc::new(memory::MemoryChatStore::default()))
    }
}
