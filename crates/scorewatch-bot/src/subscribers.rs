use crate::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Chats that receive broadcasts
#[async_trait]
pub trait SubscriberRegistry: Send + Sync {
    /// Returns `false` if the chat was already subscribed
    async fn add(&self, chat_id: i64) -> Result<bool>;

    /// Returns `false` if the chat was not subscribed
    async fn remove(&self, chat_id: i64) -> Result<bool>;

    /// Subscribed chats in the order they joined
    async fn all(&self) -> Result<Vec<i64>>;
}

#[derive(Debug, Default)]
pub struct MemoryRegistry {
    ids: Mutex<Vec<i64>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriberRegistry for MemoryRegistry {
    async fn add(&self, chat_id: i64) -> Result<bool> {
        Ok(insert(&mut *self.ids.lock().await, chat_id))
    }

    async fn remove(&self, chat_id: i64) -> Result<bool> {
        Ok(delete(&mut *self.ids.lock().await, chat_id))
    }

    async fn all(&self) -> Result<Vec<i64>> {
        Ok(self.ids.lock().await.clone())
    }
}

/// Registry persisted as a JSON array of chat ids
#[derive(Debug)]
pub struct JsonFileRegistry {
    path: PathBuf,
    ids: Mutex<Vec<i64>>,
}

impl JsonFileRegistry {
    /// Load the registry at `path`; a missing file is an empty registry
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let ids = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!("Loaded {} subscribers from {}", ids.len(), path.display());

        Ok(Self {
            path,
            ids: Mutex::new(ids),
        })
    }

    /// `~/.scorewatch/subscribers.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".scorewatch").join("subscribers.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, ids: &[i64]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // Replace atomically
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(ids)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SubscriberRegistry for JsonFileRegistry {
    async fn add(&self, chat_id: i64) -> Result<bool> {
        let mut ids = self.ids.lock().await;
        if !insert(&mut ids, chat_id) {
            return Ok(false);
        }
        self.persist(&ids).await?;
        tracing::info!("Subscribed chat {}", chat_id);
        Ok(true)
    }

    async fn remove(&self, chat_id: i64) -> Result<bool> {
        let mut ids = self.ids.lock().await;
        if !delete(&mut ids, chat_id) {
            return Ok(false);
        }
        self.persist(&ids).await?;
        tracing::info!("Unsubscribed chat {}", chat_id);
        Ok(true)
    }

    async fn all(&self) -> Result<Vec<i64>> {
        Ok(self.ids.lock().await.clone())
    }
}

fn insert(ids: &mut Vec<i64>, chat_id: i64) -> bool {
    if ids.contains(&chat_id) {
        return false;
    }
    ids.push(chat_id);
    true
}

fn delete(ids: &mut Vec<i64>, chat_id: i64) -> bool {
    let before = ids.len();
    ids.retain(|&id| id != chat_id);
    ids.len() != before
}
