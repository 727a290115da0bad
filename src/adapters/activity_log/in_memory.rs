//! In-memory activity log for tests and ephemeral runs.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::ports::{ActivityLog, ActivityLogError};

#[derive(Default)]
pub struct InMemoryActivityLog {
    entries: RwLock<Vec<String>>,
}

impl InMemoryActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entries(&self) -> Vec<String> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl ActivityLog for InMemoryActivityLog {
    async fn append(&self, entry: &str) -> Result<(), ActivityLogError> {
        self.entries.write().await.push(entry.to_string());
        Ok(())
    }
}
