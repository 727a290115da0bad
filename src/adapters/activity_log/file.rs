//! Append-only activity log backed by a local file.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::ports::{ActivityLog, ActivityLogError};

/// Writes one entry per line. Parent directories are created on first use.
pub struct FileActivityLog {
    path: PathBuf,
}

impl FileActivityLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ActivityLog for FileActivityLog {
    async fn append(&self, entry: &str) -> Result<(), ActivityLogError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ActivityLogError::Io(e.to_string()))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| ActivityLogError::Io(e.to_string()))?;

        let mut line = entry.trim_end().to_string();
        line.push('\n');
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| ActivityLogError::Io(e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| ActivityLogError::Io(e.to_string()))
    }
}
