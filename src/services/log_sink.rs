use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

#[derive(Debug, thiserror::Error)]
pub enum LogSinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Append-only response log.
///
/// One entry per call: `[YYYY-MM-DD HH:MM:SS] <content>`. Structured content is
/// pretty-printed, so an entry may span several physical lines and the file
/// is not a single JSON document.
#[derive(Debug, Clone)]
pub struct LogSink {
    path: PathBuf,
}

impl LogSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append_text(&self, content: &str) -> Result<(), LogSinkError> {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let entry = format!("[{}] {}\n", timestamp, content);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(entry.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }

    pub async fn append_json<T: Serialize + ?Sized>(&self, content: &T) -> Result<(), LogSinkError> {
        let rendered = serde_json::to_string_pretty(content)?;
        self.append_text(&rendered).await
    }

    /// Last `limit` lines of the log, trimmed.
    ///
    /// Reads a snapshot; appends racing with the read are either fully
    /// included or not at all. A missing file reads as empty.
    pub async fn read_recent(&self, limit: usize) -> Result<Vec<String>, LogSinkError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let lines: Vec<&str> = contents.lines().collect();
        let start = lines.len().saturating_sub(limit);

        Ok(lines[start..].iter().map(|l| l.trim().to_string()).collect())
    }
}
