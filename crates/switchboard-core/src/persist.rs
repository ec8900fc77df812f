//! Persisted state - best-effort durability for the registry.
//!
//! The registry snapshots both collections after every mutation and
//! hands the snapshot to a `Persistence` backend. Persistence is not
//! part of the transactional boundary: a failed save is reported to
//! the caller as `Persistence`, but the in-memory mutation stands.
//!
//! The on-disk format is pretty-printed TOML with two ordered record
//! arrays, so the state file stays human-inspectable and editable.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::record::{BotChannelRecord, McpClientRecord};

/// Point-in-time copy of both collections, in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    #[serde(default)]
    pub bot_channels: Vec<BotChannelRecord>,
    #[serde(default)]
    pub mcp_clients: Vec<McpClientRecord>,
}

/// Storage backend seam. One load at startup, one save per mutation.
#[async_trait]
pub trait Persistence: Send + Sync {
    async fn load_all(&self) -> Result<Snapshot>;
    async fn save_all(&self, snapshot: &Snapshot) -> Result<()>;
}

/// TOML file backend - the default for the desktop panel.
pub struct TomlFile {
    path: PathBuf,
}

impl TomlFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default state file location: `<config dir>/switchboard/integrations.toml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("switchboard")
            .join("integrations.toml")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Persistence for TomlFile {
    async fn load_all(&self) -> Result<Snapshot> {
        if !self.path.exists() {
            return Ok(Snapshot::default());
        }
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| RegistryError::Persistence(format!("failed to read state: {e}")))?;
        toml::from_str(&content)
            .map_err(|e| RegistryError::Persistence(format!("failed to parse state: {e}")))
    }

    async fn save_all(&self, snapshot: &Snapshot) -> Result<()> {
        let content = toml::to_string_pretty(snapshot)
            .map_err(|e| RegistryError::Persistence(format!("failed to serialize state: {e}")))?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RegistryError::Persistence(format!("failed to create dir: {e}")))?;
        }
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| RegistryError::Persistence(format!("failed to write state: {e}")))
    }
}

/// In-memory-only backend: loads empty, saves nowhere. Used by tests
/// and `--ephemeral` serving.
#[derive(Debug, Default)]
pub struct Ephemeral;

#[async_trait]
impl Persistence for Ephemeral {
    async fn load_all(&self) -> Result<Snapshot> {
        Ok(Snapshot::default())
    }

    async fn save_all(&self, _snapshot: &Snapshot) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{BotChannelDraft, BotPlatform, McpClientDraft};

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = TomlFile::new(dir.path().join("integrations.toml"));
        let snapshot = backend.load_all().await.unwrap();
        assert_eq!(snapshot, Snapshot::default());
    }

    #[tokio::test]
    async fn snapshot_survives_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let backend = TomlFile::new(dir.path().join("nested").join("integrations.toml"));

        let mut bot = BotChannelDraft::new(BotPlatform::Feishu, "Ops Bot").materialize();
        bot.config.insert("appId".to_string(), "A1".to_string());
        let snapshot = Snapshot {
            bot_channels: vec![bot],
            mcp_clients: vec![
                McpClientDraft::stdio("tavily", "npx -y @tavily/mcp").materialize(),
                McpClientDraft::sse("remote", "https://mcp.example.com/sse").materialize(),
            ],
        };

        backend.save_all(&snapshot).await.unwrap();
        let loaded = backend.load_all().await.unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[tokio::test]
    async fn corrupt_file_reports_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("integrations.toml");
        tokio::fs::write(&path, "not = [valid").await.unwrap();

        let err = TomlFile::new(path).load_all().await.unwrap_err();
        assert!(matches!(err, RegistryError::Persistence(_)));
    }
}
