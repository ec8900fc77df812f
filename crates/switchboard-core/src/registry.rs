//! Registry facade - the authoritative owner of both collections.
//!
//! One `Registry` instance is constructed at process start, loaded
//! from persistence, injected into whatever hosts the command
//! boundary, and shut down (flushing a final snapshot) at exit.
//!
//! All mutating operations serialize on a single lock, so no caller
//! ever observes a half-applied mutation. Nothing awaits external
//! I/O while the lock is held: the snapshot is taken inside the
//! critical section and saved after the guard drops. Event fan-out
//! is fire-and-forget broadcast and never blocks an operation.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::Result;
use crate::event::{ChangeKind, ChangeNotice, EventHub, Family};
use crate::lifecycle::{ConnectorState, LifecycleState};
use crate::persist::{Persistence, Snapshot};
use crate::record::{
    BotChannelDraft, BotChannelPatch, BotChannelRecord, IntegrationRecord, McpClientDraft,
    McpClientRecord,
};
use crate::store::RecordSet;

struct State {
    bot_channels: RecordSet<BotChannelRecord>,
    mcp_clients: RecordSet<McpClientRecord>,
}

impl State {
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            bot_channels: self.bot_channels.list(),
            mcp_clients: self.mcp_clients.list(),
        }
    }
}

/// The integration registry.
pub struct Registry {
    state: Mutex<State>,
    events: EventHub,
    persistence: Arc<dyn Persistence>,
}

impl Registry {
    /// Construct the registry, loading persisted records. A failed
    /// load is non-fatal: the registry starts empty with a warning.
    pub async fn open(persistence: Arc<dyn Persistence>) -> Self {
        let snapshot = match persistence.load_all().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "failed to load persisted state, starting empty");
                Snapshot::default()
            }
        };

        info!(
            bot_channels = snapshot.bot_channels.len(),
            mcp_clients = snapshot.mcp_clients.len(),
            "registry loaded"
        );

        Self {
            state: Mutex::new(State {
                bot_channels: RecordSet::from_records(snapshot.bot_channels),
                mcp_clients: RecordSet::from_records(snapshot.mcp_clients),
            }),
            events: EventHub::default(),
            persistence,
        }
    }

    /// The hub carrying change and lifecycle feeds.
    pub fn events(&self) -> &EventHub {
        &self.events
    }

    /// Flush a final snapshot. Called at process shutdown.
    pub async fn shutdown(&self) -> Result<()> {
        let snapshot = self.state.lock().await.snapshot();
        self.persistence.save_all(&snapshot).await
    }

    // ─── Bot channels ──────────────────────────────────────────

    /// Snapshot of all bot channels, insertion order.
    pub async fn list_bot_channels(&self) -> Vec<BotChannelRecord> {
        self.state.lock().await.bot_channels.list()
    }

    pub async fn create_bot_channel(&self, draft: BotChannelDraft) -> Result<BotChannelRecord> {
        let (record, snapshot) = {
            let mut state = self.state.lock().await;
            let record = state.bot_channels.insert(draft.materialize())?;
            self.notify_created(IntegrationRecord::Bot(record.clone()));
            (record, state.snapshot())
        };
        self.persistence.save_all(&snapshot).await?;
        Ok(record)
    }

    /// Shallow-merge `patch` into the channel under `id`. On a
    /// validation failure the stored record is left unchanged.
    pub async fn update_bot_channel(
        &self,
        id: &str,
        patch: BotChannelPatch,
    ) -> Result<BotChannelRecord> {
        let (record, snapshot) = {
            let mut state = self.state.lock().await;
            let before = state
                .bot_channels
                .get(id)
                .map(|r| r.enabled)
                .unwrap_or_default();
            let record = state.bot_channels.update_with(id, |r| patch.apply(r))?;
            self.notify_updated(IntegrationRecord::Bot(record.clone()), before);
            (record, state.snapshot())
        };
        self.persistence.save_all(&snapshot).await?;
        Ok(record)
    }

    /// Flip `enabled` on a bot channel.
    pub async fn toggle_bot_channel(&self, id: &str) -> Result<BotChannelRecord> {
        let (record, snapshot) = {
            let mut state = self.state.lock().await;
            let record = state.bot_channels.toggle(id)?;
            self.notify_updated(IntegrationRecord::Bot(record.clone()), !record.enabled);
            (record, state.snapshot())
        };
        self.persistence.save_all(&snapshot).await?;
        Ok(record)
    }

    pub async fn delete_bot_channel(&self, id: &str) -> Result<()> {
        let snapshot = {
            let mut state = self.state.lock().await;
            // Teardown intent goes out before the record leaves the
            // store, so a running connector never loses its owner.
            let doomed = state
                .bot_channels
                .get(id)
                .cloned()
                .ok_or_else(|| crate::error::RegistryError::not_found(id))?;
            self.notify_removed(IntegrationRecord::Bot(doomed));
            state.bot_channels.remove(id)?;
            state.snapshot()
        };
        self.persistence.save_all(&snapshot).await
    }

    // ─── MCP clients ───────────────────────────────────────────

    /// Snapshot of all MCP clients, insertion order.
    pub async fn list_mcp_clients(&self) -> Vec<McpClientRecord> {
        self.state.lock().await.mcp_clients.list()
    }

    pub async fn create_mcp_client(&self, draft: McpClientDraft) -> Result<McpClientRecord> {
        let (record, snapshot) = {
            let mut state = self.state.lock().await;
            let record = state.mcp_clients.insert(draft.materialize())?;
            self.notify_created(IntegrationRecord::Mcp(record.clone()));
            (record, state.snapshot())
        };
        self.persistence.save_all(&snapshot).await?;
        Ok(record)
    }

    /// Flip `enabled` on an MCP client, touching nothing else.
    pub async fn toggle_mcp_client(&self, name: &str) -> Result<McpClientRecord> {
        let (record, snapshot) = {
            let mut state = self.state.lock().await;
            let record = state.mcp_clients.toggle(name)?;
            self.notify_updated(IntegrationRecord::Mcp(record.clone()), !record.enabled);
            (record, state.snapshot())
        };
        self.persistence.save_all(&snapshot).await?;
        Ok(record)
    }

    pub async fn delete_mcp_client(&self, name: &str) -> Result<()> {
        let snapshot = {
            let mut state = self.state.lock().await;
            let doomed = state
                .mcp_clients
                .get(name)
                .cloned()
                .ok_or_else(|| crate::error::RegistryError::not_found(name))?;
            self.notify_removed(IntegrationRecord::Mcp(doomed));
            state.mcp_clients.remove(name)?;
            state.snapshot()
        };
        self.persistence.save_all(&snapshot).await
    }

    // ─── Notification plumbing ─────────────────────────────────

    fn notify_created(&self, record: IntegrationRecord) {
        if record.enabled() {
            self.events.publish_lifecycle(crate::event::LifecycleChange::now(
                record.clone(),
                ConnectorState::Enabled,
            ));
        }
        self.events.publish_change(ChangeNotice {
            family: family_of(&record),
            kind: ChangeKind::Created,
            key: record.key().to_string(),
        });
    }

    fn notify_updated(&self, record: IntegrationRecord, was_enabled: bool) {
        if record.enabled() != was_enabled {
            let state = ConnectorState::from(LifecycleState::from_flag(record.enabled()));
            self.events
                .publish_lifecycle(crate::event::LifecycleChange::now(record.clone(), state));
        }
        self.events.publish_change(ChangeNotice {
            family: family_of(&record),
            kind: ChangeKind::Updated,
            key: record.key().to_string(),
        });
    }

    fn notify_removed(&self, record: IntegrationRecord) {
        let key = record.key().to_string();
        let family = family_of(&record);
        self.events.publish_lifecycle(crate::event::LifecycleChange::now(
            record,
            ConnectorState::Removed,
        ));
        self.events.publish_change(ChangeNotice {
            family,
            kind: ChangeKind::Deleted,
            key,
        });
    }
}

fn family_of(record: &IntegrationRecord) -> Family {
    match record {
        IntegrationRecord::Bot(_) => Family::BotChannels,
        IntegrationRecord::Mcp(_) => Family::McpClients,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;
    use crate::persist::Ephemeral;
    use crate::record::BotPlatform;

    async fn registry() -> Registry {
        Registry::open(Arc::new(Ephemeral)).await
    }

    #[tokio::test]
    async fn create_then_list_contains_exactly_the_record() {
        let registry = registry().await;
        let created = registry
            .create_mcp_client(McpClientDraft::stdio("tavily", "npx -y @tavily/mcp"))
            .await
            .unwrap();

        let listed = registry.list_mcp_clients().await;
        assert_eq!(listed, vec![created]);
    }

    #[tokio::test]
    async fn feishu_scenario_create_update_disable() {
        let registry = registry().await;

        let mut draft = BotChannelDraft::new(BotPlatform::Feishu, "Ops Bot");
        draft.config.insert("appId".to_string(), "A1".to_string());
        let created = registry.create_bot_channel(draft).await.unwrap();
        assert!(created.enabled);

        let listed = registry.list_bot_channels().await;
        assert_eq!(listed.len(), 1);
        assert!(listed[0].enabled);

        registry
            .update_bot_channel(
                &created.id,
                BotChannelPatch {
                    enabled: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let after = registry.list_bot_channels().await;
        assert!(!after[0].enabled);
        assert_eq!(after[0].name, created.name);
        assert_eq!(after[0].bot_prefix, created.bot_prefix);
        assert_eq!(after[0].config, created.config);
    }

    #[tokio::test]
    async fn patch_then_inverse_patch_restores_record() {
        let registry = registry().await;
        let created = registry
            .create_bot_channel(BotChannelDraft::new(BotPlatform::Telegram, "tg"))
            .await
            .unwrap();

        let patch = BotChannelPatch {
            name: Some("tg 2".to_string()),
            bot_prefix: Some("!bot".to_string()),
            ..Default::default()
        };
        let inverse = BotChannelPatch {
            name: Some(created.name.clone()),
            bot_prefix: Some(created.bot_prefix.clone()),
            ..Default::default()
        };

        registry.update_bot_channel(&created.id, patch).await.unwrap();
        let restored = registry
            .update_bot_channel(&created.id, inverse)
            .await
            .unwrap();
        assert_eq!(restored, created);
    }

    #[tokio::test]
    async fn tavily_scenario_double_toggle() {
        let registry = registry().await;
        registry
            .create_mcp_client(McpClientDraft::stdio("tavily", "npx -y @tavily/mcp"))
            .await
            .unwrap();

        let once = registry.toggle_mcp_client("tavily").await.unwrap();
        assert!(!once.enabled);
        let twice = registry.toggle_mcp_client("tavily").await.unwrap();
        assert!(twice.enabled);
    }

    #[tokio::test]
    async fn duplicate_mcp_name_is_rejected() {
        let registry = registry().await;
        registry
            .create_mcp_client(McpClientDraft::stdio("tavily", "npx"))
            .await
            .unwrap();

        let err = registry
            .create_mcp_client(McpClientDraft::sse("tavily", "https://example.com/sse"))
            .await
            .unwrap_err();
        assert_eq!(err, RegistryError::duplicate("tavily"));
    }

    #[tokio::test]
    async fn stdio_without_command_fails_sse_with_url_succeeds() {
        let registry = registry().await;

        let mut draft = McpClientDraft::stdio("broken", "");
        draft.command = Some(String::new());
        let err = registry.create_mcp_client(draft).await.unwrap_err();
        assert!(matches!(err, RegistryError::Validation { field, .. } if field == "command"));

        registry
            .create_mcp_client(McpClientDraft::sse("remote", "https://mcp.example.com/sse"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn delete_missing_leaves_collection_unchanged() {
        let registry = registry().await;
        registry
            .create_mcp_client(McpClientDraft::stdio("tavily", "npx"))
            .await
            .unwrap();

        let err = registry.delete_mcp_client("nope").await.unwrap_err();
        assert_eq!(err, RegistryError::not_found("nope"));
        assert_eq!(registry.list_mcp_clients().await.len(), 1);

        let err = registry.delete_bot_channel("missing-id").await.unwrap_err();
        assert_eq!(err, RegistryError::not_found("missing-id"));
    }

    #[tokio::test]
    async fn deleting_enabled_record_publishes_teardown_intent() {
        let registry = registry().await;
        let mut rx = registry.events().subscribe_lifecycle();

        let created = registry
            .create_bot_channel(BotChannelDraft::new(BotPlatform::Discord, "dc"))
            .await
            .unwrap();
        // Creation of an enabled record announces eligibility first.
        let change = rx.recv().await.unwrap();
        assert_eq!(change.state, ConnectorState::Enabled);

        registry.delete_bot_channel(&created.id).await.unwrap();
        let change = rx.recv().await.unwrap();
        assert_eq!(change.state, ConnectorState::Removed);
        assert_eq!(change.record.key(), created.id);
        assert!(registry.list_bot_channels().await.is_empty());
    }

    #[tokio::test]
    async fn toggle_crosses_lifecycle_boundary_once_per_flip() {
        let registry = registry().await;
        registry
            .create_mcp_client(McpClientDraft::stdio("tavily", "npx"))
            .await
            .unwrap();
        let mut rx = registry.events().subscribe_lifecycle();

        registry.toggle_mcp_client("tavily").await.unwrap();
        assert_eq!(rx.recv().await.unwrap().state, ConnectorState::Disabled);

        registry.toggle_mcp_client("tavily").await.unwrap();
        assert_eq!(rx.recv().await.unwrap().state, ConnectorState::Enabled);
    }

    #[tokio::test]
    async fn state_round_trips_through_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("integrations.toml");

        let persistence: Arc<dyn Persistence> =
            Arc::new(crate::persist::TomlFile::new(path.clone()));
        let registry = Registry::open(Arc::clone(&persistence)).await;
        let bot = registry
            .create_bot_channel(BotChannelDraft::new(BotPlatform::Wecom, "wc"))
            .await
            .unwrap();
        registry
            .create_mcp_client(McpClientDraft::stdio("tavily", "npx"))
            .await
            .unwrap();
        registry.shutdown().await.unwrap();

        let reopened =
            Registry::open(Arc::new(crate::persist::TomlFile::new(path))).await;
        assert_eq!(reopened.list_bot_channels().await, vec![bot]);
        assert_eq!(reopened.list_mcp_clients().await.len(), 1);
    }
}
