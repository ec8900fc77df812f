//! Event hub - async pub/sub fan-out for registry changes.
//!
//! Two feeds run over tokio broadcast channels:
//! - the change feed, which tells listeners (typically a render
//!   refresh) that a collection mutated and should be re-read;
//! - the lifecycle feed, which tells the connector supervisor that a
//!   record became eligible or ineligible to run, or was removed.
//!
//! Delivery is at-least-once and fire-and-forget: publishing never
//! blocks a registry operation, and subscribers are expected to
//! re-read current state rather than trust event payloads alone.

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::lifecycle::ConnectorState;
use crate::record::IntegrationRecord;

/// Which collection a change touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    BotChannels,
    McpClients,
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BotChannels => write!(f, "bot_channels"),
            Self::McpClients => write!(f, "mcp_clients"),
        }
    }
}

/// What kind of mutation happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// A collection changed; listeners should re-read it.
#[derive(Debug, Clone)]
pub struct ChangeNotice {
    pub family: Family,
    pub kind: ChangeKind,
    pub key: String,
}

/// A record's connector eligibility changed.
#[derive(Debug, Clone)]
pub struct LifecycleChange {
    pub record: IntegrationRecord,
    pub state: ConnectorState,
    pub at: DateTime<Utc>,
}

impl LifecycleChange {
    pub fn now(record: IntegrationRecord, state: ConnectorState) -> Self {
        Self {
            record,
            state,
            at: Utc::now(),
        }
    }
}

/// The event hub. Cheap to share; publishing with no subscribers is
/// silently dropped, which is the wanted fire-and-forget behavior.
pub struct EventHub {
    change_tx: broadcast::Sender<ChangeNotice>,
    lifecycle_tx: broadcast::Sender<LifecycleChange>,
}

impl EventHub {
    pub fn new(buffer_size: usize) -> Self {
        let (change_tx, _) = broadcast::channel(buffer_size);
        let (lifecycle_tx, _) = broadcast::channel(buffer_size);
        Self {
            change_tx,
            lifecycle_tx,
        }
    }

    /// Publish a change notice (store -> listeners).
    pub fn publish_change(&self, notice: ChangeNotice) {
        tracing::debug!(family = %notice.family, key = %notice.key, "registry change");
        let _ = self.change_tx.send(notice);
    }

    /// Publish a lifecycle change (store -> connector supervisor).
    pub fn publish_lifecycle(&self, change: LifecycleChange) {
        tracing::debug!(key = %change.record.key(), state = ?change.state, "lifecycle change");
        let _ = self.lifecycle_tx.send(change);
    }

    /// Subscribe to change notices.
    pub fn subscribe_changes(&self) -> broadcast::Receiver<ChangeNotice> {
        self.change_tx.subscribe()
    }

    /// Subscribe to the lifecycle feed.
    pub fn subscribe_lifecycle(&self) -> broadcast::Receiver<LifecycleChange> {
        self.lifecycle_tx.subscribe()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{BotChannelDraft, BotPlatform};

    #[tokio::test]
    async fn lifecycle_feed_delivers_to_subscriber() {
        let hub = EventHub::default();
        let mut rx = hub.subscribe_lifecycle();

        let record = BotChannelDraft::new(BotPlatform::Telegram, "tg").materialize();
        hub.publish_lifecycle(LifecycleChange::now(
            IntegrationRecord::Bot(record.clone()),
            ConnectorState::Enabled,
        ));

        let change = rx.recv().await.unwrap();
        assert_eq!(change.record.key(), record.id);
        assert_eq!(change.state, ConnectorState::Enabled);
    }

    #[test]
    fn publish_without_subscribers_is_a_no_op() {
        let hub = EventHub::default();
        hub.publish_change(ChangeNotice {
            family: Family::McpClients,
            kind: ChangeKind::Deleted,
            key: "tavily".to_string(),
        });
    }
}
