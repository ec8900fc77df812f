//! Connector supervisor boundary.
//!
//! The supervisor owns the live side of every integration: spawning
//! stdio processes, opening SSE connections, tearing them down. The
//! registry never does any of that itself; it only publishes
//! lifecycle changes. This module defines the trait a real
//! supervisor implements and the forwarding task that bridges the
//! broadcast feed to it.
//!
//! Delivery is at-least-once. A supervisor must treat every change
//! as a hint and reconcile against current registry state, not
//! replay events as a transaction log.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use switchboard_core::event::LifecycleChange;
use switchboard_core::registry::Registry;

/// What a connector supervisor implements.
#[async_trait]
pub trait ConnectorSupervisor: Send + Sync {
    /// Called whenever a record becomes eligible or ineligible to
    /// run, or is removed. Must be quick; long work belongs in the
    /// supervisor's own tasks.
    async fn on_lifecycle_change(&self, change: LifecycleChange);
}

/// Default supervisor: logs what a real one would do. Useful until a
/// platform connector host is wired in, and in tests.
#[derive(Debug, Default)]
pub struct LoggingSupervisor;

#[async_trait]
impl ConnectorSupervisor for LoggingSupervisor {
    async fn on_lifecycle_change(&self, change: LifecycleChange) {
        info!(
            key = %change.record.key(),
            state = ?change.state,
            at = %change.at,
            "lifecycle change observed"
        );
    }
}

/// Bridge the registry's lifecycle feed to a supervisor. Runs until
/// the registry (and with it the sending side) is dropped.
pub fn spawn_forwarder(
    registry: Arc<Registry>,
    supervisor: Arc<dyn ConnectorSupervisor>,
) -> JoinHandle<()> {
    let mut rx = registry.events().subscribe_lifecycle();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(change) => supervisor.on_lifecycle_change(change).await,
                // Missed events are fine: the feed is a hint, and the
                // supervisor reconciles against current state.
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "lifecycle feed lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
