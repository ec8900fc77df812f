//! Keyed record store - one generic collection, two instantiations.
//!
//! Both families (bot channels keyed by generated id, MCP clients
//! keyed by name) go through the same insertion-ordered collection
//! with a validation hook. The `Registry` facade owns one `RecordSet`
//! per family behind a single lock.

use crate::error::{RegistryError, Result};
use crate::event::Family;
use crate::lifecycle::{LifecycleState, Transition};
use crate::record::{BotChannelRecord, McpClientRecord};
use crate::validate;

/// A record the store can manage: keyed, toggleable, validatable.
pub trait KeyedRecord: Clone {
    fn key(&self) -> &str;
    fn enabled(&self) -> bool;
    fn set_enabled(&mut self, enabled: bool);
    fn validate(&self) -> Result<()>;
    fn family() -> Family;
}

impl KeyedRecord for BotChannelRecord {
    fn key(&self) -> &str {
        &self.id
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn validate(&self) -> Result<()> {
        validate::bot_channel(self)
    }

    fn family() -> Family {
        Family::BotChannels
    }
}

impl KeyedRecord for McpClientRecord {
    fn key(&self) -> &str {
        &self.name
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn validate(&self) -> Result<()> {
        validate::mcp_client(self)
    }

    fn family() -> Family {
        Family::McpClients
    }
}

/// Insertion-ordered collection of keyed records.
///
/// All mutations validate before committing, so an invalid record is
/// never stored; on failure the collection is untouched.
#[derive(Debug, Clone, Default)]
pub struct RecordSet<R: KeyedRecord> {
    records: Vec<R>,
}

impl<R: KeyedRecord> RecordSet<R> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Seed the set from persisted records. Invalid or duplicate
    /// entries are dropped with a warning rather than poisoning the
    /// whole load.
    pub fn from_records(records: Vec<R>) -> Self {
        let mut set = Self::new();
        for record in records {
            if let Err(e) = set.insert(record) {
                tracing::warn!(family = %R::family(), error = %e, "skipping persisted record");
            }
        }
        set
    }

    /// Snapshot of all records in insertion order. Clones; callers
    /// never alias internal storage.
    pub fn list(&self) -> Vec<R> {
        self.records.clone()
    }

    pub fn get(&self, key: &str) -> Option<&R> {
        self.records.iter().find(|r| r.key() == key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append a record. Fails with `DuplicateKey` if the key is taken
    /// and `Validation` if the record is invalid.
    pub fn insert(&mut self, record: R) -> Result<R> {
        record.validate()?;
        if self.get(record.key()).is_some() {
            return Err(RegistryError::duplicate(record.key()));
        }
        self.records.push(record.clone());
        Ok(record)
    }

    /// Mutate the record under `key` via `apply`, re-validating the
    /// result. The stored record is replaced only if the mutated copy
    /// passes validation; `apply` must not change the key.
    pub fn update_with(&mut self, key: &str, apply: impl FnOnce(&mut R)) -> Result<R> {
        let index = self
            .records
            .iter()
            .position(|r| r.key() == key)
            .ok_or_else(|| RegistryError::not_found(key))?;

        let mut updated = self.records[index].clone();
        apply(&mut updated);
        debug_assert_eq!(updated.key(), key);
        updated.validate()?;

        self.records[index] = updated.clone();
        Ok(updated)
    }

    /// Flip `enabled` without touching anything else. Routed through
    /// the lifecycle state machine so a toggle is exactly one legal
    /// transition.
    pub fn toggle(&mut self, key: &str) -> Result<R> {
        self.update_with(key, |r| {
            let current = LifecycleState::from_flag(r.enabled());
            let transition = if current.is_enabled() {
                Transition::Disable
            } else {
                Transition::Enable
            };
            let (next, _) = current.apply(transition);
            r.set_enabled(next.is_enabled());
        })
    }

    /// Remove and return the record. Fails with `NotFound` when
    /// absent, to surface caller mistakes instead of masking them.
    pub fn remove(&mut self, key: &str) -> Result<R> {
        let index = self
            .records
            .iter()
            .position(|r| r.key() == key)
            .ok_or_else(|| RegistryError::not_found(key))?;
        Ok(self.records.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{BotChannelDraft, BotPlatform, McpClientDraft};

    fn mcp(name: &str) -> McpClientRecord {
        McpClientDraft::stdio(name, "npx -y @tavily/mcp").materialize()
    }

    #[test]
    fn list_preserves_insertion_order() {
        let mut set = RecordSet::new();
        set.insert(mcp("alpha")).unwrap();
        set.insert(mcp("beta")).unwrap();
        set.insert(mcp("gamma")).unwrap();

        let names: Vec<String> = set.list().into_iter().map(|r| r.name).collect();
        assert_eq!(names, ["alpha", "beta", "gamma"]);
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut set = RecordSet::new();
        set.insert(mcp("tavily")).unwrap();
        let err = set.insert(mcp("tavily")).unwrap_err();
        assert_eq!(err, RegistryError::duplicate("tavily"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn failed_update_leaves_record_untouched() {
        let mut set = RecordSet::new();
        set.insert(mcp("tavily")).unwrap();

        let err = set
            .update_with("tavily", |r| r.command = None)
            .unwrap_err();
        assert!(matches!(err, RegistryError::Validation { field, .. } if field == "command"));

        let stored = set.get("tavily").unwrap();
        assert_eq!(stored.command.as_deref(), Some("npx -y @tavily/mcp"));
    }

    #[test]
    fn toggle_twice_restores_enabled() {
        let mut set = RecordSet::new();
        set.insert(mcp("tavily")).unwrap();

        let once = set.toggle("tavily").unwrap();
        assert!(!once.enabled);
        let twice = set.toggle("tavily").unwrap();
        assert!(twice.enabled);
    }

    #[test]
    fn remove_missing_key_fails_and_preserves_collection() {
        let mut set = RecordSet::new();
        set.insert(mcp("tavily")).unwrap();

        let err = set.remove("nope").unwrap_err();
        assert_eq!(err, RegistryError::not_found("nope"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn bot_channels_share_the_same_contract() {
        let mut set = RecordSet::new();
        let record = set
            .insert(BotChannelDraft::new(BotPlatform::Feishu, "Ops Bot").materialize())
            .unwrap();

        let updated = set
            .update_with(&record.id, |r| r.name = "Ops Bot 2".to_string())
            .unwrap();
        assert_eq!(updated.name, "Ops Bot 2");

        set.remove(&record.id).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn from_records_drops_invalid_entries() {
        let mut bad = mcp("broken");
        bad.command = None;
        let set = RecordSet::from_records(vec![mcp("ok"), bad, mcp("ok")]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("ok").unwrap().name, "ok");
    }
}
