//! Wire shapes - what the presentation layer sends and receives.
//!
//! The canonical records use Rust-native field names; the panel's
//! forms speak camelCase and call the platform field `type`. This
//! module is the translation layer, and it is format-preserving:
//! decoding an encoded record yields the identical record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use switchboard_core::record::{
    BotChannelDraft, BotChannelPatch, BotChannelRecord, BotPlatform, McpClientDraft,
    McpClientRecord, McpTransport,
};

/// A bot channel as the panel sees it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BotChannelWire {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub platform: BotPlatform,
    pub enabled: bool,
    pub bot_prefix: String,
    #[serde(default)]
    pub config: BTreeMap<String, String>,
}

impl From<BotChannelRecord> for BotChannelWire {
    fn from(record: BotChannelRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            platform: record.platform,
            enabled: record.enabled,
            bot_prefix: record.bot_prefix,
            config: record.config,
        }
    }
}

impl From<BotChannelWire> for BotChannelRecord {
    fn from(wire: BotChannelWire) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
            platform: wire.platform,
            enabled: wire.enabled,
            bot_prefix: wire.bot_prefix,
            config: wire.config,
        }
    }
}

/// Create payload for a bot channel; everything but name and type is
/// optional and defaulted by the core draft.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotChannelDraftWire {
    pub name: String,
    #[serde(rename = "type")]
    pub platform: BotPlatform,
    pub enabled: Option<bool>,
    pub bot_prefix: Option<String>,
    #[serde(default)]
    pub config: BTreeMap<String, String>,
}

impl From<BotChannelDraftWire> for BotChannelDraft {
    fn from(wire: BotChannelDraftWire) -> Self {
        let mut draft = BotChannelDraft::new(wire.platform, &wire.name);
        if let Some(enabled) = wire.enabled {
            draft.enabled = enabled;
        }
        if let Some(prefix) = wire.bot_prefix {
            draft.bot_prefix = prefix;
        }
        draft.config = wire.config;
        draft
    }
}

/// Patch payload for a bot channel. Fields absent from the JSON are
/// left untouched on the stored record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotChannelPatchWire {
    pub name: Option<String>,
    pub enabled: Option<bool>,
    pub bot_prefix: Option<String>,
    pub config: Option<BTreeMap<String, String>>,
}

impl From<BotChannelPatchWire> for BotChannelPatch {
    fn from(wire: BotChannelPatchWire) -> Self {
        Self {
            name: wire.name,
            enabled: wire.enabled,
            bot_prefix: wire.bot_prefix,
            config: wire.config,
        }
    }
}

/// An MCP client as the panel sees it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct McpClientWire {
    pub name: String,
    pub transport: McpTransport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    pub enabled: bool,
}

impl From<McpClientRecord> for McpClientWire {
    fn from(record: McpClientRecord) -> Self {
        Self {
            name: record.name,
            transport: record.transport,
            command: record.command,
            args: record.args,
            url: record.url,
            env: record.env,
            enabled: record.enabled,
        }
    }
}

impl From<McpClientWire> for McpClientRecord {
    fn from(wire: McpClientWire) -> Self {
        Self {
            name: wire.name,
            transport: wire.transport,
            command: wire.command,
            args: wire.args,
            url: wire.url,
            env: wire.env,
            enabled: wire.enabled,
        }
    }
}

/// Create payload for an MCP client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpClientDraftWire {
    pub name: String,
    pub transport: McpTransport,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    pub enabled: Option<bool>,
}

impl From<McpClientDraftWire> for McpClientDraft {
    fn from(wire: McpClientDraftWire) -> Self {
        Self {
            name: wire.name,
            transport: wire.transport,
            command: wire.command,
            args: wire.args,
            url: wire.url,
            env: wire.env,
            enabled: wire.enabled.unwrap_or(true),
        }
    }
}
