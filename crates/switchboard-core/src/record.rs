//! Record types - the two integration families the registry manages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Chat platform identifier for a bot channel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BotPlatform {
    Console,
    Feishu,
    Dingtalk,
    Wecom,
    Telegram,
    Discord,
}

impl BotPlatform {
    /// All known platforms, in display order.
    pub const ALL: [BotPlatform; 6] = [
        Self::Console,
        Self::Feishu,
        Self::Dingtalk,
        Self::Wecom,
        Self::Telegram,
        Self::Discord,
    ];
}

impl std::fmt::Display for BotPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Console => write!(f, "console"),
            Self::Feishu => write!(f, "feishu"),
            Self::Dingtalk => write!(f, "dingtalk"),
            Self::Wecom => write!(f, "wecom"),
            Self::Telegram => write!(f, "telegram"),
            Self::Discord => write!(f, "discord"),
        }
    }
}

impl std::str::FromStr for BotPlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "console" => Ok(Self::Console),
            "feishu" => Ok(Self::Feishu),
            "dingtalk" => Ok(Self::Dingtalk),
            "wecom" => Ok(Self::Wecom),
            "telegram" => Ok(Self::Telegram),
            "discord" => Ok(Self::Discord),
            other => Err(format!("unknown platform '{other}'")),
        }
    }
}

/// Transport an MCP client uses to reach its server.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum McpTransport {
    /// Locally spawned process, speaking over stdin/stdout pipes.
    Stdio,
    /// Remote endpoint reached via Server-Sent Events over HTTP.
    Sse,
}

impl std::fmt::Display for McpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::Sse => write!(f, "sse"),
        }
    }
}

impl std::str::FromStr for McpTransport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdio" => Ok(Self::Stdio),
            "sse" => Ok(Self::Sse),
            other => Err(format!("unknown transport '{other}'")),
        }
    }
}

/// Recognized `config` keys for bot channels. Platforms may carry
/// extra keys beyond these; the registry stores them untouched.
pub const CONFIG_APP_ID: &str = "appId";
pub const CONFIG_APP_SECRET: &str = "appSecret";

/// A configured chat-platform integration.
///
/// Keyed by a generated opaque `id`; `platform` is immutable after
/// creation (switching platforms is delete + recreate). Values in
/// `config` are opaque secrets and identifiers - the registry checks
/// presence where required, never correctness.
///
/// Several records may share one platform. The panel happens to show
/// one card per platform, but that is its convention; the registry is
/// intentionally permissive here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BotChannelRecord {
    pub id: String,
    pub name: String,
    pub platform: BotPlatform,
    pub enabled: bool,
    /// Wake-word prefix; messages not starting with it are ignored by
    /// the message-handling collaborator. Stored, never interpreted.
    pub bot_prefix: String,
    #[serde(default)]
    pub config: BTreeMap<String, String>,
}

/// Draft for creating a bot channel. The store assigns the `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotChannelDraft {
    pub name: String,
    pub platform: BotPlatform,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_bot_prefix")]
    pub bot_prefix: String,
    #[serde(default)]
    pub config: BTreeMap<String, String>,
}

fn default_enabled() -> bool {
    true
}

fn default_bot_prefix() -> String {
    "@bot".to_string()
}

impl BotChannelDraft {
    /// Draft with per-platform defaults, ready for overrides.
    pub fn new(platform: BotPlatform, name: &str) -> Self {
        Self {
            name: name.to_string(),
            platform,
            enabled: true,
            bot_prefix: default_bot_prefix(),
            config: BTreeMap::new(),
        }
    }

    /// Materialize the draft into a record with a fresh identity.
    pub fn materialize(self) -> BotChannelRecord {
        BotChannelRecord {
            id: Uuid::new_v4().to_string(),
            name: self.name,
            platform: self.platform,
            enabled: self.enabled,
            bot_prefix: self.bot_prefix,
            config: self.config,
        }
    }
}

/// Partial update for a bot channel. Absent fields are preserved;
/// `config` keys present here overwrite, absent keys survive.
/// `id` and `platform` are immutable and have no patch field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotChannelPatch {
    pub name: Option<String>,
    pub enabled: Option<bool>,
    pub bot_prefix: Option<String>,
    pub config: Option<BTreeMap<String, String>>,
}

impl BotChannelPatch {
    /// Shallow-merge this patch into `record`.
    pub fn apply(&self, record: &mut BotChannelRecord) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(enabled) = self.enabled {
            record.enabled = enabled;
        }
        if let Some(prefix) = &self.bot_prefix {
            record.bot_prefix = prefix.clone();
        }
        if let Some(config) = &self.config {
            for (k, v) in config {
                record.config.insert(k.clone(), v.clone());
            }
        }
    }
}

/// A configured MCP tool-server connection.
///
/// `name` is both the display key and the primary key - unique across
/// all MCP records. `command`/`args`/`env` are meaningful for stdio,
/// `url` for sse; the off-transport fields are stored but ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct McpClientRecord {
    pub name: String,
    pub transport: McpTransport,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// Draft for creating an MCP client. The caller-supplied `name`
/// becomes the key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpClientDraft {
    pub name: String,
    pub transport: McpTransport,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl McpClientDraft {
    pub fn stdio(name: &str, command: &str) -> Self {
        Self {
            name: name.to_string(),
            transport: McpTransport::Stdio,
            command: Some(command.to_string()),
            args: Vec::new(),
            url: None,
            env: BTreeMap::new(),
            enabled: true,
        }
    }

    pub fn sse(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            transport: McpTransport::Sse,
            command: None,
            args: Vec::new(),
            url: Some(url.to_string()),
            env: BTreeMap::new(),
            enabled: true,
        }
    }

    /// Materialize the draft; identity is the caller-supplied name.
    pub fn materialize(self) -> McpClientRecord {
        McpClientRecord {
            name: self.name,
            transport: self.transport,
            command: self.command,
            args: self.args,
            url: self.url,
            env: self.env,
            enabled: self.enabled,
        }
    }
}

/// Tagged pair over the two families, used where a single record type
/// must flow through one channel (lifecycle feed, change log).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "family", rename_all = "lowercase")]
pub enum IntegrationRecord {
    Bot(BotChannelRecord),
    Mcp(McpClientRecord),
}

impl IntegrationRecord {
    /// The record's key: generated id for bots, name for MCP clients.
    pub fn key(&self) -> &str {
        match self {
            Self::Bot(b) => &b.id,
            Self::Mcp(m) => &m.name,
        }
    }

    pub fn enabled(&self) -> bool {
        match self {
            Self::Bot(b) => b.enabled,
            Self::Mcp(m) => m.enabled,
        }
    }
}
