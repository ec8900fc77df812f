//! Validation rules - pure, total, per-kind rule tables.
//!
//! Each family has a declarative table of (field, predicate, reason)
//! rows. Checking a record walks the table and reports the first
//! failing row as a `Validation` error naming the field. No I/O, no
//! side effects.

use crate::error::{RegistryError, Result};
use crate::record::{BotChannelRecord, McpClientRecord, McpTransport};

type Rule<R> = (&'static str, fn(&R) -> bool, &'static str);

const BOT_CHANNEL_RULES: &[Rule<BotChannelRecord>] = &[(
    "name",
    |r| !r.name.trim().is_empty(),
    "display name must not be empty",
)];

const MCP_CLIENT_RULES: &[Rule<McpClientRecord>] = &[
    (
        "name",
        |r| !r.name.trim().is_empty(),
        "name must not be empty",
    ),
    (
        "command",
        |r| {
            r.transport != McpTransport::Stdio
                || r.command.as_deref().is_some_and(|c| !c.trim().is_empty())
        },
        "command is required for stdio transport",
    ),
    (
        "url",
        |r| {
            r.transport != McpTransport::Sse
                || r.url.as_deref().is_some_and(|u| !u.trim().is_empty())
        },
        "url is required for sse transport",
    ),
];

fn check<R>(record: &R, rules: &[Rule<R>]) -> Result<()> {
    for (field, ok, reason) in rules {
        if !ok(record) {
            return Err(RegistryError::validation(field, reason));
        }
    }
    Ok(())
}

/// Validate a bot channel record. The platform set is closed by the
/// `BotPlatform` type; unknown platforms never reach this point.
pub fn bot_channel(record: &BotChannelRecord) -> Result<()> {
    check(record, BOT_CHANNEL_RULES)
}

/// Validate an MCP client record, including the conditional
/// command/url requirement for its transport.
pub fn mcp_client(record: &McpClientRecord) -> Result<()> {
    check(record, MCP_CLIENT_RULES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{BotChannelDraft, BotPlatform, McpClientDraft};

    #[test]
    fn bot_channel_rejects_empty_name() {
        let record = BotChannelDraft::new(BotPlatform::Telegram, "  ").materialize();
        let err = bot_channel(&record).unwrap_err();
        assert!(matches!(err, RegistryError::Validation { field, .. } if field == "name"));
    }

    #[test]
    fn bot_channel_accepts_minimal_record() {
        let record = BotChannelDraft::new(BotPlatform::Console, "local").materialize();
        assert!(bot_channel(&record).is_ok());
    }

    #[test]
    fn stdio_requires_command() {
        let mut record = McpClientDraft::stdio("tavily", "npx").materialize();
        record.command = Some(String::new());
        let err = mcp_client(&record).unwrap_err();
        assert!(matches!(err, RegistryError::Validation { field, .. } if field == "command"));

        record.command = None;
        let err = mcp_client(&record).unwrap_err();
        assert!(matches!(err, RegistryError::Validation { field, .. } if field == "command"));
    }

    #[test]
    fn sse_requires_url_but_not_command() {
        let record = McpClientDraft::sse("remote", "https://mcp.example.com/sse").materialize();
        assert!(mcp_client(&record).is_ok());

        let mut bad = record.clone();
        bad.url = None;
        let err = mcp_client(&bad).unwrap_err();
        assert!(matches!(err, RegistryError::Validation { field, .. } if field == "url"));
    }

    #[test]
    fn mcp_rejects_empty_name() {
        let record = McpClientDraft::stdio("", "npx").materialize();
        let err = mcp_client(&record).unwrap_err();
        assert!(matches!(err, RegistryError::Validation { field, .. } if field == "name"));
    }
}
