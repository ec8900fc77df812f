//! Switchboard CLI - host the command server and manage integrations
//! from the terminal. The same registry and state file the panel
//! uses, without the panel.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::*;
use tracing_subscriber::EnvFilter;

use switchboard_core::persist::{Persistence, TomlFile};
use switchboard_core::record::{BotChannelDraft, BotChannelPatch, BotPlatform, McpClientDraft};
use switchboard_core::registry::Registry;
use switchboard_hub::api;
use switchboard_hub::supervisor::{LoggingSupervisor, spawn_forwarder};

// ─── CLI Definition ────────────────────────────────────────

/// Switchboard - integration registry for the control panel.
#[derive(Parser)]
#[command(name = "switchboard", version, about, long_about = None)]
struct Cli {
    /// State file (defaults to <config dir>/switchboard/integrations.toml)
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Host the HTTP command server for the panel
    Serve {
        /// Bind address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port
        #[arg(short, long, default_value_t = 7070, env = "SWITCHBOARD_PORT")]
        port: u16,
    },

    /// Manage bot channels
    Bots {
        #[command(subcommand)]
        action: BotAction,
    },

    /// Manage MCP clients
    Mcp {
        #[command(subcommand)]
        action: McpAction,
    },

    /// Print the state file path
    Path,
}

#[derive(Subcommand)]
enum BotAction {
    /// List configured bot channels
    List,

    /// Add a bot channel
    Add {
        /// Display name
        name: String,

        /// Platform: console, feishu, dingtalk, wecom, telegram, discord
        #[arg(short, long)]
        platform: BotPlatform,

        /// Wake-word prefix
        #[arg(long, default_value = "@bot")]
        prefix: String,

        /// Create disabled
        #[arg(long)]
        disabled: bool,

        /// Platform config entries, key=value (e.g. appId=... appSecret=...)
        #[arg(short, long, value_parser = parse_key_val)]
        config: Vec<(String, String)>,
    },

    /// Flip a channel's enabled flag
    Toggle {
        /// Channel id
        id: String,
    },

    /// Rename a channel
    Rename {
        /// Channel id
        id: String,
        /// New display name
        name: String,
    },

    /// Delete a channel
    Delete {
        /// Channel id
        id: String,
    },
}

#[derive(Subcommand)]
enum McpAction {
    /// List configured MCP clients
    List,

    /// Add a stdio MCP client
    AddStdio {
        /// Client name (unique)
        name: String,

        /// Command to spawn
        command: String,

        /// Arguments for the command
        #[arg(trailing_var_arg = true)]
        args: Vec<String>,

        /// Environment entries, key=value
        #[arg(short, long, value_parser = parse_key_val)]
        env: Vec<(String, String)>,
    },

    /// Add an SSE MCP client
    AddSse {
        /// Client name (unique)
        name: String,

        /// Endpoint URL
        url: String,
    },

    /// Flip a client's enabled flag
    Toggle {
        /// Client name
        name: String,
    },

    /// Delete a client
    Delete {
        /// Client name
        name: String,
    },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    Ok((key.to_string(), value.to_string()))
}

// ─── Output helpers ────────────────────────────────────────

fn enabled_marker(enabled: bool) -> ColoredString {
    if enabled {
        "enabled".green()
    } else {
        "disabled".red()
    }
}

async fn print_bots(registry: &Registry) {
    let bots = registry.list_bot_channels().await;
    if bots.is_empty() {
        println!("{}", "no bot channels configured".dimmed());
        return;
    }
    for bot in bots {
        println!(
            "{}  {}  [{}]  prefix {}  {}",
            bot.name.bold(),
            bot.platform.to_string().cyan(),
            enabled_marker(bot.enabled),
            bot.bot_prefix,
            bot.id.dimmed(),
        );
    }
}

async fn print_mcp(registry: &Registry) {
    let clients = registry.list_mcp_clients().await;
    if clients.is_empty() {
        println!("{}", "no MCP clients configured".dimmed());
        return;
    }
    for client in clients {
        let target = match client.transport {
            switchboard_core::record::McpTransport::Stdio => {
                let mut parts = vec![client.command.clone().unwrap_or_default()];
                parts.extend(client.args.clone());
                parts.join(" ")
            }
            switchboard_core::record::McpTransport::Sse => client.url.clone().unwrap_or_default(),
        };
        println!(
            "{}  {}  [{}]  {}",
            client.name.bold(),
            client.transport.to_string().cyan(),
            enabled_marker(client.enabled),
            target.dimmed(),
        );
    }
}

// ─── Main ──────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,switchboard_core=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let state_path = cli.state.unwrap_or_else(TomlFile::default_path);

    if let Commands::Path = cli.command {
        println!("{}", state_path.display());
        return Ok(());
    }

    let persistence: Arc<dyn Persistence> = Arc::new(TomlFile::new(state_path));
    let registry = Arc::new(Registry::open(persistence).await);

    match cli.command {
        Commands::Path => unreachable!("handled above"),

        Commands::Serve { host, port } => {
            let supervisor = Arc::new(LoggingSupervisor);
            let forwarder = spawn_forwarder(Arc::clone(&registry), supervisor);
            api::start_server(Arc::clone(&registry), &host, port).await?;
            forwarder.abort();
        }

        Commands::Bots { action } => match action {
            BotAction::List => print_bots(&registry).await,
            BotAction::Add {
                name,
                platform,
                prefix,
                disabled,
                config,
            } => {
                let mut draft = BotChannelDraft::new(platform, &name);
                draft.bot_prefix = prefix;
                draft.enabled = !disabled;
                draft.config = config.into_iter().collect();
                let record = registry.create_bot_channel(draft).await?;
                println!("created {} ({})", record.name.bold(), record.id.dimmed());
            }
            BotAction::Toggle { id } => {
                let record = registry.toggle_bot_channel(&id).await?;
                println!("{} is now {}", record.name.bold(), enabled_marker(record.enabled));
            }
            BotAction::Rename { id, name } => {
                let patch = BotChannelPatch {
                    name: Some(name),
                    ..Default::default()
                };
                let record = registry.update_bot_channel(&id, patch).await?;
                println!("renamed to {}", record.name.bold());
            }
            BotAction::Delete { id } => {
                registry.delete_bot_channel(&id).await?;
                println!("deleted {}", id.dimmed());
            }
        },

        Commands::Mcp { action } => match action {
            McpAction::List => print_mcp(&registry).await,
            McpAction::AddStdio {
                name,
                command,
                args,
                env,
            } => {
                let mut draft = McpClientDraft::stdio(&name, &command);
                draft.args = args;
                draft.env = env.into_iter().collect();
                let record = registry.create_mcp_client(draft).await?;
                println!("created {}", record.name.bold());
            }
            McpAction::AddSse { name, url } => {
                let record = registry.create_mcp_client(McpClientDraft::sse(&name, &url)).await?;
                println!("created {}", record.name.bold());
            }
            McpAction::Toggle { name } => {
                let record = registry.toggle_mcp_client(&name).await?;
                println!("{} is now {}", record.name.bold(), enabled_marker(record.enabled));
            }
            McpAction::Delete { name } => {
                registry.delete_mcp_client(&name).await?;
                println!("deleted {}", name.dimmed());
            }
        },
    }

    registry.shutdown().await?;
    Ok(())
}
