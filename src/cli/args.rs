//! CLI argument definitions using clap derive

use crate::worker::ControlMessage;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// shellcache - offline cache manager for the Hair & Makeup Pro shell
///
/// Precaches the application shell, routes requests through cache-first or
/// network-first strategies, and serves an offline fallback when both the
/// network and the cache come up empty.
#[derive(Parser, Debug)]
#[command(name = "shellcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SHELLCACHE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install a worker for the configured version and precache the shell
    Install(InstallArgs),

    /// Activate the waiting worker
    Activate,

    /// Route one request through the active worker
    Fetch(FetchArgs),

    /// Post a control message and print the reply
    Message(MessageArgs),

    /// Deliver a push event
    Push(PushArgs),

    /// Deliver a background sync event
    Sync(SyncArgs),

    /// Inspect persisted caches
    Cache(CacheArgs),

    /// Show registration and cache status
    Status,

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the install command
#[derive(Parser, Debug)]
pub struct InstallArgs {
    /// Stay waiting after install even if worker.skip_waiting is set
    #[arg(long)]
    pub wait: bool,
}

/// Arguments for the fetch command
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Absolute URL, or a path resolved against the configured origin
    pub url: String,

    /// Issue the request as a page navigation
    #[arg(long)]
    pub navigate: bool,

    /// Accept header value
    #[arg(long)]
    pub accept: Option<String>,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// Extra request headers (Name: value)
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Write the body to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the message command
#[derive(Parser, Debug)]
pub struct MessageArgs {
    /// Message type
    pub kind: MessageKind,

    /// Skip the confirmation prompt for clear-cache
    #[arg(short, long)]
    pub yes: bool,
}

/// Control message types
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MessageKind {
    /// SKIP_WAITING: activate the waiting worker now
    SkipWaiting,
    /// GET_VERSION: print the active version tag
    GetVersion,
    /// CLEAR_CACHE: delete every cache of this application
    ClearCache,
}

impl From<MessageKind> for ControlMessage {
    fn from(kind: MessageKind) -> Self {
        match kind {
            MessageKind::SkipWaiting => ControlMessage::SkipWaiting,
            MessageKind::GetVersion => ControlMessage::GetVersion,
            MessageKind::ClearCache => ControlMessage::ClearCache,
        }
    }
}

/// Arguments for the push command
#[derive(Parser, Debug)]
pub struct PushArgs {
    /// Payload: JSON with optional title, body and url, or plain text
    pub payload: Option<String>,

    /// Also click the notification
    #[arg(long)]
    pub click: bool,
}

/// Arguments for the sync command
#[derive(Parser, Debug)]
pub struct SyncArgs {
    /// Sync tag
    pub tag: String,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., cache.version)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Output format for list commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List persisted caches
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show the entries of one cache
    Show {
        /// Cache name (e.g., hmp-static-v1)
        name: String,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

/// Parse a header in `Name: value` format
fn parse_header(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once(':')
        .ok_or_else(|| format!("invalid header format: no ':' found in '{s}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("invalid header format: empty name in '{s}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_header_valid() {
        let (k, v) = parse_header("Accept: text/html").unwrap();
        assert_eq!(k, "Accept");
        assert_eq!(v, "text/html");
    }

    #[test]
    fn parse_header_value_with_colon() {
        let (k, v) = parse_header("X-Forwarded-Host: app.example:8080").unwrap();
        assert_eq!(k, "X-Forwarded-Host");
        assert_eq!(v, "app.example:8080");
    }

    #[test]
    fn parse_header_invalid() {
        assert!(parse_header("Accept").is_err());
        assert!(parse_header(": value").is_err());
    }

    #[test]
    fn cli_parses_fetch() {
        let cli = Cli::parse_from([
            "shellcache",
            "fetch",
            "/lookbook/42",
            "--navigate",
            "-H",
            "X-Trace: 1",
        ]);
        match cli.command {
            Commands::Fetch(args) => {
                assert_eq!(args.url, "/lookbook/42");
                assert!(args.navigate);
                assert_eq!(args.method, "GET");
                assert_eq!(args.headers, vec![("X-Trace".to_string(), "1".to_string())]);
            }
            _ => panic!("expected Fetch command"),
        }
    }

    #[test]
    fn cli_parses_message_kinds() {
        let cli = Cli::parse_from(["shellcache", "message", "get-version"]);
        match cli.command {
            Commands::Message(args) => {
                assert_eq!(ControlMessage::from(args.kind), ControlMessage::GetVersion);
                assert!(!args.yes);
            }
            _ => panic!("expected Message command"),
        }

        let cli = Cli::parse_from(["shellcache", "message", "clear-cache", "--yes"]);
        assert!(matches!(
            cli.command,
            Commands::Message(MessageArgs {
                kind: MessageKind::ClearCache,
                yes: true
            })
        ));
    }

    #[test]
    fn cli_parses_push_without_payload() {
        let cli = Cli::parse_from(["shellcache", "push"]);
        match cli.command {
            Commands::Push(args) => {
                assert!(args.payload.is_none());
                assert!(!args.click);
            }
            _ => panic!("expected Push command"),
        }
    }

    #[test]
    fn cli_parses_status() {
        let cli = Cli::parse_from(["shellcache", "status"]);
        assert!(matches!(cli.command, Commands::Status));
    }

    #[test]
    fn cli_parses_install_wait() {
        let cli = Cli::parse_from(["shellcache", "install", "--wait"]);
        assert!(matches!(cli.command, Commands::Install(InstallArgs { wait: true })));
    }

    #[test]
    fn cli_parses_verbose_count() {
        let cli = Cli::parse_from(["shellcache", "-vv", "activate"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn cli_parses_cache_show() {
        let cli = Cli::parse_from(["shellcache", "cache", "show", "hmp-static-v1"]);
        match cli.command {
            Commands::Cache(CacheArgs {
                action: CacheAction::Show { name, .. },
            }) => assert_eq!(name, "hmp-static-v1"),
            _ => panic!("expected Cache Show command"),
        }
    }
}
