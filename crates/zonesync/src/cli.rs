//! Clap derive structures for the `zonesync` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use zonesync_core::{AuthState, SortField, SortOrder};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// zonesync -- keep a local view of SmartZone connected clients
#[derive(Debug, Parser)]
#[command(
    name = "zonesync",
    version,
    about = "Sync SmartZone connected clients into a local store",
    long_about = "Talks to a Ruckus SmartZone controller's public API, keeps a \
        fresh admin session, and merges the connected-client list into a \
        local store that can be queried offline or streamed live.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Controller profile to use
    #[arg(long, short = 'p', env = "ZONESYNC_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Config file (defaults to the platform config dir)
    #[arg(long, env = "ZONESYNC_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Controller API base URL (overrides profile)
    #[arg(long, short = 'c', env = "ZONESYNC_CONTROLLER", global = true)]
    pub controller: Option<String>,

    /// Admin username (overrides profile)
    #[arg(long, short = 'u', env = "ZONESYNC_USERNAME", global = true)]
    pub username: Option<String>,

    /// Admin password
    #[arg(long, env = "ZONESYNC_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Authenticate with a service ticket instead of a session cookie
    #[arg(long, global = true)]
    pub ticket_auth: bool,

    /// PEM CA certificate for the controller
    #[arg(long, global = true)]
    pub ca_cert: Option<PathBuf>,

    /// Accept any TLS certificate
    #[arg(long, short = 'k', env = "ZONESYNC_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "ZONESYNC_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Only list clients of this WLAN id
    #[arg(long, global = true)]
    pub wlan: Option<String>,

    /// Local client store file
    #[arg(long, env = "ZONESYNC_STORE", global = true)]
    pub store: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ZONESYNC_OUTPUT",
        default_value = "json",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON envelope (default)
    Json,
    /// Compact single-line JSON envelope
    JsonCompact,
    /// YAML envelope
    Yaml,
    /// Table for list results, JSON otherwise
    Table,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create or release a service ticket
    Ticket(TicketArgs),

    /// Create, inspect or end a cookie session
    Session(SessionArgs),

    /// List RF zones
    Zones(CredentialOpt),

    /// Fetch or disconnect connected clients
    #[command(alias = "cl")]
    Clients(ClientsArgs),

    /// Query the local client store
    Store(StoreArgs),

    /// Stream live client snapshots, one JSON line per update
    Watch(WatchArgs),

    /// End-to-end self test against the controller
    Flow,

    /// Inspect CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// An explicit credential to use instead of logging in.
#[derive(Debug, Args)]
pub struct CredentialOpt {
    /// Ticket (`ST-...`) or session cookie (`JSESSIONID=...`)
    #[arg(long, env = "ZONESYNC_CREDENTIAL", hide_env_values = true)]
    pub credential: Option<String>,
}

// ── Ticket / Session ─────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TicketArgs {
    #[command(subcommand)]
    pub command: TicketCommand,
}

#[derive(Debug, Subcommand)]
pub enum TicketCommand {
    /// Obtain a new service ticket
    Create,

    /// Release a service ticket
    Delete {
        /// The ticket to release
        ticket: String,
    },
}

#[derive(Debug, Args)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Log in and print the session cookie
    Login,

    /// Show the admin session behind a credential
    Info(CredentialOpt),

    /// End a cookie session
    Logout {
        /// Session cookie (`JSESSIONID=...`)
        cookie: String,
    },
}

// ── Clients ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ClientsArgs {
    #[command(subcommand)]
    pub command: ClientsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ClientsCommand {
    /// Fetch the connected-client list
    Fetch {
        /// Merge the result into the local store
        #[arg(long)]
        sync: bool,

        #[command(flatten)]
        credential: CredentialOpt,
    },

    /// Disconnect one client
    Disconnect {
        /// Client MAC address
        #[arg(long)]
        mac: String,

        /// MAC of the AP serving the client
        #[arg(long)]
        ap_mac: String,
    },

    /// Disconnect several clients at once
    BulkDisconnect {
        /// `CLIENT_MAC@AP_MAC` pairs
        #[arg(required = true, value_name = "CLIENT_MAC@AP_MAC")]
        targets: Vec<String>,
    },
}

// ── Store ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StoreArgs {
    #[command(subcommand)]
    pub command: StoreCommand,
}

#[derive(Debug, Subcommand)]
pub enum StoreCommand {
    /// List stored clients
    List(StoreListArgs),

    /// Show one stored client
    Get {
        /// Client MAC address
        mac: String,
    },
}

#[derive(Debug, Args)]
pub struct StoreListArgs {
    /// Exact SSID
    #[arg(long)]
    pub ssid: Option<String>,

    /// Exact authorization state (AUTHORIZED, UNAUTHORIZED, BLOCKED, UNKNOWN)
    #[arg(long)]
    pub status: Option<AuthState>,

    /// Case-insensitive regex over the MAC
    #[arg(long)]
    pub mac: Option<String>,

    /// Case-insensitive regex over hostname, MAC, IP and model
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Sort field
    #[arg(long, default_value_t = SortField::default())]
    pub sort: SortField,

    /// Sort order
    #[arg(long, default_value_t = SortOrder::default())]
    pub order: SortOrder,

    /// Page number, starting at 1
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Page size
    #[arg(long, short = 'l', default_value = "20")]
    pub limit: u32,
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Stop after this many updates
    #[arg(long)]
    pub ticks: Option<u64>,

    /// Poll interval in seconds (overrides profile)
    #[arg(long)]
    pub interval: Option<u64>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Display the loaded configuration (passwords masked)
    Show,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
