//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API. Connection and
//! credential flags fall back to the `CDM_*` environment variables.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

/// CDM CLI - Call the CDM appliance REST API from the command line
///
/// Sends GET/POST/PATCH/DELETE requests to a CDM cluster and polls
/// asynchronous jobs until they complete.
#[derive(Parser, Debug)]
#[command(
    name = "cdm",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "CDM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Cluster address, credentials and transport settings
#[derive(Args, Debug, Default, Clone)]
pub struct ConnectionArgs {
    /// Node address, or a comma separated list of node addresses
    #[arg(short, long, global = true, env = "CDM_NODE_IP")]
    pub node: Option<String>,

    /// API token sent as a Bearer credential
    #[arg(long, global = true, env = "CDM_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Username for basic authentication
    #[arg(long, global = true, env = "CDM_USERNAME")]
    pub username: Option<String>,

    /// Password for basic authentication
    #[arg(long, global = true, env = "CDM_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Accept any TLS certificate the node presents
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Additional CA certificate (PEM) to trust
    #[arg(long, global = true, value_name = "PEM_FILE")]
    pub ca_cert: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true, value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a GET request
    Get(EndpointArgs),

    /// Send a POST request with a JSON body
    Post(BodyArgs),

    /// Send a PATCH request with a JSON body
    Patch(BodyArgs),

    /// Send a DELETE request
    Delete(EndpointArgs),

    /// Read a job-status URL, polling until the job completes
    JobStatus(JobStatusArgs),

    /// Manage configuration files and settings
    Config(ConfigArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Target of a node-relative call
#[derive(Args, Debug, Clone)]
pub struct EndpointArgs {
    /// API version (v1, v2 or internal)
    #[arg(id = "api_version", value_name = "VERSION")]
    pub version: String,

    /// Endpoint path, starting with '/'
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Send the request without credentials
    #[arg(long)]
    pub no_auth: bool,
}

/// Arguments for calls carrying a JSON body
#[derive(Args, Debug, Clone)]
pub struct BodyArgs {
    #[command(flatten)]
    pub endpoint: EndpointArgs,

    /// JSON body given inline
    #[arg(short, long, value_name = "JSON", conflicts_with = "data_file")]
    pub data: Option<String>,

    /// File holding the JSON (or YAML) body
    #[arg(long, value_name = "FILE")]
    pub data_file: Option<PathBuf>,
}

/// Arguments for the job-status command
#[derive(Args, Debug, Clone)]
pub struct JobStatusArgs {
    /// Absolute job-status URL returned by an earlier call
    #[arg(value_name = "URL")]
    pub url: String,

    /// Poll until the job reaches a terminal state (true or false)
    #[arg(long, value_name = "BOOL", default_value_t = true, action = clap::ArgAction::Set)]
    pub wait: bool,

    /// Seconds between two status calls
    #[arg(long, value_name = "SECONDS")]
    pub interval: Option<u64>,

    /// Give up polling after this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub max_wait: Option<u64>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a configuration file with default values
    Init(ConfigInitArgs),

    /// Show the effective configuration (secrets redacted)
    Show(ConfigShowArgs),

    /// List the configuration file locations that are searched
    Paths,
}

/// Arguments for config init
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Where to write the file (defaults to ~/.config/cdm/config.yaml)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Force overwrite existing config files
    #[arg(long)]
    pub force: bool,
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Show configuration in specified format
    #[arg(short, long, value_enum, default_value = "yaml")]
    pub format: ConfigFormat,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}
