//! CLI argument definitions for the Feedback binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Storage backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// SQLite database (default)
    Sqlite,
    /// PostgreSQL database
    Postgres,
    /// In-memory with JSON persistence on shutdown (for development)
    Inmemory,
}

/// Feedback boards server
#[derive(Parser, Debug)]
#[command(name = "feedback")]
#[command(about = "Feedback: user accounts with private feedback boards")]
#[command(version)]
pub struct Cli {
    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the web server
    Serve(ServeArgs),
    /// Check health of a running Feedback server
    Health(HealthArgs),
    /// Show backend and record counts
    Info(InfoArgs),
    /// List registered users
    Users(UsersArgs),
}

/// Where the data lives. Shared by every command that opens storage.
#[derive(clap::Args, Debug, Clone)]
pub struct BackendConfig {
    /// Storage backend to use
    #[arg(short, long, default_value = "sqlite", env = "FEEDBACK_BACKEND")]
    pub backend: Backend,

    /// Data directory for storage files.
    /// For SQLite: stores feedback.db
    /// For InMemory: stores feedback.json
    #[arg(short = 'D', long, env = "FEEDBACK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Database connection URL. Required when backend=postgres; with backend=sqlite a
    /// `sqlite:` URL overrides the data directory.
    #[arg(long, env = "FEEDBACK_DATABASE_URL")]
    pub database_url: Option<String>,
}

impl BackendConfig {
    /// The configured data directory, defaulting to the working directory.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Arguments for the serve command
#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 3000, env = "FEEDBACK_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "FEEDBACK_HOST")]
    pub host: String,

    #[command(flatten)]
    pub backend_config: BackendConfig,

    /// Secret used to sign session cookies
    #[arg(long, env = "FEEDBACK_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// Answer every failed login with the same notice instead of saying which part was
    /// wrong
    #[arg(long, env = "FEEDBACK_GENERIC_LOGIN_ERRORS")]
    pub generic_login_errors: bool,
}

/// Arguments for the health command
#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// Base URL of the server to check
    #[arg(short, long, default_value = "http://127.0.0.1:3000")]
    pub url: String,

    /// Timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,
}

/// Arguments for the info command
#[derive(clap::Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub backend_config: BackendConfig,
}

/// Arguments for the users command
#[derive(clap::Args, Debug)]
pub struct UsersArgs {
    #[command(flatten)]
    pub backend_config: BackendConfig,
}
