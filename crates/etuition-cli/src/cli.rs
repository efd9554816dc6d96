//! CLI argument definitions.

use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::commands::api::ApiCommand;
use crate::commands::session::SessionCommand;

/// eTuition marketplace CLI.
#[derive(Parser, Debug)]
#[command(name = "etuition")]
#[command(author, version = env!("ETUITION_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection settings shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Backend base URL (HTTPS, or HTTP for localhost)
    #[arg(
        long,
        env = "ETUITION_API_URL",
        default_value = "http://localhost:5000",
        global = true
    )]
    pub api: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30, global = true)]
    pub timeout_secs: u64,
}

impl GlobalArgs {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in, sign out and inspect the stored session
    Session(SessionCommand),

    /// Call the backend as the signed-in user
    Api(ApiCommand),
}
