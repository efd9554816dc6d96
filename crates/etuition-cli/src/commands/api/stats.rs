//! Admin stats command.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Print raw JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: StatsArgs, global: &GlobalArgs) -> Result<()> {
    let session = CliSession::require(global)?;
    let result = session.api().admin_stats().await;
    session.close()?;

    let stats = result.context("Failed to fetch stats")?;
    if args.json {
        return output::json(&stats);
    }

    output::field("Revenue", &format!("{:.2}", stats.revenue));
    output::field("Users", &stats.users.to_string());
    output::field("Tuitions", &stats.tuitions.to_string());
    output::field("Orders", &stats.orders.to_string());
    Ok(())
}
