//! Payment history command.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct PaymentsArgs {
    /// Show payments received as a tutor instead of payments made
    #[arg(long)]
    pub received: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(args: PaymentsArgs, global: &GlobalArgs) -> Result<()> {
    let session = CliSession::require(global)?;
    let snapshot = session.store().snapshot();
    let email = snapshot
        .identity()
        .map(|i| i.email.clone())
        .context("No active session")?;

    let api = session.api();
    let result = if args.received {
        api.tutor_payments(&email).await
    } else {
        api.my_payments(&email).await
    };
    session.close()?;

    let payments = result.context("Failed to list payments")?;
    output::json_lines(&payments, args.pretty)
}
