//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Print the identity as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: WhoamiArgs, global: &GlobalArgs) -> Result<()> {
    let session = CliSession::require(global)?;
    let snapshot = session.store().snapshot();
    let identity = snapshot.identity().context("Stored session has no identity")?;

    if args.json {
        output::json(identity)?;
    } else {
        output::field("Email", identity.email.as_str());
        output::field("Name", &identity.display_name);
        output::field("ID", &identity.id);
        output::field("API", session.client().base_url().as_str());
        output::field(
            "Credential",
            if snapshot.credential().is_some() { "set" } else { "none" },
        );
    }

    session.close()
}
