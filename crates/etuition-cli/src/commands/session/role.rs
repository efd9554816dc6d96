//! Role lookup command implementation.

use anyhow::Result;
use clap::Args;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct RoleArgs {}

pub async fn run(_args: RoleArgs, global: &GlobalArgs) -> Result<()> {
    let session = CliSession::require(global)?;
    let state = session.roles().resolve(&session.store().snapshot()).await;
    session.close()?;

    match state.role() {
        Some(role) => {
            output::field("Role", role.as_str());
            Ok(())
        }
        None => anyhow::bail!("Role lookup failed"),
    }
}
