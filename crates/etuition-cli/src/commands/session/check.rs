//! Access check command implementation.

use anyhow::Result;
use clap::Args;

use etuition_core::routes;
use etuition_core::{AccessDecision, AccessGate};

use crate::cli::GlobalArgs;
use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Location to check, e.g. /dashboard/tutor/my-applications
    pub location: String,

    /// Where denied users are sent
    #[arg(long, default_value = routes::LANDING)]
    pub fallback: String,
}

pub async fn run(args: CheckArgs, global: &GlobalArgs) -> Result<()> {
    let session = CliSession::open(global)?;
    let gate = AccessGate::new(args.fallback);

    let required = routes::required_roles(&args.location);
    let (role, decision) = match required {
        // Public locations never need the role.
        None => (None, AccessDecision::Allow),
        Some(roles) => {
            let role = session.roles().resolve(&session.store().snapshot()).await;
            // Re-read: a rejected role lookup logs the session out.
            let decision = gate.evaluate(&session.store().snapshot(), &role, roles);
            (Some(role), decision)
        }
    };
    session.close()?;

    output::field("Location", &args.location);
    output::field(
        "Requires",
        &required.map_or_else(|| "nothing".to_string(), |roles| roles.to_string()),
    );
    match role {
        None => output::field("Role", "not required"),
        Some(state) => output::field("Role", state.role().map_or("none", |r| r.as_str())),
    }
    match &decision {
        AccessDecision::Allow => output::success("allow"),
        AccessDecision::Redirect(to) => output::field("Redirect", to),
        AccessDecision::Pending => output::field("Decision", "pending"),
    }

    Ok(())
}
