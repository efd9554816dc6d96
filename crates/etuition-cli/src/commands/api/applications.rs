//! Application commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use etuition_http::models::ApplicationStatus;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct ApplicationsArgs {
    #[command(subcommand)]
    pub command: ApplicationsSubcommand,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,
}

#[derive(Subcommand, Debug)]
pub enum ApplicationsSubcommand {
    /// Applications sent by the signed-in tutor
    Mine,

    /// Applications received for one of the student's tuitions
    ForTuition { tuition_id: String },

    /// Approve or reject an application
    SetStatus { id: String, status: String },

    /// Withdraw an application
    Delete { id: String },
}

pub async fn run(args: ApplicationsArgs, global: &GlobalArgs) -> Result<()> {
    let session = CliSession::require(global)?;
    let result = execute(&session, args.command, args.pretty).await;
    session.close()?;
    result
}

async fn execute(session: &CliSession, command: ApplicationsSubcommand, pretty: bool) -> Result<()> {
    let api = session.api();

    match command {
        ApplicationsSubcommand::Mine => {
            let snapshot = session.store().snapshot();
            let identity = snapshot.identity().context("No active session")?;
            let applications = api
                .my_applications(&identity.email)
                .await
                .context("Failed to list applications")?;
            output::json_lines(&applications, pretty)?;
        }
        ApplicationsSubcommand::ForTuition { tuition_id } => {
            let applications = api
                .applications_for_tuition(&tuition_id)
                .await
                .context("Failed to list applications")?;
            output::json_lines(&applications, pretty)?;
        }
        ApplicationsSubcommand::SetStatus { id, status } => {
            let status: ApplicationStatus = status.parse().context("Invalid status")?;
            api.set_application_status(&id, status)
                .await
                .context("Failed to update application")?;
            output::success(&format!("Application {} updated", id));
        }
        ApplicationsSubcommand::Delete { id } => {
            api.delete_application(&id)
                .await
                .context("Failed to delete application")?;
            output::success(&format!("Application {} deleted", id));
        }
    }

    Ok(())
}
