//! Tuition commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use etuition_http::models::{TuitionQuery, TuitionStatus};

use crate::cli::GlobalArgs;
use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct TuitionsArgs {
    #[command(subcommand)]
    pub command: TuitionsSubcommand,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,
}

#[derive(Subcommand, Debug)]
pub enum TuitionsSubcommand {
    /// Public listing of approved tuitions
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },

    /// Tuitions posted by the signed-in student
    Mine,

    /// A single tuition
    Show { id: String },

    /// Every tuition, for moderation (admin)
    All {
        /// pending, approved, rejected or booked
        #[arg(long)]
        status: Option<String>,
    },

    /// Approve, reject or book a tuition (admin)
    SetStatus { id: String, status: String },
}

pub async fn run(args: TuitionsArgs, global: &GlobalArgs) -> Result<()> {
    let session = match args.command {
        TuitionsSubcommand::List { .. } => CliSession::open(global)?,
        _ => CliSession::require(global)?,
    };
    let result = execute(&session, args.command, args.pretty).await;
    session.close()?;
    result
}

async fn execute(session: &CliSession, command: TuitionsSubcommand, pretty: bool) -> Result<()> {
    let api = session.api();

    match command {
        TuitionsSubcommand::List {
            page,
            limit,
            search,
            subject,
            location,
        } => {
            let query = TuitionQuery {
                page,
                limit,
                search,
                subject,
                location,
                ..TuitionQuery::default()
            };
            let listing = api.tuitions(&query).await.context("Failed to list tuitions")?;
            output::json_lines(&listing.tuitions, pretty)?;
            eprintln!(
                "{}",
                format!("Page {} of {}", page, listing.total_pages).dimmed()
            );
        }
        TuitionsSubcommand::Mine => {
            let tuitions = api.my_tuitions().await.context("Failed to list tuitions")?;
            output::json_lines(&tuitions, pretty)?;
        }
        TuitionsSubcommand::Show { id } => {
            let tuition = api.tuition(&id).await.context("Failed to fetch tuition")?;
            output::json_pretty(&tuition)?;
        }
        TuitionsSubcommand::All { status } => {
            let status = status
                .as_deref()
                .map(str::parse::<TuitionStatus>)
                .transpose()
                .context("Invalid status")?;
            let tuitions = api
                .all_tuitions(status)
                .await
                .context("Failed to list tuitions")?;
            output::json_lines(&tuitions, pretty)?;
        }
        TuitionsSubcommand::SetStatus { id, status } => {
            let status: TuitionStatus = status.parse().context("Invalid status")?;
            api.set_tuition_status(&id, status)
                .await
                .context("Failed to update tuition")?;
            output::success(&format!("Tuition {} is now {}", id, status.as_str()));
        }
    }

    Ok(())
}
