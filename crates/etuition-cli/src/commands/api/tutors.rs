//! Tutor directory command.

use anyhow::{Context, Result};
use clap::Args;

use etuition_http::models::TutorQuery;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct TutorsArgs {
    /// Fetch a single tutor by id
    pub id: Option<String>,

    #[arg(long)]
    pub search: Option<String>,

    #[arg(long)]
    pub subject: Option<String>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(args: TutorsArgs, global: &GlobalArgs) -> Result<()> {
    let session = CliSession::open(global)?;
    let api = session.api();

    let result = match &args.id {
        Some(id) => api.tutor(id).await.map(|tutor| vec![tutor]),
        None => {
            let query = TutorQuery {
                search: args.search.clone(),
                subject: args.subject.clone(),
                ..TutorQuery::default()
            };
            api.tutors(&query).await
        }
    };
    session.close()?;

    let tutors = result.context("Failed to fetch tutors")?;
    output::json_lines(&tutors, args.pretty)
}
