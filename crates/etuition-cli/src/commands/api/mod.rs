//! Backend subcommand implementations.

mod applications;
mod payments;
mod request;
mod stats;
mod tuitions;
mod tutors;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::cli::GlobalArgs;

#[derive(Args, Debug)]
pub struct ApiCommand {
    #[command(subcommand)]
    pub command: ApiSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ApiSubcommand {
    /// Send a raw request through the authenticated client
    Request(request::RequestArgs),

    /// Browse and moderate tuitions
    Tuitions(tuitions::TuitionsArgs),

    /// Tutor applications
    Applications(applications::ApplicationsArgs),

    /// Payment history
    Payments(payments::PaymentsArgs),

    /// Admin dashboard totals
    Stats(stats::StatsArgs),

    /// Browse the tutor directory
    Tutors(tutors::TutorsArgs),
}

pub async fn handle(cmd: ApiCommand, global: &GlobalArgs) -> Result<()> {
    match cmd.command {
        ApiSubcommand::Request(args) => request::run(args, global).await,
        ApiSubcommand::Tuitions(args) => tuitions::run(args, global).await,
        ApiSubcommand::Applications(args) => applications::run(args, global).await,
        ApiSubcommand::Payments(args) => payments::run(args, global).await,
        ApiSubcommand::Stats(args) => stats::run(args, global).await,
        ApiSubcommand::Tutors(args) => tutors::run(args, global).await,
    }
}
