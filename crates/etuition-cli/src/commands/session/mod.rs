//! Session subcommand implementations.

mod check;
mod login;
mod logout;
mod role;
mod whoami;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::cli::GlobalArgs;

#[derive(Args, Debug)]
pub struct SessionCommand {
    #[command(subcommand)]
    pub command: SessionSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum SessionSubcommand {
    /// Store a signed-in identity and its credential
    Login(login::LoginArgs),

    /// Forget the stored session
    Logout(logout::LogoutArgs),

    /// Display the stored session
    Whoami(whoami::WhoamiArgs),

    /// Look up the signed-in user's role
    Role(role::RoleArgs),

    /// Show what the access gate decides for a location
    Check(check::CheckArgs),
}

pub async fn handle(cmd: SessionCommand, global: &GlobalArgs) -> Result<()> {
    match cmd.command {
        SessionSubcommand::Login(args) => login::run(args, global).await,
        SessionSubcommand::Logout(args) => logout::run(args).await,
        SessionSubcommand::Whoami(args) => whoami::run(args, global).await,
        SessionSubcommand::Role(args) => role::run(args, global).await,
        SessionSubcommand::Check(args) => check::run(args, global).await,
    }
}
