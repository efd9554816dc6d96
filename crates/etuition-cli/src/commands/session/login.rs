//! Login command implementation.
//!
//! Sign-in itself happens at the identity provider; this stores the result
//! and confirms the backend accepts the credential by looking up the role.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use etuition_core::{AccessToken, ApiUrl, Email, SessionStore, UserIdentity};

use crate::cli::GlobalArgs;
use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Display name
    #[arg(long)]
    pub name: String,

    /// Identity-provider user id (defaults to the email)
    #[arg(long)]
    pub id: Option<String>,

    /// Bearer credential issued by the identity provider
    #[arg(long, env = "ETUITION_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Profile photo URL
    #[arg(long)]
    pub avatar: Option<String>,
}

pub async fn run(args: LoginArgs, global: &GlobalArgs) -> Result<()> {
    let api = ApiUrl::new(&global.api).context("Invalid API URL")?;
    let email = Email::new(&args.email).context("Invalid email")?;

    let mut identity = UserIdentity::new(
        args.id.unwrap_or_else(|| email.to_string()),
        args.name,
        email,
    );
    if let Some(avatar) = args.avatar {
        identity = identity.with_avatar(avatar);
    }

    let store = SessionStore::new();
    store.login(identity, args.token.map(AccessToken::new));
    let mut session = CliSession::fresh(api, store, global)?;

    eprintln!("{}", "Verifying credential...".dimmed());
    let snapshot = session.store().snapshot();
    let role = session.roles().resolve(&snapshot).await;

    if !session.store().snapshot().is_authenticated() {
        anyhow::bail!("The backend rejected the credential");
    }

    session.save()?;

    output::success("Logged in successfully");
    println!();
    output::field("Email", snapshot.identity().map(|i| i.email.as_str()).unwrap_or_default());
    output::field("API", session.client().base_url().as_str());
    match role.role() {
        Some(role) => output::field("Role", role.as_str()),
        None => output::field("Role", "unknown (lookup failed)"),
    }

    Ok(())
}
