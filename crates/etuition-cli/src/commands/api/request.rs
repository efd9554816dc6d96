//! Raw request command implementation.

use anyhow::{Context, Result};
use clap::Args;

use etuition_http::{Method, RequestOptions};

use crate::cli::GlobalArgs;
use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE)
    pub method: String,

    /// Path relative to the API base URL, e.g. /admin-stats
    pub path: String,

    /// JSON request body
    #[arg(long)]
    pub body: Option<String>,

    /// Extra header as `name:value` (repeatable)
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

fn parse_header(raw: &str) -> Result<(&str, &str)> {
    let (name, value) = raw
        .split_once(':')
        .with_context(|| format!("Header '{raw}' is not in name:value form"))?;
    Ok((name.trim(), value.trim()))
}

pub async fn run(args: RequestArgs, global: &GlobalArgs) -> Result<()> {
    let method = Method::from_bytes(args.method.to_ascii_uppercase().as_bytes())
        .context("Invalid HTTP method")?;

    let mut options = RequestOptions::new();
    for raw in &args.headers {
        let (name, value) = parse_header(raw)?;
        options = options.header(name, value).context("Invalid header")?;
    }
    if let Some(body) = &args.body {
        let body: serde_json::Value = serde_json::from_str(body).context("Body is not valid JSON")?;
        options = options.body(body);
    }

    let session = CliSession::open(global)?;
    let result = session.client().request(method, &args.path, options).await;
    session.close()?;

    let response = result.context("Request failed")?;
    if args.pretty {
        output::json_pretty(&response.body)
    } else {
        output::json(&response.body)
    }
}
