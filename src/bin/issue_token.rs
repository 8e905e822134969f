//! Mints a bearer token for local development and smoke testing.
//!
//! Uses the same configuration as the server, so the token validates against
//! a server started from the same `config/` directory and environment.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use supply_insights_api::{
    auth::{AuthService, TokenSubject},
    config,
};

#[derive(Debug, Parser)]
#[command(name = "issue-token", about = "Issue a signed bearer token for the dashboard API")]
struct Cli {
    /// Subject (user id) embedded in the token
    #[arg(long, default_value = "local-dev-user")]
    sub: String,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    email: Option<String>,

    /// Avatar URL reported by the profile endpoint
    #[arg(long)]
    picture: Option<String>,

    #[arg(long)]
    role: Option<String>,

    #[arg(long)]
    location: Option<String>,

    /// Lifetime in seconds; defaults to the configured token TTL
    #[arg(long)]
    ttl: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config().context("failed to load configuration")?;

    let mut auth_config = cfg.auth_config();
    if let Some(ttl) = cli.ttl {
        auth_config.token_ttl = Duration::from_secs(ttl);
    }

    let subject = TokenSubject {
        name: cli.name,
        email: cli.email,
        picture: cli.picture,
        role: cli.role,
        location: cli.location,
        ..TokenSubject::new(cli.sub)
    };

    let token = AuthService::new(auth_config)
        .issue_token(&subject)
        .context("failed to sign token")?;
    println!("{}", token);
    Ok(())
}
