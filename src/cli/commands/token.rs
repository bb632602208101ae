use anyhow::Context;
use clap::Args;

use crate::auth::{issue_dev_token, Claims};
use crate::cli::{utils, OutputFormat};
use crate::config;

#[derive(Args)]
pub struct DevTokenArgs {
    #[arg(long, default_value = "dev@localhost", help = "Token subject")]
    pub subject: String,

    #[arg(long, help = "Display name")]
    pub name: Option<String>,

    #[arg(long, default_value_t = 8, help = "Lifetime in hours")]
    pub hours: i64,
}

pub fn handle(args: DevTokenArgs, output_format: &OutputFormat) -> anyhow::Result<()> {
    let secret = config::config()
        .security
        .auth
        .dev_secret
        .as_deref()
        .filter(|s| !s.is_empty())
        .context("AUTH_DEV_SECRET is not set")?;

    let claims = Claims::development(&args.subject, args.name.as_deref(), args.hours);
    let token = issue_dev_token(secret, &claims)?;
    utils::output_value(output_format, "accessToken", &token)
}
