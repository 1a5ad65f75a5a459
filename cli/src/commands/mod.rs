/// Subcommands that read from the CMS.
pub mod api;

use anyhow::{Context, Result};
use bugninja_shared::cms_api::{CmsClient, CmsConfig};
use serde::Serialize;

use crate::cli::{Cli, CmsArgs};

/// Environment settings with command-line overrides applied.
pub fn cms_config(args: CmsArgs) -> Result<CmsConfig> {
    let mut config = CmsConfig::from_env().context("invalid CMS environment")?;
    if let Some(url) = args.cms_url {
        config.api_url = url;
    }
    if let Some(url) = args.public_url {
        config.public_url = url;
    }
    if let Some(token) = args.token {
        config.token = Some(token);
    }
    if let Some(slug_lookup) = args.slug_lookup {
        config.slug_lookup = slug_lookup;
    }
    Ok(config)
}

/// Builds the client, runs the subcommand and prints its JSON.
pub async fn run(cli: Cli) -> Result<()> {
    let config = cms_config(cli.cms)?;
    tracing::debug!("using CMS at {}", config.api_url);
    let client = CmsClient::new(config).context("failed to build CMS client")?;
    let output = api::execute(&client, cli.command).await?;
    print_json(&output)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
