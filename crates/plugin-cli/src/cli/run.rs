use clap::Parser;
use plugin_common::settings::Settings;
use plugin_operator::operator::operator;
use tracing::info;

use crate::error::CliResult;

#[derive(Parser, Debug, Clone)]
pub struct RunArgs {}

pub async fn run(_args: RunArgs, config: &Settings) -> CliResult<()> {
    info!("Connecting to cluster...");
    let client = kube::Client::try_default().await?;
    operator(client, config).await?;
    Ok(())
}
