use std::io::Write;

use clap::Parser;
use plugin_common::settings::Settings;
use plugin_operator::consoleplugin::{render_manifests, PluginConfig};

use crate::error::CliResult;

#[derive(Parser, Debug, Clone)]
pub struct RenderArgs {}

pub async fn run(_args: RenderArgs, config: &Settings) -> CliResult<()> {
    let yaml = render_manifests(&config.namespace, &PluginConfig::default())?;
    std::io::stdout().write_all(yaml.as_bytes())?;
    Ok(())
}
