use clap::Parser;
use plugin_common::settings::Settings;

use crate::error::CliResult;

#[derive(Parser, Debug, Clone)]
pub struct InfoArgs {}

pub async fn run(_args: InfoArgs, config: &Settings) -> CliResult<()> {
    println!("{}", version_line());
    println!("namespace: {}", config.namespace);
    Ok(())
}

fn version_line() -> String {
    let sha = option_env!("VERGEN_GIT_SHA").unwrap_or("unknown");
    format!(
        "{} {} ({})",
        env!("CARGO_PKG_VERSION"),
        option_env!("VERGEN_BUILD_DATE").unwrap_or("unknown"),
        sha.get(..8).unwrap_or(sha)
    )
}
