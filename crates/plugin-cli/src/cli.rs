use std::path::PathBuf;

use clap::{Parser, Subcommand};
use plugin_common::util::tracing::setup_tracing;

use crate::{error::CliResult, init::init_config};

mod info;
mod reconcile;
mod render;
mod run;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Log level used when RUST_LOG is not set; overrides the settings file
    #[arg(short('l'), long, value_name("LEVEL"))]
    pub log_level: Option<log::LevelFilter>,

    /// Settings file layered over the default config locations
    #[arg(short, long)]
    pub settings: Option<PathBuf>,

    /// Namespace for the plugin Deployment, Service and ConfigMap
    #[arg(short, long)]
    pub namespace: Option<String>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    #[command(about = "Show version and build information")]
    Info(info::InfoArgs),
    #[command(about = "Run the operator until interrupted")]
    Run(run::RunArgs),
    #[command(about = "Run a single reconciliation pass and exit", alias = "r")]
    Reconcile(reconcile::ReconcileArgs),
    #[command(about = "Print the desired plugin objects as YAML")]
    Render(render::RenderArgs),
}

pub async fn exec() -> CliResult {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let cfg = init_config(&cli)?;
    setup_tracing(Some(cli.log_level.unwrap_or(cfg.log_level)))?;

    match cli.cmd {
        Command::Info(args) => info::run(args, cfg).await?,
        Command::Run(args) => run::run(args, cfg).await?,
        Command::Reconcile(args) => reconcile::run(args, cfg).await?,
        Command::Render(args) => render::run(args, cfg).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_global_flags() {
        let cli = Cli::try_parse_from(["cpo", "-n", "plugins", "--log-level", "debug", "render"])
            .unwrap();
        assert_eq!(cli.namespace.as_deref(), Some("plugins"));
        assert_eq!(cli.log_level, Some(log::LevelFilter::Debug));
        assert!(matches!(cli.cmd, Command::Render(_)));
    }

    #[test]
    fn test_reconcile_alias() {
        let cli = Cli::try_parse_from(["cpo", "r", "--cluster-version", "other"]).unwrap();
        match cli.cmd {
            Command::Reconcile(args) => assert_eq!(args.cluster_version.as_deref(), Some("other")),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
