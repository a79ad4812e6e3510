use clap::Parser;
use plugin_common::settings::Settings;
use plugin_operator::operator::plugin_reconciler;
use tracing::info;

use crate::error::CliResult;

#[derive(Parser, Debug, Clone)]
pub struct ReconcileArgs {
    /// ClusterVersion that must exist before the pass runs; defaults to the
    /// settings value
    #[arg(long)]
    pub cluster_version: Option<String>,

    /// Skip the ClusterVersion check, as the startup pass does
    #[arg(long, default_value_t = false)]
    pub skip_cluster_version: bool,
}

pub async fn run(args: ReconcileArgs, config: &Settings) -> CliResult<()> {
    let client = kube::Client::try_default().await?;
    let reconciler = plugin_reconciler(client, config);

    let summary = if args.skip_cluster_version {
        reconciler.reconcile_plugin_resources().await?
    } else {
        let name = args
            .cluster_version
            .unwrap_or_else(|| config.cluster_version_name.clone());
        reconciler.reconcile_cluster_version(&name).await?
    };

    info!(?summary, "reconciliation pass finished");
    println!("deployment: {}", summary.deployment);
    println!("service: {}", summary.service);
    println!("configmap: {}", summary.config_map);
    println!("consoleplugin: {}", summary.console_plugin);
    Ok(())
}
