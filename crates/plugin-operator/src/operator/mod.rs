pub mod crd;
pub mod owner;
pub mod reconcile;
pub mod store;

use std::sync::Arc;
use std::time::Duration;

use crd::ClusterVersion;
use futures::StreamExt;
use kube::runtime::{watcher, Controller};
use kube::{Api, Client};
use plugin_common::settings::Settings;
use reconcile::{ContextData, PluginReconciler, PluginStores};
use tracing::{error, info};

use crate::consoleplugin::PluginConfig;
use crate::error::OperatorResult;

pub use reconcile::PassSummary;
pub use store::{Operation, WriteOutcome};

/// Build a reconciler writing into the configured namespace.
pub fn plugin_reconciler(client: Client, settings: &Settings) -> PluginReconciler {
    PluginReconciler::new(
        settings.namespace.clone(),
        PluginConfig::default(),
        PluginStores::from_client(client, &settings.namespace),
    )
}

/// Run one pass up front, then reconcile on every ClusterVersion change
/// until a shutdown signal arrives.
pub async fn operator(client: Client, settings: &Settings) -> OperatorResult<()> {
    let reconciler = plugin_reconciler(client.clone(), settings);
    run_operator(
        client,
        reconciler,
        Duration::from_secs(settings.error_requeue_secs),
    )
    .await
}

/// A failed startup pass is returned before the controller starts.
async fn run_operator(
    client: Client,
    reconciler: PluginReconciler,
    error_requeue: Duration,
) -> OperatorResult<()> {
    info!(namespace = %reconciler.namespace(), plugin = %reconciler.plugin().name, "starting console plugin operator");

    let summary = reconciler.reconcile_plugin_resources().await?;
    info!(?summary, "startup reconciliation finished");

    let cluster_versions: Api<ClusterVersion> = Api::all(client);
    let context = Arc::new(ContextData::new(reconciler, error_requeue));

    Controller::new(cluster_versions, watcher::Config::default())
        .shutdown_on_signal()
        .run(reconcile::reconcile, reconcile::on_error, context)
        .for_each(|recon_result| async move {
            match recon_result {
                Ok((cluster_version, _action)) => {
                    info!(cluster_version = %cluster_version.name, "reconciliation successful")
                }
                Err(err) => error!(error = %err, "reconciliation error"),
            }
        })
        .await;

    info!("console plugin operator stopped");
    Ok(())
}
