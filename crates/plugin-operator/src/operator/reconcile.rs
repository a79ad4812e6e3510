use std::sync::Arc;
use std::time::Duration;

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, Service};
use kube::runtime::controller::Action;
use kube::{Api, Client, Resource, ResourceExt};
use tracing::{info, instrument, warn};

use super::crd::{ClusterVersion, ConsolePlugin};
use super::owner::set_controller_reference;
use super::store::{create_or_update, ObjectStore, Operation, WriteOutcome};
use crate::consoleplugin::{self, PluginConfig};
use crate::error::{OperatorError, OperatorResult};

/// One store per kind the reconciler reads or writes.
#[derive(Clone)]
pub struct PluginStores {
    pub cluster_versions: Arc<dyn ObjectStore<ClusterVersion>>,
    pub deployments: Arc<dyn ObjectStore<Deployment>>,
    pub services: Arc<dyn ObjectStore<Service>>,
    pub config_maps: Arc<dyn ObjectStore<ConfigMap>>,
    pub console_plugins: Arc<dyn ObjectStore<ConsolePlugin>>,
}

impl PluginStores {
    /// Stores backed by the API server. Cluster-scoped kinds ignore `namespace`.
    pub fn from_client(client: Client, namespace: &str) -> Self {
        Self {
            cluster_versions: Arc::new(Api::<ClusterVersion>::all(client.clone())),
            deployments: Arc::new(Api::<Deployment>::namespaced(client.clone(), namespace)),
            services: Arc::new(Api::<Service>::namespaced(client.clone(), namespace)),
            config_maps: Arc::new(Api::<ConfigMap>::namespaced(client.clone(), namespace)),
            console_plugins: Arc::new(Api::<ConsolePlugin>::all(client)),
        }
    }
}

/// Operations performed by one reconciliation pass, in step order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    pub deployment: Operation,
    pub service: Operation,
    pub config_map: Operation,
    pub console_plugin: Operation,
}

pub struct PluginReconciler {
    namespace: String,
    plugin: PluginConfig,
    stores: PluginStores,
}

impl PluginReconciler {
    pub fn new(namespace: impl Into<String>, plugin: PluginConfig, stores: PluginStores) -> Self {
        Self {
            namespace: namespace.into(),
            plugin,
            stores,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn plugin(&self) -> &PluginConfig {
        &self.plugin
    }

    /// Watch-driven pass: the ClusterVersion must still exist.
    pub async fn reconcile_cluster_version(&self, name: &str) -> OperatorResult<PassSummary> {
        if self.stores.cluster_versions.get(name).await?.is_none() {
            return Err(OperatorError::NotFound {
                kind: ClusterVersion::kind(&()).to_string(),
                name: name.to_string(),
            });
        }
        self.reconcile_plugin_resources().await
    }

    /// Write the Deployment, Service, ConfigMap and ConsolePlugin in that
    /// order. The first failure ends the pass.
    #[instrument(skip(self), fields(namespace = %self.namespace))]
    pub async fn reconcile_plugin_resources(&self) -> OperatorResult<PassSummary> {
        let (deployment_op, deployment) = self.reconcile_deployment().await?;
        let service = self.reconcile_service(&deployment).await?;
        let config_map = self.reconcile_config_map(&deployment).await?;
        let console_plugin = self.reconcile_console_plugin().await?;

        Ok(PassSummary {
            deployment: deployment_op,
            service,
            config_map,
            console_plugin,
        })
    }

    /// The Deployment is only ever created; an existing one is left as is so
    /// the plugin pod is not rolled on every pass.
    async fn reconcile_deployment(&self) -> OperatorResult<(Operation, Deployment)> {
        let desired = consoleplugin::deployment(&self.namespace, &self.plugin);
        let name = desired.name_any();
        let outcome = create_or_update(self.stores.deployments.as_ref(), desired, |_| Ok(())).await;

        match outcome {
            WriteOutcome::Created(d) => Ok(log_done("Deployment", &name, Operation::Created, d)),
            // The mutate step is a no-op, so an existing Deployment is never rewritten.
            WriteOutcome::Updated(d) | WriteOutcome::Unchanged(d) => {
                Ok(log_done("Deployment", &name, Operation::Unchanged, d))
            }
            WriteOutcome::AlreadyExists => Err(OperatorError::AlreadyExists {
                kind: "Deployment".to_string(),
                name,
            }),
            WriteOutcome::Failed(err) => Err(err),
        }
    }

    async fn reconcile_service(&self, owner: &Deployment) -> OperatorResult<Operation> {
        let desired = consoleplugin::service(&self.namespace, &self.plugin);
        let outcome = create_or_update(self.stores.services.as_ref(), desired, |service| {
            set_controller_reference(owner, service)
        })
        .await;
        tolerate_already_exists("Service", &self.plugin.name, outcome)
    }

    async fn reconcile_config_map(&self, owner: &Deployment) -> OperatorResult<Operation> {
        let desired = consoleplugin::config_map(&self.namespace, &self.plugin);
        let outcome = create_or_update(self.stores.config_maps.as_ref(), desired, |config_map| {
            set_controller_reference(owner, config_map)
        })
        .await;
        tolerate_already_exists("ConfigMap", &self.plugin.config_volume, outcome)
    }

    /// Cluster-scoped, so no owner reference to the namespaced Deployment.
    async fn reconcile_console_plugin(&self) -> OperatorResult<Operation> {
        let desired = consoleplugin::console_plugin(&self.namespace, &self.plugin);
        let outcome =
            create_or_update(self.stores.console_plugins.as_ref(), desired, |_| Ok(())).await;
        tolerate_already_exists("ConsolePlugin", &self.plugin.name, outcome)
    }
}

fn log_done<K>(kind: &str, name: &str, operation: Operation, object: K) -> (Operation, K) {
    info!(kind, name, %operation, "{kind} successfully reconciled");
    (operation, object)
}

/// Treat a lost create race as success; every other failure aborts the pass.
fn tolerate_already_exists<K>(
    kind: &str,
    name: &str,
    outcome: WriteOutcome<K>,
) -> OperatorResult<Operation> {
    match outcome {
        WriteOutcome::Failed(err) => {
            warn!(kind, name, error = %err, "{kind} reconcile failed");
            Err(err)
        }
        outcome => {
            let operation = outcome.operation().unwrap_or(Operation::AlreadyExists);
            info!(kind, name, %operation, "{kind} successfully reconciled");
            Ok(operation)
        }
    }
}

pub struct ContextData {
    reconciler: PluginReconciler,
    error_requeue: Duration,
}

impl ContextData {
    pub fn new(reconciler: PluginReconciler, error_requeue: Duration) -> Self {
        Self {
            reconciler,
            error_requeue,
        }
    }
}

pub async fn reconcile(
    cluster_version: Arc<ClusterVersion>,
    context: Arc<ContextData>,
) -> OperatorResult<Action> {
    let name = cluster_version.name_any();
    let summary = context.reconciler.reconcile_cluster_version(&name).await?;
    info!(cluster_version = %name, ?summary, "plugin resources reconciled");
    Ok(Action::await_change())
}

pub fn on_error(
    cluster_version: Arc<ClusterVersion>,
    error: &OperatorError,
    context: Arc<ContextData>,
) -> Action {
    warn!(
        cluster_version = %cluster_version.name_any(),
        %error,
        "reconciliation failed, retrying in {:?}",
        context.error_requeue
    );
    Action::requeue(context.error_requeue)
}
