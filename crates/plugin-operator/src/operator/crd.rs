use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Registers a dynamic plugin with the OpenShift web console.
///
/// Cluster-scoped, so it cannot carry an owner reference to the namespaced
/// Deployment that serves it.
#[derive(CustomResource, Serialize, Deserialize, Debug, PartialEq, Clone, Default, JsonSchema)]
#[kube(
    group = "console.openshift.io",
    version = "v1alpha1",
    kind = "ConsolePlugin",
    plural = "consoleplugins",
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct ConsolePluginSpec {
    pub display_name: String,
    pub service: ConsolePluginService,
}

/// Service the console proxies plugin assets from.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsolePluginService {
    pub name: String,
    pub namespace: String,
    pub port: i32,
    pub base_path: String,
}

/// The cluster's singleton version object. Only its existence matters here:
/// any change to it triggers a reconciliation pass.
#[derive(CustomResource, Serialize, Deserialize, Debug, PartialEq, Clone, Default, JsonSchema)]
#[kube(
    group = "config.openshift.io",
    version = "v1",
    kind = "ClusterVersion",
    plural = "clusterversions",
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterVersionSpec {
    #[serde(rename = "clusterID")]
    pub cluster_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream: Option<String>,
}
