use serde::Serialize;

use super::{config_map, console_plugin, deployment, service, PluginConfig};
use crate::error::OperatorResult;

/// The four desired objects as one multi-document YAML stream, in the order
/// the reconciler writes them.
pub fn render_manifests(namespace: &str, config: &PluginConfig) -> OperatorResult<String> {
    let documents = [
        to_document(&deployment(namespace, config))?,
        to_document(&service(namespace, config))?,
        to_document(&config_map(namespace, config))?,
        to_document(&console_plugin(namespace, config))?,
    ];
    Ok(documents.join("---\n"))
}

fn to_document<T: Serialize>(object: &T) -> OperatorResult<String> {
    Ok(serde_yaml::to_string(object)?)
}
