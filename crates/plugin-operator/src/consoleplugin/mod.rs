//! Desired state of the console plugin.
//!
//! Pure builders: given a namespace and a [`PluginConfig`] they return the
//! objects the reconciler writes. Nothing here talks to the cluster.

pub mod config;
pub mod manifest;
pub mod objects;

pub use config::PluginConfig;
pub use manifest::render_manifests;
pub use objects::{config_map, console_plugin, deployment, labels, nginx_conf, service};
