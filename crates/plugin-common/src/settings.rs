use std::{env, path::Path, sync::OnceLock};

use config::File;
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::error::{CommonError, CommonResult};

pub static CONFIG_INSTANCE: OnceLock<Settings> = OnceLock::new();

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Settings {
    /// Namespace the plugin Deployment, Service and ConfigMap are written to.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default = "default_log_level")]
    pub log_level: LevelFilter,

    /// Delay before a failed reconciliation is retried.
    #[serde(default = "default_error_requeue_secs")]
    pub error_requeue_secs: u64,

    /// Name of the singleton ClusterVersion fetched by one-shot reconciles.
    #[serde(default = "default_cluster_version_name")]
    pub cluster_version_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            log_level: default_log_level(),
            error_requeue_secs: default_error_requeue_secs(),
            cluster_version_name: default_cluster_version_name(),
        }
    }
}

pub fn get_config() -> CommonResult<&'static Settings> {
    CONFIG_INSTANCE.get().ok_or(CommonError::ConfigNotInitialized)
}

pub fn set_config(settings: Settings) -> CommonResult<&'static Settings> {
    CONFIG_INSTANCE
        .set(settings)
        .map_err(|_| CommonError::ConfigAlreadyInitialized)?;
    get_config()
}

impl Settings {
    /// Layer an explicit settings file (when given) over the optional
    /// `config`, `config/default` and `config.<RUN_MODE>` files in the
    /// working directory.
    pub fn load(settings_file: Option<&Path>) -> CommonResult<Self> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let mut s = config::Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config.{}", run_mode)).required(false));

        if let Some(path) = settings_file {
            if !path.is_file() {
                return Err(CommonError::IOError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("settings file {} does not exist", path.display()),
                )));
            }
            s = s.add_source(File::from(path));
        }

        let cfg = s.build()?.try_deserialize()?;
        Ok(cfg)
    }

    pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
        if let Some(namespace) = namespace {
            self.namespace = namespace;
        }
        self
    }
}

fn default_namespace() -> String {
    "openshift-console-plugins".to_string()
}

fn default_log_level() -> LevelFilter {
    LevelFilter::Info
}

fn default_error_requeue_secs() -> u64 {
    5
}

fn default_cluster_version_name() -> String {
    "version".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_any_file() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.namespace, "openshift-console-plugins");
        assert_eq!(settings.error_requeue_secs, 5);
    }

    #[test]
    fn test_settings_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "namespace: plugins\nlog_level: debug\nerror_requeue_secs: 30").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.namespace, "plugins");
        assert_eq!(settings.log_level, LevelFilter::Debug);
        assert_eq!(settings.error_requeue_secs, 30);
        assert_eq!(settings.cluster_version_name, "version");
    }

    #[test]
    fn test_missing_settings_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(matches!(
            Settings::load(Some(&missing)),
            Err(CommonError::IOError(_))
        ));
    }

    #[test]
    fn test_namespace_override() {
        let settings = Settings::default().with_namespace(Some("elsewhere".to_string()));
        assert_eq!(settings.namespace, "elsewhere");
        let settings = settings.with_namespace(None);
        assert_eq!(settings.namespace, "elsewhere");
    }
}
