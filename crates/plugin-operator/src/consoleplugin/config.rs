pub const PLUGIN_NAME: &str = "sbo-demo-plugin";
pub const PLUGIN_DISPLAY_NAME: &str = "OpenShift Console SBO Demo Plugin";
pub const PLUGIN_PORT: i32 = 9443;
pub const PLUGIN_BASE_PATH: &str = "/";
pub const PLUGIN_REPLICAS: i32 = 1;
pub const PLUGIN_IMAGE: &str = "quay.io/rh_ee_pknight/sbo-demo-plugin";
pub const CPU_REQUEST: &str = "10m";
pub const MEMORY_REQUEST: &str = "50Mi";
pub const SECRET_NAME: &str = "plugin-serving-cert";
pub const SECRET_MOUNT: &str = "/var/serving-cert";
pub const CONFIG_VOLUME: &str = "nginx-conf";
pub const CONFIG_PATH: &str = "/etc/nginx/nginx.conf";
pub const SUB_PATH_CONF: &str = "nginx.conf";

/// Everything the builders need to describe the plugin.
///
/// `Default` carries the fixed values the operator ships with. Tests build
/// their own to check that nothing downstream hardcodes a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginConfig {
    pub name: String,
    pub display_name: String,
    pub port: i32,
    pub base_path: String,
    pub replicas: i32,
    pub image: String,
    pub cpu_request: String,
    pub memory_request: String,
    pub secret_name: String,
    pub secret_mount: String,
    pub config_volume: String,
    pub config_path: String,
    pub config_sub_path: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            name: PLUGIN_NAME.to_string(),
            display_name: PLUGIN_DISPLAY_NAME.to_string(),
            port: PLUGIN_PORT,
            base_path: PLUGIN_BASE_PATH.to_string(),
            replicas: PLUGIN_REPLICAS,
            image: PLUGIN_IMAGE.to_string(),
            cpu_request: CPU_REQUEST.to_string(),
            memory_request: MEMORY_REQUEST.to_string(),
            secret_name: SECRET_NAME.to_string(),
            secret_mount: SECRET_MOUNT.to_string(),
            config_volume: CONFIG_VOLUME.to_string(),
            config_path: CONFIG_PATH.to_string(),
            config_sub_path: SUB_PATH_CONF.to_string(),
        }
    }
}

impl PluginConfig {
    /// Name of the port on the Service, e.g. `9443-tcp`.
    pub fn port_name(&self) -> String {
        format!("{}-tcp", self.port)
    }

    pub fn tls_cert_path(&self) -> String {
        format!("{}/tls.crt", self.secret_mount)
    }

    pub fn tls_key_path(&self) -> String {
        format!("{}/tls.key", self.secret_mount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = PluginConfig::default();
        assert_eq!(config.name, "sbo-demo-plugin");
        assert_eq!(config.port, 9443);
        assert_eq!(config.replicas, 1);
        assert_eq!(config.port_name(), "9443-tcp");
        assert_eq!(config.tls_cert_path(), "/var/serving-cert/tls.crt");
        assert_eq!(config.tls_key_path(), "/var/serving-cert/tls.key");
    }
}
