use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{
    Deployment, DeploymentSpec, DeploymentStrategy, RollingUpdateDeployment,
};
use k8s_openapi::api::core::v1::{
    Capabilities, ConfigMap, ConfigMapVolumeSource, Container, ContainerPort, PodSecurityContext,
    PodSpec, PodTemplateSpec, ResourceRequirements, SeccompProfile, SecretVolumeSource,
    SecurityContext, Service, ServicePort, ServiceSpec, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

use super::config::PluginConfig;
use crate::operator::crd::{ConsolePlugin, ConsolePluginService, ConsolePluginSpec};

pub const APP_LABEL: &str = "app";
pub const COMPONENT_LABEL: &str = "app.kubernetes.io/component";
pub const INSTANCE_LABEL: &str = "app.kubernetes.io/instance";
pub const PART_OF_LABEL: &str = "app.kubernetes.io/part-of";
pub const RUNTIME_NAMESPACE_LABEL: &str = "app.openshift.io/runtime-namespace";
pub const SERVING_CERT_ANNOTATION: &str = "service.alpha.openshift.io/serving-cert-secret-name";

/// Secret and ConfigMap volumes are mounted world-readable (0644).
const VOLUME_DEFAULT_MODE: i32 = 420;
const ROLLING_UPDATE_PERCENT: &str = "25%";

/// Selector label shared by the Deployment's pods and the Service.
pub fn selector_labels(config: &PluginConfig) -> BTreeMap<String, String> {
    BTreeMap::from([(APP_LABEL.to_string(), config.name.clone())])
}

/// Full label set carried by the Deployment and the Service.
pub fn labels(config: &PluginConfig) -> BTreeMap<String, String> {
    let mut labels = selector_labels(config);
    for key in [COMPONENT_LABEL, INSTANCE_LABEL, PART_OF_LABEL] {
        labels.insert(key.to_string(), config.name.clone());
    }
    labels
}

pub fn console_plugin(namespace: &str, config: &PluginConfig) -> ConsolePlugin {
    ConsolePlugin::new(
        &config.name,
        ConsolePluginSpec {
            display_name: config.display_name.clone(),
            service: ConsolePluginService {
                name: config.name.clone(),
                namespace: namespace.to_string(),
                port: config.port,
                base_path: config.base_path.clone(),
            },
        },
    )
}

pub fn service(namespace: &str, config: &PluginConfig) -> Service {
    Service {
        metadata: ObjectMeta {
            name: Some(config.name.clone()),
            namespace: Some(namespace.to_string()),
            annotations: Some(BTreeMap::from([(
                SERVING_CERT_ANNOTATION.to_string(),
                config.secret_name.clone(),
            )])),
            labels: Some(labels(config)),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            ports: Some(vec![ServicePort {
                name: Some(config.port_name()),
                protocol: Some("TCP".to_string()),
                port: config.port,
                target_port: Some(IntOrString::Int(config.port)),
                ..Default::default()
            }]),
            selector: Some(selector_labels(config)),
            type_: Some("ClusterIP".to_string()),
            session_affinity: Some("None".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn deployment(namespace: &str, config: &PluginConfig) -> Deployment {
    let mut deployment_labels = labels(config);
    deployment_labels.insert(
        RUNTIME_NAMESPACE_LABEL.to_string(),
        namespace.to_string(),
    );

    let resources = ResourceRequirements {
        requests: Some(BTreeMap::from([
            ("cpu".to_string(), Quantity(config.cpu_request.clone())),
            ("memory".to_string(), Quantity(config.memory_request.clone())),
        ])),
        ..Default::default()
    };

    let volume_mounts = vec![
        VolumeMount {
            name: config.secret_name.clone(),
            mount_path: config.secret_mount.clone(),
            read_only: Some(true),
            ..Default::default()
        },
        VolumeMount {
            name: config.config_volume.clone(),
            mount_path: config.config_path.clone(),
            sub_path: Some(config.config_sub_path.clone()),
            read_only: Some(true),
            ..Default::default()
        },
    ];

    let volumes = vec![
        Volume {
            name: config.secret_name.clone(),
            secret: Some(SecretVolumeSource {
                secret_name: Some(config.secret_name.clone()),
                default_mode: Some(VOLUME_DEFAULT_MODE),
                ..Default::default()
            }),
            ..Default::default()
        },
        Volume {
            name: config.config_volume.clone(),
            config_map: Some(ConfigMapVolumeSource {
                name: config.config_volume.clone(),
                default_mode: Some(VOLUME_DEFAULT_MODE),
                ..Default::default()
            }),
            ..Default::default()
        },
    ];

    let container = Container {
        name: config.name.clone(),
        image: Some(config.image.clone()),
        image_pull_policy: Some("Always".to_string()),
        ports: Some(vec![ContainerPort {
            container_port: config.port,
            protocol: Some("TCP".to_string()),
            ..Default::default()
        }]),
        security_context: Some(SecurityContext {
            allow_privilege_escalation: Some(false),
            capabilities: Some(Capabilities {
                drop: Some(vec!["ALL".to_string()]),
                ..Default::default()
            }),
            ..Default::default()
        }),
        resources: Some(resources),
        volume_mounts: Some(volume_mounts),
        ..Default::default()
    };

    Deployment {
        metadata: ObjectMeta {
            name: Some(config.name.clone()),
            namespace: Some(namespace.to_string()),
            labels: Some(deployment_labels),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(config.replicas),
            selector: LabelSelector {
                match_labels: Some(selector_labels(config)),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(selector_labels(config)),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![container],
                    volumes: Some(volumes),
                    restart_policy: Some("Always".to_string()),
                    dns_policy: Some("ClusterFirst".to_string()),
                    security_context: Some(PodSecurityContext {
                        run_as_non_root: Some(true),
                        seccomp_profile: Some(SeccompProfile {
                            type_: "RuntimeDefault".to_string(),
                            ..Default::default()
                        }),
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
            },
            strategy: Some(DeploymentStrategy {
                type_: Some("RollingUpdate".to_string()),
                rolling_update: Some(RollingUpdateDeployment {
                    max_surge: Some(IntOrString::String(ROLLING_UPDATE_PERCENT.to_string())),
                    max_unavailable: Some(IntOrString::String(
                        ROLLING_UPDATE_PERCENT.to_string(),
                    )),
                }),
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// nginx configuration serving the plugin's static assets over TLS with the
/// certificate the serving-cert annotation provisions.
pub fn nginx_conf(config: &PluginConfig) -> String {
    format!(
        r#"error_log /dev/stdout info;
events {{}}
http {{
    access_log          /dev/stdout;
    include             /etc/nginx/mime.types;
    default_type        application/octet-stream;
    keepalive_timeout   65;
    server {{
        listen              {port} ssl;
        ssl_certificate     {cert};
        ssl_certificate_key {key};
        root                /usr/share/nginx/html;
    }}
}}
"#,
        port = config.port,
        cert = config.tls_cert_path(),
        key = config.tls_key_path(),
    )
}

pub fn config_map(namespace: &str, config: &PluginConfig) -> ConfigMap {
    ConfigMap {
        metadata: ObjectMeta {
            name: Some(config.config_volume.clone()),
            namespace: Some(namespace.to_string()),
            labels: Some(BTreeMap::from([
                (APP_LABEL.to_string(), config.name.clone()),
                (PART_OF_LABEL.to_string(), config.name.clone()),
            ])),
            ..Default::default()
        },
        data: Some(BTreeMap::from([(
            config.config_sub_path.clone(),
            nginx_conf(config),
        )])),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(deployment: &Deployment) -> &Container {
        &deployment
            .spec
            .as_ref()
            .unwrap()
            .template
            .spec
            .as_ref()
            .unwrap()
            .containers[0]
    }

    #[test]
    fn test_service_selector_matches_pod_labels() {
        for namespace in ["default", "openshift-console-plugins", "x"] {
            let config = PluginConfig::default();
            let deployment = deployment(namespace, &config);
            let service = service(namespace, &config);

            let spec = deployment.spec.as_ref().unwrap();
            let pod_labels = spec.template.metadata.as_ref().unwrap().labels.clone();
            let selector = service.spec.as_ref().unwrap().selector.clone();
            assert_eq!(selector, pod_labels);
            assert_eq!(spec.selector.match_labels, pod_labels);
        }
    }

    #[test]
    fn test_console_plugin_references_service() {
        let config = PluginConfig::default();
        let plugin = console_plugin("plugins", &config);
        let service = service("plugins", &config);

        let reference = &plugin.spec.service;
        assert_eq!(Some(&reference.name), service.metadata.name.as_ref());
        assert_eq!(Some(&reference.namespace), service.metadata.namespace.as_ref());
        let port = &service.spec.as_ref().unwrap().ports.as_ref().unwrap()[0];
        assert_eq!(reference.port, port.port);
        assert_eq!(reference.base_path, "/");
        assert_eq!(plugin.spec.display_name, "OpenShift Console SBO Demo Plugin");
        assert!(plugin.metadata.namespace.is_none());
    }

    #[test]
    fn test_objects_share_name_and_app_label() {
        let config = PluginConfig::default();
        let deployment = deployment("ns", &config);
        let service = service("ns", &config);
        let config_map = config_map("ns", &config);
        let plugin = console_plugin("ns", &config);

        assert_eq!(deployment.metadata.name.as_deref(), Some("sbo-demo-plugin"));
        assert_eq!(service.metadata.name.as_deref(), Some("sbo-demo-plugin"));
        assert_eq!(plugin.metadata.name.as_deref(), Some("sbo-demo-plugin"));
        for meta in [&deployment.metadata, &service.metadata, &config_map.metadata] {
            let labels = meta.labels.as_ref().unwrap();
            assert_eq!(labels.get(APP_LABEL).map(String::as_str), Some("sbo-demo-plugin"));
            assert_eq!(labels.get(PART_OF_LABEL).map(String::as_str), Some("sbo-demo-plugin"));
        }
        assert_eq!(
            deployment.metadata.labels.as_ref().unwrap()[RUNTIME_NAMESPACE_LABEL],
            "ns"
        );
    }

    #[test]
    fn test_service_requests_serving_cert() {
        let service = service("ns", &PluginConfig::default());
        let annotations = service.metadata.annotations.as_ref().unwrap();
        assert_eq!(annotations[SERVING_CERT_ANNOTATION], "plugin-serving-cert");

        let spec = service.spec.as_ref().unwrap();
        let port = &spec.ports.as_ref().unwrap()[0];
        assert_eq!(port.name.as_deref(), Some("9443-tcp"));
        assert_eq!(port.protocol.as_deref(), Some("TCP"));
        assert_eq!(port.port, 9443);
        assert_eq!(port.target_port, Some(IntOrString::Int(9443)));
        assert_eq!(spec.type_.as_deref(), Some("ClusterIP"));
    }

    #[test]
    fn test_deployment_container_ports_and_mounts() {
        let deployment = deployment("ns", &PluginConfig::default());
        let container = container(&deployment);

        let port = &container.ports.as_ref().unwrap()[0];
        assert_eq!(port.container_port, 9443);
        assert_eq!(port.protocol.as_deref(), Some("TCP"));

        let mounts = container.volume_mounts.as_ref().unwrap();
        let secret = mounts.iter().find(|m| m.name == "plugin-serving-cert").unwrap();
        assert_eq!(secret.mount_path, "/var/serving-cert");
        assert_eq!(secret.read_only, Some(true));
        let conf = mounts.iter().find(|m| m.name == "nginx-conf").unwrap();
        assert_eq!(conf.mount_path, "/etc/nginx/nginx.conf");
        assert_eq!(conf.sub_path.as_deref(), Some("nginx.conf"));
        assert_eq!(conf.read_only, Some(true));

        let requests = container.resources.as_ref().unwrap().requests.as_ref().unwrap();
        assert_eq!(requests["cpu"], Quantity("10m".to_string()));
        assert_eq!(requests["memory"], Quantity("50Mi".to_string()));
    }

    #[test]
    fn test_deployment_security_settings() {
        let deployment = deployment("ns", &PluginConfig::default());
        let security = container(&deployment).security_context.as_ref().unwrap();
        assert_eq!(security.allow_privilege_escalation, Some(false));
        assert_eq!(
            security.capabilities.as_ref().unwrap().drop,
            Some(vec!["ALL".to_string()])
        );

        let pod = deployment.spec.as_ref().unwrap().template.spec.as_ref().unwrap();
        let pod_security = pod.security_context.as_ref().unwrap();
        assert_eq!(pod_security.run_as_non_root, Some(true));
        assert_eq!(
            pod_security.seccomp_profile.as_ref().unwrap().type_,
            "RuntimeDefault"
        );
    }

    #[test]
    fn test_deployment_volumes_and_strategy() {
        let deployment = deployment("ns", &PluginConfig::default());
        let spec = deployment.spec.as_ref().unwrap();
        assert_eq!(spec.replicas, Some(1));

        let volumes = spec.template.spec.as_ref().unwrap().volumes.as_ref().unwrap();
        let secret = volumes[0].secret.as_ref().unwrap();
        assert_eq!(secret.secret_name.as_deref(), Some("plugin-serving-cert"));
        assert_eq!(secret.default_mode, Some(420));
        let config_map = volumes[1].config_map.as_ref().unwrap();
        assert_eq!(config_map.name, "nginx-conf");

        let rolling = spec.strategy.as_ref().unwrap().rolling_update.as_ref().unwrap();
        assert_eq!(rolling.max_surge, Some(IntOrString::String("25%".to_string())));
        assert_eq!(rolling.max_unavailable, Some(IntOrString::String("25%".to_string())));
    }

    #[test]
    fn test_nginx_conf_listens_with_tls() {
        let conf = nginx_conf(&PluginConfig::default());
        assert!(conf.contains("listen              9443 ssl;"));
        assert!(conf.contains("ssl_certificate     /var/serving-cert/tls.crt;"));
        assert!(conf.contains("ssl_certificate_key /var/serving-cert/tls.key;"));
        assert!(conf.contains("root                /usr/share/nginx/html;"));
    }

    #[test]
    fn test_config_map_holds_nginx_conf() {
        let config = PluginConfig::default();
        let config_map = config_map("ns", &config);
        assert_eq!(config_map.metadata.name.as_deref(), Some("nginx-conf"));
        assert_eq!(config_map.metadata.namespace.as_deref(), Some("ns"));
        let data = config_map.data.as_ref().unwrap();
        assert_eq!(data["nginx.conf"], nginx_conf(&config));
    }

    #[test]
    fn test_builders_follow_custom_config() {
        let config = PluginConfig {
            name: "other".to_string(),
            port: 8443,
            secret_mount: "/certs".to_string(),
            ..Default::default()
        };
        let service = service("ns", &config);
        assert_eq!(service.spec.as_ref().unwrap().ports.as_ref().unwrap()[0].port, 8443);
        assert_eq!(console_plugin("ns", &config).spec.service.name, "other");
        let conf = nginx_conf(&config);
        assert!(conf.contains("listen              8443 ssl;"));
        assert!(conf.contains("/certs/tls.key"));
    }
}
