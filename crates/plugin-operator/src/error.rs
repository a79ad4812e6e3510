use plugin_common::error::CommonError;

pub type OperatorResult<T = (), E = OperatorError> = Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum OperatorError {
    #[error("Runtime error: {0}")]
    Runtime(#[from] anyhow::Error),

    #[error("Common error: {0}")]
    Common(#[from] CommonError),

    /// Any error originating from the `kube-rs` crate
    #[error("Kubernetes reported error: {source}")]
    Kube {
        #[from]
        source: kube::Error,
    },

    #[error("Invalid Kubernetes Yaml: {source}")]
    Yaml {
        #[from]
        source: serde_yaml::Error,
    },

    #[error("{kind} {name} not found")]
    NotFound { kind: String, name: String },

    #[error("{kind} {name} already exists")]
    AlreadyExists { kind: String, name: String },

    /// The owner has not been persisted yet, so it has no name or uid to point at.
    #[error("{kind} has no name or uid, cannot reference it as an owner")]
    MissingObjectKey { kind: String },

    #[error("{object} is already controlled by {kind} {name}")]
    AlreadyOwned {
        object: String,
        kind: String,
        name: String,
    },

    #[error("namespaced owner {owner_namespace} cannot own {object} outside its namespace")]
    CrossNamespaceOwner {
        object: String,
        owner_namespace: String,
    },

    #[error("mutate step changed the name or namespace of {kind} {name}")]
    MutatedKey { kind: String, name: String },
}

impl OperatorError {
    /// Whether the API server rejected a create because the object is
    /// already there.
    pub fn is_already_exists(&self) -> bool {
        match self {
            OperatorError::AlreadyExists { .. } => true,
            OperatorError::Kube { source } => is_already_exists(source),
            _ => false,
        }
    }
}

pub fn is_already_exists(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(ae) if ae.reason == "AlreadyExists")
}

#[cfg(test)]
pub(crate) fn api_error(code: u16, reason: &str) -> kube::Error {
    kube::Error::Api(kube::error::ErrorResponse {
        status: "Failure".to_string(),
        message: format!("test {reason}"),
        reason: reason.to_string(),
        code,
    })
}
