pub type CommonResult<T = (), E = CommonError> = Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Config already initialized")]
    ConfigAlreadyInitialized,
    #[error("Config not initialized")]
    ConfigNotInitialized,
    #[error("Runtime error: {0}")]
    Runtime(#[from] anyhow::Error),
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Unable to install tracing subscriber: {0}")]
    Tracing(String),
}
