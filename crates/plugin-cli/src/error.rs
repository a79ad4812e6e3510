use plugin_common::error::CommonError;
use plugin_operator::error::OperatorError;
use thiserror::Error;

pub type CliResult<T = (), E = CliError> = Result<T, E>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Unable to initialize config: {0}")]
    InitConfig(#[source] CommonError),
    #[error(transparent)]
    Common(#[from] CommonError),
    #[error("Unable to connect to the cluster: {0}")]
    Connect(#[from] kube::Error),
    #[error("Operator error: {0}")]
    Operator(#[from] OperatorError),
    #[error("Unable to write output: {0}")]
    Output(#[from] std::io::Error),
}
