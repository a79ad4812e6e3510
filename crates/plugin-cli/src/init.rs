use plugin_common::settings::{set_config, Settings};

use crate::{
    error::{CliError, CliResult},
    Cli,
};

/// Load settings from `--settings` (or the default locations), apply the
/// `--namespace` override and store them for the rest of the process.
pub fn init_config(cli: &Cli) -> CliResult<&'static Settings> {
    let settings = Settings::load(cli.settings.as_deref())
        .map_err(CliError::InitConfig)?
        .with_namespace(cli.namespace.clone());
    set_config(settings).map_err(CliError::InitConfig)
}
