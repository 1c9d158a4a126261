use crate::app::CliError;
use crate::config::{
    collect_environment, default_global_config_path, dotenv_path, load_settings_from, Settings,
};
use crate::shared::logging::LogSink;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const CONFIG_FLAG: &str = "--config";

/// Splits `--config <path>` (or `--config=<path>`) out of the remaining
/// positional arguments.
pub fn split_config_flag(args: &[String]) -> Result<(Vec<String>, Option<PathBuf>), CliError> {
    let mut positional = Vec::new();
    let mut config = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == CONFIG_FLAG {
            let value = iter
                .next()
                .ok_or_else(|| CliError::Usage(format!("{CONFIG_FLAG} requires a path")))?;
            config = Some(PathBuf::from(value));
        } else if let Some(value) = arg.strip_prefix("--config=") {
            if value.is_empty() {
                return Err(CliError::Usage(format!("{CONFIG_FLAG} requires a path")));
            }
            config = Some(PathBuf::from(value));
        } else {
            positional.push(arg.clone());
        }
    }
    Ok((positional, config))
}

/// Settings plus the merged `.env`/process environment they were built from.
pub struct LoadedContext {
    pub settings: Settings,
    pub env: BTreeMap<String, String>,
}

pub fn load_context(config: Option<PathBuf>) -> Result<LoadedContext, CliError> {
    let working_dir = std::env::current_dir().map_err(|source| CliError::Read {
        path: ".".to_string(),
        source,
    })?;
    let env = collect_environment(&dotenv_path(&working_dir))?;
    let default_config = default_global_config_path().ok();
    let settings = load_settings_from(config.as_deref(), default_config.as_deref(), &env)?;
    Ok(LoadedContext { settings, env })
}

/// Falls back to stderr-only logging when no state root can be resolved.
pub fn log_sink(settings: &Settings) -> LogSink {
    match settings.resolve_state_root() {
        Ok(root) => LogSink::for_state_root(&root, settings.debug),
        Err(_) => LogSink::stderr_only(settings.debug),
    }
}
