use crate::config::env::CONFIG_VAR;
use crate::config::{ConfigError, Settings};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub fn load_settings_from(
    explicit_config: Option<&Path>,
    default_config: Option<&Path>,
    env: &BTreeMap<String, String>,
) -> Result<Settings, ConfigError> {
    let mut settings = match resolve_config_path(explicit_config, default_config, env) {
        Some(path) => Settings::from_path(&path)?,
        None => Settings::default(),
    };
    settings.apply_env(env)?;
    settings.validate()?;
    Ok(settings)
}

fn resolve_config_path(
    explicit_config: Option<&Path>,
    default_config: Option<&Path>,
    env: &BTreeMap<String, String>,
) -> Option<PathBuf> {
    if let Some(path) = explicit_config {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env
        .get(CONFIG_VAR)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
    {
        return Some(PathBuf::from(path));
    }
    default_config.filter(|path| path.is_file()).map(Path::to_path_buf)
}
