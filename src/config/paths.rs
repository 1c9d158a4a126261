use crate::config::ConfigError;
use std::path::{Path, PathBuf};

pub const GLOBAL_STATE_DIR: &str = ".quarto-assistant";
pub const GLOBAL_SETTINGS_FILE_NAME: &str = "config.yaml";
pub const DOTENV_FILE_NAME: &str = ".env";

pub fn default_state_root() -> Result<PathBuf, ConfigError> {
    let home = std::env::var_os("HOME").ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(PathBuf::from(home).join(GLOBAL_STATE_DIR))
}

pub fn default_global_config_path() -> Result<PathBuf, ConfigError> {
    Ok(default_state_root()?.join(GLOBAL_SETTINGS_FILE_NAME))
}

pub fn dotenv_path(working_dir: &Path) -> PathBuf {
    working_dir.join(DOTENV_FILE_NAME)
}
