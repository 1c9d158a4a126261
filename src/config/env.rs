use crate::config::ConfigError;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const ENV_PREFIX: &str = "QUARTO_DS_CHATBOT_";

pub const PROVIDER_VAR: &str = "QUARTO_DS_CHATBOT_PROVIDER";
pub const MODEL_VAR: &str = "QUARTO_DS_CHATBOT_MODEL";
pub const DEBUG_VAR: &str = "QUARTO_DS_CHATBOT_DEBUG";
pub const OUTPUT_DIR_VAR: &str = "QUARTO_DS_CHATBOT_OUTPUT_DIR";
pub const DOCKER_IMAGE_VAR: &str = "QUARTO_DS_CHATBOT_DOCKER_IMAGE";
pub const EXTRA_PYTHON_PACKAGES_VAR: &str = "QUARTO_DS_CHATBOT_EXTRA_PYTHON_PACKAGES";
pub const EXTRA_R_PACKAGES_VAR: &str = "QUARTO_DS_CHATBOT_EXTRA_R_PACKAGES";
pub const CONTAINER_BINARY_VAR: &str = "QUARTO_DS_CHATBOT_CONTAINER_BINARY";
pub const RENDER_TIMEOUT_SECS_VAR: &str = "QUARTO_DS_CHATBOT_RENDER_TIMEOUT_SECS";
pub const API_BASE_VAR: &str = "QUARTO_DS_CHATBOT_API_BASE";
pub const STATE_DIR_VAR: &str = "QUARTO_DS_CHATBOT_STATE_DIR";
pub const CONFIG_VAR: &str = "QUARTO_DS_CHATBOT_CONFIG";

/// Parses `KEY=VALUE` lines. Blank lines and `#` comments are skipped, an
/// `export ` prefix is accepted, and matching outer quotes are removed.
pub fn parse_dotenv(raw: &str) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        vars.insert(key.to_string(), unquote(value.trim()).to_string());
    }
    vars
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

pub fn load_dotenv(path: &Path) -> Result<BTreeMap<String, String>, ConfigError> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(parse_dotenv(&raw)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(source) => Err(ConfigError::Read {
            path: path.display().to_string(),
            source,
        }),
    }
}

/// Process environment layered over the `.env` file at `dotenv_path`.
pub fn collect_environment(dotenv_path: &Path) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut vars = load_dotenv(dotenv_path)?;
    vars.extend(std::env::vars());
    Ok(vars)
}
