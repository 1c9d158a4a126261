use crate::config::env::{
    API_BASE_VAR, CONTAINER_BINARY_VAR, DEBUG_VAR, DOCKER_IMAGE_VAR, EXTRA_PYTHON_PACKAGES_VAR,
    EXTRA_R_PACKAGES_VAR, MODEL_VAR, OUTPUT_DIR_VAR, PROVIDER_VAR, RENDER_TIMEOUT_SECS_VAR,
    STATE_DIR_VAR,
};
use crate::config::{default_state_root, ConfigError};
use crate::provider::{resolve_model, ProviderKind};
use crate::report::build_job::ExtraPackages;
use crate::report::renderer::{DEFAULT_CONTAINER_BINARY, DEFAULT_RENDER_TIMEOUT};
use crate::shared::serde_ext::{comma_list, flag, parse_flag, split_comma_list};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_PROVIDER: &str = "anthropic";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub provider: String,
    pub model: Option<String>,
    #[serde(deserialize_with = "flag")]
    pub debug: bool,
    pub output_dir: PathBuf,
    pub docker_image: Option<String>,
    #[serde(deserialize_with = "comma_list")]
    pub extra_python_packages: Vec<String>,
    #[serde(deserialize_with = "comma_list")]
    pub extra_r_packages: Vec<String>,
    pub container_binary: String,
    pub render_timeout_secs: u64,
    pub api_base: Option<String>,
    pub state_root: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            model: None,
            debug: false,
            output_dir: PathBuf::from("."),
            docker_image: None,
            extra_python_packages: Vec::new(),
            extra_r_packages: Vec::new(),
            container_binary: DEFAULT_CONTAINER_BINARY.to_string(),
            render_timeout_secs: DEFAULT_RENDER_TIMEOUT.as_secs(),
            api_base: None,
            state_root: None,
        }
    }
}

impl Settings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Overrides fields from `QUARTO_DS_CHATBOT_*` variables. Empty values
    /// clear optional fields, matching an unset variable.
    pub fn apply_env(&mut self, vars: &BTreeMap<String, String>) -> Result<(), ConfigError> {
        let get = |key: &str| vars.get(key).map(|value| value.trim());

        if let Some(provider) = get(PROVIDER_VAR).filter(|value| !value.is_empty()) {
            self.provider = provider.to_string();
        }
        if let Some(model) = get(MODEL_VAR) {
            self.model = non_empty(model);
        }
        if let Some(debug) = get(DEBUG_VAR) {
            self.debug = parse_flag(debug).map_err(|reason| ConfigError::InvalidValue {
                key: DEBUG_VAR.to_string(),
                reason,
            })?;
        }
        if let Some(output_dir) = get(OUTPUT_DIR_VAR).filter(|value| !value.is_empty()) {
            self.output_dir = PathBuf::from(output_dir);
        }
        if let Some(image) = get(DOCKER_IMAGE_VAR) {
            self.docker_image = non_empty(image);
        }
        if let Some(packages) = get(EXTRA_PYTHON_PACKAGES_VAR) {
            self.extra_python_packages = split_comma_list(packages);
        }
        if let Some(packages) = get(EXTRA_R_PACKAGES_VAR) {
            self.extra_r_packages = split_comma_list(packages);
        }
        if let Some(binary) = get(CONTAINER_BINARY_VAR).filter(|value| !value.is_empty()) {
            self.container_binary = binary.to_string();
        }
        if let Some(timeout) = get(RENDER_TIMEOUT_SECS_VAR).filter(|value| !value.is_empty()) {
            self.render_timeout_secs =
                timeout
                    .parse::<u64>()
                    .map_err(|err| ConfigError::InvalidValue {
                        key: RENDER_TIMEOUT_SECS_VAR.to_string(),
                        reason: err.to_string(),
                    })?;
        }
        if let Some(api_base) = get(API_BASE_VAR) {
            self.api_base = non_empty(api_base);
        }
        if let Some(state_root) = get(STATE_DIR_VAR).filter(|value| !value.is_empty()) {
            self.state_root = Some(PathBuf::from(state_root));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.provider_kind()?;
        if self.render_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "render_timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.container_binary.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "container_binary".to_string(),
                reason: "must be non-empty".to_string(),
            });
        }
        for (key, packages) in [
            ("extra_python_packages", &self.extra_python_packages),
            ("extra_r_packages", &self.extra_r_packages),
        ] {
            if packages.iter().any(|name| name.trim().is_empty()) {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    reason: "package names must be non-empty".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn provider_kind(&self) -> Result<ProviderKind, ConfigError> {
        ProviderKind::try_from(self.provider.as_str())
            .map_err(|_| ConfigError::UnsupportedProvider(self.provider.trim().to_string()))
    }

    pub fn resolved_model(&self) -> Result<String, ConfigError> {
        Ok(resolve_model(self.provider_kind()?, self.model.as_deref()))
    }

    pub fn author_name(&self) -> Result<String, ConfigError> {
        Ok(format!(
            "{} {}",
            self.provider_kind()?,
            self.resolved_model()?
        ))
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }

    pub fn rendering_enabled(&self) -> bool {
        self.docker_image
            .as_deref()
            .is_some_and(|image| !image.trim().is_empty())
    }

    pub fn extra_packages(&self) -> ExtraPackages {
        ExtraPackages {
            python: self.extra_python_packages.clone(),
            r: self.extra_r_packages.clone(),
        }
    }

    pub fn resolve_state_root(&self) -> Result<PathBuf, ConfigError> {
        match &self.state_root {
            Some(path) => Ok(path.clone()),
            None => default_state_root(),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
