#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid yaml in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("unsupported provider `{0}`; expected one of: anthropic, openai, google, ollama")]
    UnsupportedProvider(String),
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
    #[error("failed to resolve home directory for default state root")]
    HomeDirectoryUnavailable,
}

impl ConfigError {
    pub fn is_unsupported_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedProvider(_) | Self::InvalidValue { .. }
        )
    }
}
