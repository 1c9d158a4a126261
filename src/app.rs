pub mod cli;
pub mod command_handlers;
pub mod command_support;

pub use cli::{help_text, parse_cli_verb, CliVerb};
pub use command_handlers::run_cli;

use crate::config::ConfigError;
use crate::provider::ProviderError;
use crate::report::ReportError;

pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_UNSUPPORTED_CONFIGURATION: i32 = 2;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}")]
    Failed(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(err) if err.is_unsupported_configuration() => {
                EXIT_UNSUPPORTED_CONFIGURATION
            }
            Self::Provider(ProviderError::UnknownProvider(_)) => EXIT_UNSUPPORTED_CONFIGURATION,
            _ => EXIT_FAILURE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_configuration_exits_with_two() {
        let err = CliError::from(ConfigError::UnsupportedProvider("mistral".to_string()));
        assert_eq!(err.exit_code(), EXIT_UNSUPPORTED_CONFIGURATION);
        assert_eq!(CliError::Usage("usage".to_string()).exit_code(), EXIT_FAILURE);
    }
}
