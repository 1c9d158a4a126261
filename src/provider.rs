use std::collections::BTreeMap;
use std::time::Duration;

pub mod anthropic;
pub mod google;
pub mod http;
pub mod model_map;
pub mod ollama;
pub mod openai;
pub mod types;

pub use model_map::{
    api_key_variables, default_api_base, default_model, provider_greeting, resolve_model,
};
pub use types::{ChatMessage, ChatRequest, ChatResponse, ToolCall, ToolSpec};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("unknown provider `{0}`")]
    UnknownProvider(String),
    #[error("missing api key for {provider}; set one of: {variables}")]
    MissingApiKey {
        provider: ProviderKind,
        variables: String,
    },
    #[error("request to {provider} failed: {reason}")]
    Request {
        provider: ProviderKind,
        reason: String,
    },
    #[error("{provider} returned http status {status}: {body}")]
    HttpStatus {
        provider: ProviderKind,
        status: u16,
        body: String,
    },
    #[error("provider output parse failure for {provider}: {reason}")]
    ParseFailure {
        provider: ProviderKind,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Anthropic,
    OpenAi,
    Google,
    Ollama,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::Anthropic,
        ProviderKind::OpenAi,
        ProviderKind::Google,
        ProviderKind::Ollama,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Google => "google",
            ProviderKind::Ollama => "ollama",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderKind {
    type Error = ProviderError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "anthropic" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAi),
            "google" => Ok(Self::Google),
            "ollama" => Ok(Self::Ollama),
            other => Err(ProviderError::UnknownProvider(other.to_string())),
        }
    }
}

pub trait ChatBackend {
    fn provider(&self) -> ProviderKind;

    fn model(&self) -> &str;

    fn chat(&self, request: &ChatRequest<'_>) -> Result<ChatResponse, ProviderError>;
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub provider: ProviderKind,
    pub model: String,
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub timeout: Duration,
}

impl BackendConfig {
    pub fn api_base(&self) -> String {
        self.api_base
            .as_deref()
            .map(str::trim)
            .filter(|base| !base.is_empty())
            .unwrap_or_else(|| default_api_base(self.provider))
            .trim_end_matches('/')
            .to_string()
    }

    fn required_api_key(&self) -> Result<String, ProviderError> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ProviderError::MissingApiKey {
                provider: self.provider,
                variables: api_key_variables(self.provider).join(", "),
            })
    }
}

pub fn resolve_api_key(provider: ProviderKind, env: &BTreeMap<String, String>) -> Option<String> {
    api_key_variables(provider)
        .iter()
        .filter_map(|name| env.get(*name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

pub fn build_backend(config: BackendConfig) -> Result<Box<dyn ChatBackend>, ProviderError> {
    match config.provider {
        ProviderKind::Anthropic => {
            let api_key = config.required_api_key()?;
            Ok(Box::new(anthropic::AnthropicBackend::new(config, api_key)))
        }
        ProviderKind::OpenAi => {
            let api_key = config.required_api_key()?;
            Ok(Box::new(openai::OpenAiBackend::new(config, api_key)))
        }
        ProviderKind::Google => {
            let api_key = config.required_api_key()?;
            Ok(Box::new(google::GoogleBackend::new(config, api_key)))
        }
        ProviderKind::Ollama => Ok(Box::new(ollama::OllamaBackend::new(config))),
    }
}

pub(crate) fn parse_failure(provider: ProviderKind, reason: impl Into<String>) -> ProviderError {
    ProviderError::ParseFailure {
        provider,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: ProviderKind, api_key: Option<&str>) -> BackendConfig {
        BackendConfig {
            provider,
            model: default_model(provider).to_string(),
            api_key: api_key.map(str::to_string),
            api_base: None,
            timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn provider_kind_parses_all_supported_tags() {
        for kind in ProviderKind::ALL {
            assert_eq!(ProviderKind::try_from(kind.as_str()).expect("parse"), kind);
        }
        assert_eq!(
            ProviderKind::try_from(" OpenAI ").expect("parse"),
            ProviderKind::OpenAi
        );
        assert!(matches!(
            ProviderKind::try_from("mistral"),
            Err(ProviderError::UnknownProvider(tag)) if tag == "mistral"
        ));
    }

    #[test]
    fn hosted_backends_require_an_api_key() {
        let err = build_backend(config(ProviderKind::Anthropic, None))
            .err()
            .expect("missing key");
        match err {
            ProviderError::MissingApiKey { variables, .. } => {
                assert_eq!(variables, "ANTHROPIC_API_KEY");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let backend = build_backend(config(ProviderKind::Ollama, None)).expect("ollama");
        assert_eq!(backend.provider(), ProviderKind::Ollama);
        assert_eq!(backend.model(), "llama3.2");
    }

    #[test]
    fn api_key_lookup_falls_back_to_secondary_variable() {
        let mut env = BTreeMap::new();
        env.insert("GOOGLE_API_KEY".to_string(), "  ".to_string());
        env.insert("GEMINI_API_KEY".to_string(), "gem-key".to_string());
        assert_eq!(
            resolve_api_key(ProviderKind::Google, &env).as_deref(),
            Some("gem-key")
        );
        assert_eq!(resolve_api_key(ProviderKind::Ollama, &env), None);
    }

    #[test]
    fn api_base_override_is_trimmed() {
        let mut cfg = config(ProviderKind::OpenAi, Some("k"));
        assert_eq!(cfg.api_base(), "https://api.openai.com");
        cfg.api_base = Some("http://127.0.0.1:9999/".to_string());
        assert_eq!(cfg.api_base(), "http://127.0.0.1:9999");
    }
}
