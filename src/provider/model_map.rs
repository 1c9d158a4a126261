use crate::provider::ProviderKind;

pub fn default_model(provider: ProviderKind) -> &'static str {
    match provider {
        ProviderKind::Anthropic => "claude-3-5-sonnet-latest",
        ProviderKind::OpenAi => "gpt-4o",
        ProviderKind::Google => "gemini-1.5-flash",
        ProviderKind::Ollama => "llama3.2",
    }
}

pub fn resolve_model(provider: ProviderKind, configured: Option<&str>) -> String {
    configured
        .map(str::trim)
        .filter(|model| !model.is_empty())
        .unwrap_or_else(|| default_model(provider))
        .to_string()
}

pub fn default_api_base(provider: ProviderKind) -> &'static str {
    match provider {
        ProviderKind::Anthropic => "https://api.anthropic.com",
        ProviderKind::OpenAi => "https://api.openai.com",
        ProviderKind::Google => "https://generativelanguage.googleapis.com",
        ProviderKind::Ollama => "http://localhost:11434",
    }
}

pub fn api_key_variables(provider: ProviderKind) -> &'static [&'static str] {
    match provider {
        ProviderKind::Anthropic => &["ANTHROPIC_API_KEY"],
        ProviderKind::OpenAi => &["OPENAI_API_KEY"],
        ProviderKind::Google => &["GOOGLE_API_KEY", "GEMINI_API_KEY"],
        ProviderKind::Ollama => &[],
    }
}

pub fn provider_greeting(provider: ProviderKind) -> &'static str {
    match provider {
        ProviderKind::Anthropic | ProviderKind::OpenAi => "",
        ProviderKind::Google => {
            "> Warning\n> `google gemini` tool calling is not fully reliable yet, so some answers may arrive without a Quarto document.\n\n"
        }
        ProviderKind::Ollama => {
            "> Warning\n> `ollama` tool calling is not fully reliable yet, so you may not get Quarto document outputs.\n\n"
        }
    }
}
