#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Chat,
    Report,
    Settings,
    Help,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "chat" => CliVerb::Chat,
        "report" => CliVerb::Report,
        "settings" => CliVerb::Settings,
        "help" | "--help" | "-h" => CliVerb::Help,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Commands:".to_string(),
        "  chat [--config <path>]                         Chat with the assistant in this terminal"
            .to_string(),
        "  report <filename> <markdown-file> [--config <path>]".to_string(),
        "                                                 Save and render a Quarto document without a model"
            .to_string(),
        "  settings [--config <path>]                     Print the effective configuration"
            .to_string(),
        "  help                                           Show this help".to_string(),
    ]
}

pub fn environment_help_lines() -> Vec<String> {
    vec![
        "Environment (also read from ./.env):".to_string(),
        "  QUARTO_DS_CHATBOT_PROVIDER               anthropic | openai | google | ollama"
            .to_string(),
        "  QUARTO_DS_CHATBOT_MODEL                  Model name, provider default when unset"
            .to_string(),
        "  QUARTO_DS_CHATBOT_OUTPUT_DIR             Directory receiving answer folders".to_string(),
        "  QUARTO_DS_CHATBOT_DOCKER_IMAGE           Render image; rendering is off when unset"
            .to_string(),
        "  QUARTO_DS_CHATBOT_EXTRA_PYTHON_PACKAGES  Comma-separated pip packages".to_string(),
        "  QUARTO_DS_CHATBOT_EXTRA_R_PACKAGES       Comma-separated CRAN packages".to_string(),
        "  QUARTO_DS_CHATBOT_DEBUG                  Echo log lines to stderr".to_string(),
    ]
}

pub fn help_text() -> String {
    let mut lines = cli_help_lines();
    lines.push(String::new());
    lines.extend(environment_help_lines());
    lines.join("\n")
}
