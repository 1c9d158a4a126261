use crate::app::command_support::{load_context, split_config_flag};
use crate::app::CliError;
use crate::config::Settings;

pub fn cmd_settings(args: &[String]) -> Result<String, CliError> {
    let (positional, config) = split_config_flag(args)?;
    if !positional.is_empty() {
        return Err(CliError::Usage(
            "usage: settings [--config <path>]".to_string(),
        ));
    }
    let context = load_context(config)?;
    render_settings(&context.settings)
}

pub fn render_settings(settings: &Settings) -> Result<String, CliError> {
    let yaml = serde_yaml::to_string(settings)
        .map_err(|e| CliError::Failed(format!("failed to encode settings: {e}")))?;
    let state_root = settings
        .resolve_state_root()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|_| "unavailable".to_string());
    Ok(format!(
        "{}\nauthor={}\nrendering={}\nstate_root={state_root}",
        yaml.trim_end(),
        settings.author_name()?,
        if settings.rendering_enabled() {
            "enabled"
        } else {
            "disabled"
        },
    ))
}
