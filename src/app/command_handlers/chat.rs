use crate::app::command_support::{load_context, log_sink, split_config_flag};
use crate::app::CliError;
use crate::chat::{build_system_prompt, greeting, ChatSession};
use crate::config::Settings;
use crate::provider::{build_backend, resolve_api_key, BackendConfig, DEFAULT_REQUEST_TIMEOUT};
use crate::report::{PublishedOutput, ReportPipeline};
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};

pub fn cmd_chat(args: &[String]) -> Result<String, CliError> {
    let (positional, config) = split_config_flag(args)?;
    if !positional.is_empty() {
        return Err(CliError::Usage(
            "usage: chat [--config <path>]".to_string(),
        ));
    }

    let context = load_context(config)?;
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut output = stdout.lock();
    run_chat_session(&context.settings, &context.env, &mut input, &mut output)
}

/// Builds the backend, report tool and session from settings, then runs the
/// REPL over `input`/`output`.
pub fn run_chat_session<R: BufRead, W: Write>(
    settings: &Settings,
    env: &BTreeMap<String, String>,
    input: &mut R,
    output: &mut W,
) -> Result<String, CliError> {
    let provider = settings.provider_kind()?;
    let model = settings.resolved_model()?;
    let author_name = settings.author_name()?;
    let log = log_sink(settings);

    let backend = build_backend(BackendConfig {
        provider,
        model: model.clone(),
        api_key: resolve_api_key(provider, env),
        api_base: settings.api_base.clone(),
        timeout: DEFAULT_REQUEST_TIMEOUT,
    })?;

    writeln!(output, "Using provider {provider}, model {model}")
        .and_then(|_| {
            writeln!(
                output,
                "Output directory: {}",
                settings.output_dir.display()
            )
        })
        .map_err(|e| CliError::Failed(format!("failed to write chat output: {e}")))?;
    log.info(
        "chat.start",
        &format!(
            "author=`{author_name}` output_dir={} rendering={}",
            settings.output_dir.display(),
            settings.rendering_enabled()
        ),
    );

    let system_prompt = build_system_prompt(&author_name, &chrono::Local::now());
    let pipeline = ReportPipeline::from_settings(settings, PublishedOutput::new(), log.clone());
    let mut session = ChatSession::with_report_pipeline(
        backend,
        system_prompt,
        pipeline,
        settings.output_dir.clone(),
        log.clone(),
    );
    session
        .run_repl(&greeting(provider), input, output)
        .map_err(CliError::Failed)?;
    log.info("chat.end", &format!("messages={}", session.history().len()));

    Ok("chat ended".to_string())
}
