use crate::app::command_support::{load_context, log_sink, split_config_flag};
use crate::app::CliError;
use crate::report::{PublishedOutput, ReportPipeline, ToolInvocation};
use std::fs;

pub fn cmd_report(args: &[String]) -> Result<String, CliError> {
    let (positional, config) = split_config_flag(args)?;
    let [filename, markdown_path] = positional.as_slice() else {
        return Err(CliError::Usage(
            "usage: report <filename> <markdown-file> [--config <path>]".to_string(),
        ));
    };

    let content = fs::read_to_string(markdown_path).map_err(|source| CliError::Read {
        path: markdown_path.clone(),
        source,
    })?;
    let context = load_context(config)?;
    let pipeline = ReportPipeline::from_settings(
        &context.settings,
        PublishedOutput::new(),
        log_sink(&context.settings),
    );
    let outcome = pipeline.run(&ToolInvocation::new(filename.as_str(), content))?;

    let mut lines = vec![
        format!("slot={}", outcome.slot.directory_path.display()),
        format!("collision_index={}", outcome.slot.collision_index),
        format!("document={}", outcome.document.path.display()),
        format!("command={}", outcome.job.shell_script()),
        format!("render={}", outcome.render.status.describe()),
        format!("published={}", pipeline.published().get()),
    ];
    if !outcome.render.succeeded && !outcome.render.logs.trim().is_empty() {
        lines.push("render_logs:".to_string());
        lines.push(outcome.render.logs.trim_end().to_string());
    }
    Ok(lines.join("\n"))
}
