use crate::chat::is_chat_exit_command;
use crate::chat::tools::ToolRegistry;
use crate::provider::{ChatBackend, ChatMessage, ChatRequest, ProviderError};
use crate::report::{
    PublishedOutput, ReportPipeline, ToolInvocation, SERVED_PREFIX, UNPUBLISHED_PATH,
};
use crate::shared::logging::LogSink;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

pub const MAX_TOOL_ROUNDS: usize = 4;

pub struct ChatSession {
    backend: Box<dyn ChatBackend>,
    system_prompt: String,
    tools: ToolRegistry,
    history: Vec<ChatMessage>,
    published: PublishedOutput,
    last_shown: String,
    output_root: PathBuf,
    log: LogSink,
}

impl ChatSession {
    pub fn new(
        backend: Box<dyn ChatBackend>,
        system_prompt: impl Into<String>,
        tools: ToolRegistry,
        published: PublishedOutput,
        output_root: impl Into<PathBuf>,
        log: LogSink,
    ) -> Self {
        let last_shown = published.get();
        Self {
            backend,
            system_prompt: system_prompt.into(),
            tools,
            history: Vec::new(),
            published,
            last_shown,
            output_root: output_root.into(),
            log,
        }
    }

    /// Session whose only tool is `report_answer`, backed by `pipeline`.
    pub fn with_report_pipeline(
        backend: Box<dyn ChatBackend>,
        system_prompt: impl Into<String>,
        pipeline: ReportPipeline,
        output_root: impl Into<PathBuf>,
        log: LogSink,
    ) -> Self {
        let published = pipeline.published().clone();
        let tool_log = log.clone();
        let mut tools = ToolRegistry::new();
        tools.register_tool(ReportPipeline::tool_spec(), move |arguments| {
            match ToolInvocation::from_arguments(arguments) {
                Ok(invocation) => pipeline.report_answer(&invocation.filename, &invocation.content),
                Err(reason) => {
                    tool_log.warn("chat.tool_arguments", &reason);
                    false
                }
            }
        });
        Self::new(backend, system_prompt, tools, published, output_root, log)
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Runs one user turn and returns the assistant text collected across
    /// tool rounds. On a backend error the turn is dropped from history.
    pub fn send(&mut self, message: &str) -> Result<String, ProviderError> {
        let mark = self.history.len();
        self.history.push(ChatMessage::user(message));
        match self.run_turn() {
            Ok(reply) => Ok(reply),
            Err(err) => {
                self.history.truncate(mark);
                self.log.error("chat.backend", &err.to_string());
                Err(err)
            }
        }
    }

    fn run_turn(&mut self) -> Result<String, ProviderError> {
        let specs = self.tools.specs();
        let mut replies = Vec::new();
        let mut rounds = 0;

        loop {
            self.log.debug(
                "chat.request",
                &format!(
                    "provider={} model={} messages={}",
                    self.backend.provider(),
                    self.backend.model(),
                    self.history.len()
                ),
            );
            let response = self.backend.chat(&ChatRequest {
                system_prompt: &self.system_prompt,
                messages: &self.history,
                tools: &specs,
            })?;

            let text = response.text.trim();
            if !text.is_empty() {
                replies.push(text.to_string());
            }
            let calls = response.tool_calls.clone();
            self.history.push(response.into_message());
            if calls.is_empty() {
                break;
            }

            for call in calls {
                let result = self.tools.dispatch(&call);
                self.log.info(
                    "chat.tool",
                    &format!("name={} id={} result={result}", call.name, call.id),
                );
                self.history.push(ChatMessage::ToolResult {
                    call_id: call.id,
                    name: call.name,
                    content: result.to_string(),
                });
            }

            rounds += 1;
            if rounds >= MAX_TOOL_ROUNDS {
                self.log.warn(
                    "chat.tool_rounds",
                    &format!("stopped after {rounds} tool rounds in one turn"),
                );
                break;
            }
        }

        Ok(replies.join("\n\n"))
    }

    /// Returns the published path once each time it changes.
    pub fn take_published_update(&mut self) -> Option<String> {
        let current = self.published.get();
        if current == self.last_shown {
            return None;
        }
        self.last_shown = current.clone();
        Some(current)
    }

    pub fn run_repl<R: BufRead, W: Write>(
        &mut self,
        greeting: &str,
        input: &mut R,
        output: &mut W,
    ) -> Result<(), String> {
        write_line(output, &format!("assistant> {greeting}"))?;
        write_line(output, "type `/exit` to quit")?;

        loop {
            write!(output, "you> ").map_err(|e| format!("failed to write chat prompt: {e}"))?;
            output
                .flush()
                .map_err(|e| format!("failed to flush chat prompt: {e}"))?;

            let mut line = String::new();
            let read = input
                .read_line(&mut line)
                .map_err(|e| format!("failed to read chat input: {e}"))?;
            if read == 0 {
                break;
            }

            let message = line.trim();
            if message.is_empty() {
                continue;
            }
            if is_chat_exit_command(message) {
                break;
            }

            match self.send(message) {
                Ok(reply) if reply.is_empty() => {}
                Ok(reply) => write_line(output, &format!("assistant> {reply}"))?,
                Err(err) => write_line(output, &format!("assistant> error: {err}"))?,
            }

            if let Some(path) = self.take_published_update() {
                write_line(output, &format!("rendered> {path}"))?;
                if let Some(local) = local_output_path(&self.output_root, &path) {
                    write_line(output, &format!("rendered> file {}", local.display()))?;
                }
            }
        }

        Ok(())
    }
}

/// Maps a served `/output/...` path back under the output root.
pub fn local_output_path(output_root: &Path, published: &str) -> Option<PathBuf> {
    if published == UNPUBLISHED_PATH {
        return None;
    }
    let relative = published
        .strip_prefix(SERVED_PREFIX)?
        .trim_start_matches('/');
    if relative.is_empty() {
        return None;
    }
    Some(output_root.join(relative))
}

fn write_line<W: Write>(output: &mut W, line: &str) -> Result<(), String> {
    writeln!(output, "{line}").map_err(|e| format!("failed to write chat output: {e}"))?;
    output
        .flush()
        .map_err(|e| format!("failed to flush chat output: {e}"))
}

#[cfg(test)]
mod tests {
    use super::local_output_path;
    use std::path::{Path, PathBuf};

    #[test]
    fn served_paths_map_back_under_output_root() {
        assert_eq!(
            local_output_path(Path::new("/srv/out"), "/output/slug/report.html"),
            Some(PathBuf::from("/srv/out/slug/report.html"))
        );
        assert_eq!(
            local_output_path(Path::new("/srv/out"), "/output/none.html"),
            None
        );
        assert_eq!(local_output_path(Path::new("/srv/out"), "/elsewhere/x.html"), None);
    }
}
