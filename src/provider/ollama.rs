use crate::provider::http::post_json;
use crate::provider::openai::{decode_arguments, function_tools};
use crate::provider::{
    parse_failure, BackendConfig, ChatBackend, ChatMessage, ChatRequest, ChatResponse,
    ProviderError, ProviderKind, ToolCall,
};
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct OllamaBackend {
    config: BackendConfig,
}

impl OllamaBackend {
    pub fn new(config: BackendConfig) -> Self {
        Self { config }
    }
}

impl ChatBackend for OllamaBackend {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Ollama
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn chat(&self, request: &ChatRequest<'_>) -> Result<ChatResponse, ProviderError> {
        let url = format!("{}/api/chat", self.config.api_base());
        let body = request_body(&self.config.model, request);
        let raw = post_json(ProviderKind::Ollama, &url, &[], &body, self.config.timeout)?;
        parse_response(&raw)
    }
}

pub fn request_body(model: &str, request: &ChatRequest<'_>) -> Value {
    let mut messages = vec![json!({"role": "system", "content": request.system_prompt})];
    for message in request.messages {
        match message {
            ChatMessage::User(text) => messages.push(json!({"role": "user", "content": text})),
            ChatMessage::Assistant { text, tool_calls } => {
                let mut entry = json!({"role": "assistant", "content": text});
                if !tool_calls.is_empty() {
                    entry["tool_calls"] = tool_calls
                        .iter()
                        .map(|call| {
                            json!({"function": {"name": call.name, "arguments": call.arguments}})
                        })
                        .collect();
                }
                messages.push(entry);
            }
            ChatMessage::ToolResult { content, .. } => {
                messages.push(json!({"role": "tool", "content": content}))
            }
        }
    }

    let mut body = json!({"model": model, "messages": messages, "stream": false});
    if !request.tools.is_empty() {
        body["tools"] = Value::Array(function_tools(request.tools));
    }
    body
}

pub fn parse_response(raw: &Value) -> Result<ChatResponse, ProviderError> {
    let message = raw
        .get("message")
        .ok_or_else(|| parse_failure(ProviderKind::Ollama, "response has no `message`"))?;

    let text = message["content"].as_str().unwrap_or_default().to_string();
    let mut tool_calls = Vec::new();
    for (index, call) in message["tool_calls"]
        .as_array()
        .into_iter()
        .flatten()
        .enumerate()
    {
        let name = call["function"]["name"].as_str().ok_or_else(|| {
            parse_failure(ProviderKind::Ollama, "tool call is missing `function.name`")
        })?;
        tool_calls.push(ToolCall {
            id: format!("call-{index}"),
            name: name.to_string(),
            arguments: decode_arguments(&call["function"]["arguments"]),
        });
    }

    Ok(ChatResponse { text, tool_calls })
}
