use crate::provider::http::post_json;
use crate::provider::{
    parse_failure, BackendConfig, ChatBackend, ChatMessage, ChatRequest, ChatResponse,
    ProviderError, ProviderKind, ToolCall, ToolSpec,
};
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    config: BackendConfig,
    api_key: String,
}

impl OpenAiBackend {
    pub fn new(config: BackendConfig, api_key: String) -> Self {
        Self { config, api_key }
    }
}

impl ChatBackend for OpenAiBackend {
    fn provider(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn chat(&self, request: &ChatRequest<'_>) -> Result<ChatResponse, ProviderError> {
        let url = format!("{}/v1/chat/completions", self.config.api_base());
        let body = request_body(&self.config.model, request);
        let headers = [("Authorization", format!("Bearer {}", self.api_key))];
        let raw = post_json(
            ProviderKind::OpenAi,
            &url,
            &headers,
            &body,
            self.config.timeout,
        )?;
        parse_response(&raw)
    }
}

pub(crate) fn function_tools(tools: &[ToolSpec]) -> Vec<Value> {
    tools
        .iter()
        .map(|tool| {
            json!({
                "type": "function",
                "function": {
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": tool.parameters,
                }
            })
        })
        .collect()
}

pub fn request_body(model: &str, request: &ChatRequest<'_>) -> Value {
    let mut messages = vec![json!({"role": "system", "content": request.system_prompt})];
    for message in request.messages {
        match message {
            ChatMessage::User(text) => messages.push(json!({"role": "user", "content": text})),
            ChatMessage::Assistant { text, tool_calls } => {
                let mut entry = json!({
                    "role": "assistant",
                    "content": if text.is_empty() { Value::Null } else { json!(text) },
                });
                if !tool_calls.is_empty() {
                    let calls: Vec<Value> = tool_calls
                        .iter()
                        .map(|call| {
                            json!({
                                "id": call.id,
                                "type": "function",
                                "function": {
                                    "name": call.name,
                                    "arguments": call.arguments.to_string(),
                                }
                            })
                        })
                        .collect();
                    entry["tool_calls"] = Value::Array(calls);
                }
                messages.push(entry);
            }
            ChatMessage::ToolResult {
                call_id, content, ..
            } => messages.push(json!({
                "role": "tool",
                "tool_call_id": call_id,
                "content": content,
            })),
        }
    }

    let mut body = json!({"model": model, "messages": messages});
    if !request.tools.is_empty() {
        body["tools"] = Value::Array(function_tools(request.tools));
    }
    body
}

pub fn parse_response(raw: &Value) -> Result<ChatResponse, ProviderError> {
    let message = raw["choices"]
        .as_array()
        .and_then(|choices| choices.first())
        .map(|choice| &choice["message"])
        .ok_or_else(|| parse_failure(ProviderKind::OpenAi, "response has no choices"))?;

    let text = message["content"].as_str().unwrap_or_default().to_string();
    let mut tool_calls = Vec::new();
    for call in message["tool_calls"].as_array().into_iter().flatten() {
        let id = call["id"]
            .as_str()
            .ok_or_else(|| parse_failure(ProviderKind::OpenAi, "tool call is missing `id`"))?;
        let name = call["function"]["name"].as_str().ok_or_else(|| {
            parse_failure(ProviderKind::OpenAi, "tool call is missing `function.name`")
        })?;
        tool_calls.push(ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments: decode_arguments(&call["function"]["arguments"]),
        });
    }

    Ok(ChatResponse { text, tool_calls })
}

// Arguments that are not a JSON document are passed through as a string and
// rejected by the tool dispatcher.
pub(crate) fn decode_arguments(raw: &Value) -> Value {
    match raw {
        Value::String(encoded) => {
            serde_json::from_str(encoded).unwrap_or_else(|_| Value::String(encoded.clone()))
        }
        other => other.clone(),
    }
}
