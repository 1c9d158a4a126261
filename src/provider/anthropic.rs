use crate::provider::http::post_json;
use crate::provider::{
    parse_failure, BackendConfig, ChatBackend, ChatMessage, ChatRequest, ChatResponse,
    ProviderError, ProviderKind, ToolCall,
};
use serde_json::{json, Value};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 8192;

#[derive(Debug, Clone)]
pub struct AnthropicBackend {
    config: BackendConfig,
    api_key: String,
}

impl AnthropicBackend {
    pub fn new(config: BackendConfig, api_key: String) -> Self {
        Self { config, api_key }
    }
}

impl ChatBackend for AnthropicBackend {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn chat(&self, request: &ChatRequest<'_>) -> Result<ChatResponse, ProviderError> {
        let url = format!("{}/v1/messages", self.config.api_base());
        let body = request_body(&self.config.model, request);
        let headers = [
            ("x-api-key", self.api_key.clone()),
            ("anthropic-version", ANTHROPIC_VERSION.to_string()),
        ];
        let raw = post_json(
            ProviderKind::Anthropic,
            &url,
            &headers,
            &body,
            self.config.timeout,
        )?;
        parse_response(&raw)
    }
}

pub fn request_body(model: &str, request: &ChatRequest<'_>) -> Value {
    let mut messages: Vec<Value> = Vec::new();
    for message in request.messages {
        match message {
            ChatMessage::User(text) => messages.push(json!({"role": "user", "content": text})),
            ChatMessage::Assistant { text, tool_calls } => {
                let mut content = Vec::new();
                if !text.is_empty() {
                    content.push(json!({"type": "text", "text": text}));
                }
                for call in tool_calls {
                    content.push(json!({
                        "type": "tool_use",
                        "id": call.id,
                        "name": call.name,
                        "input": call.arguments,
                    }));
                }
                messages.push(json!({"role": "assistant", "content": content}));
            }
            ChatMessage::ToolResult {
                call_id, content, ..
            } => {
                let block = json!({
                    "type": "tool_result",
                    "tool_use_id": call_id,
                    "content": content,
                });
                // Results answering one assistant turn share a single user message.
                if let Some(previous) = messages.last_mut().filter(|m| is_tool_result_message(m)) {
                    if let Some(blocks) = previous["content"].as_array_mut() {
                        blocks.push(block);
                        continue;
                    }
                }
                messages.push(json!({"role": "user", "content": [block]}));
            }
        }
    }

    let tools: Vec<Value> = request
        .tools
        .iter()
        .map(|tool| {
            json!({
                "name": tool.name,
                "description": tool.description,
                "input_schema": tool.parameters,
            })
        })
        .collect();

    let mut body = json!({
        "model": model,
        "max_tokens": DEFAULT_MAX_TOKENS,
        "system": request.system_prompt,
        "messages": messages,
    });
    if !tools.is_empty() {
        body["tools"] = Value::Array(tools);
    }
    body
}

fn is_tool_result_message(message: &Value) -> bool {
    message["role"] == "user"
        && message["content"]
            .as_array()
            .and_then(|blocks| blocks.first())
            .is_some_and(|block| block["type"] == "tool_result")
}

pub fn parse_response(raw: &Value) -> Result<ChatResponse, ProviderError> {
    let blocks = raw["content"].as_array().ok_or_else(|| {
        parse_failure(ProviderKind::Anthropic, "response has no `content` array")
    })?;

    let mut texts = Vec::new();
    let mut tool_calls = Vec::new();
    for block in blocks {
        match block["type"].as_str() {
            Some("text") => {
                if let Some(text) = block["text"].as_str() {
                    texts.push(text.to_string());
                }
            }
            Some("tool_use") => {
                let id = block["id"].as_str().ok_or_else(|| {
                    parse_failure(ProviderKind::Anthropic, "tool_use block is missing `id`")
                })?;
                let name = block["name"].as_str().ok_or_else(|| {
                    parse_failure(ProviderKind::Anthropic, "tool_use block is missing `name`")
                })?;
                tool_calls.push(ToolCall {
                    id: id.to_string(),
                    name: name.to_string(),
                    arguments: block["input"].clone(),
                });
            }
            _ => {}
        }
    }

    Ok(ChatResponse {
        text: texts.join("\n"),
        tool_calls,
    })
}
