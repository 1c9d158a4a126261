use crate::provider::http::post_json;
use crate::provider::{
    parse_failure, BackendConfig, ChatBackend, ChatMessage, ChatRequest, ChatResponse,
    ProviderError, ProviderKind, ToolCall,
};
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct GoogleBackend {
    config: BackendConfig,
    api_key: String,
}

impl GoogleBackend {
    pub fn new(config: BackendConfig, api_key: String) -> Self {
        Self { config, api_key }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.api_base(),
            urlencoding::encode(&self.config.model),
            urlencoding::encode(&self.api_key)
        )
    }
}

impl ChatBackend for GoogleBackend {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Google
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn chat(&self, request: &ChatRequest<'_>) -> Result<ChatResponse, ProviderError> {
        let body = request_body(request);
        let raw = post_json(
            ProviderKind::Google,
            &self.endpoint(),
            &[],
            &body,
            self.config.timeout,
        )?;
        parse_response(&raw)
    }
}

pub fn request_body(request: &ChatRequest<'_>) -> Value {
    let mut contents: Vec<Value> = Vec::new();
    for message in request.messages {
        match message {
            ChatMessage::User(text) => {
                contents.push(json!({"role": "user", "parts": [{"text": text}]}))
            }
            ChatMessage::Assistant { text, tool_calls } => {
                let mut parts = Vec::new();
                if !text.is_empty() {
                    parts.push(json!({"text": text}));
                }
                for call in tool_calls {
                    parts.push(json!({
                        "functionCall": {"name": call.name, "args": call.arguments}
                    }));
                }
                contents.push(json!({"role": "model", "parts": parts}));
            }
            ChatMessage::ToolResult { name, content, .. } => {
                let part = json!({
                    "functionResponse": {"name": name, "response": {"result": content}}
                });
                if let Some(previous) = contents.last_mut().filter(|c| is_function_response(c)) {
                    if let Some(parts) = previous["parts"].as_array_mut() {
                        parts.push(part);
                        continue;
                    }
                }
                contents.push(json!({"role": "user", "parts": [part]}));
            }
        }
    }

    let mut body = json!({
        "systemInstruction": {"parts": [{"text": request.system_prompt}]},
        "contents": contents,
    });
    if !request.tools.is_empty() {
        let declarations: Vec<Value> = request
            .tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": tool.parameters,
                })
            })
            .collect();
        body["tools"] = json!([{"functionDeclarations": declarations}]);
    }
    body
}

fn is_function_response(content: &Value) -> bool {
    content["parts"]
        .as_array()
        .and_then(|parts| parts.first())
        .is_some_and(|part| part.get("functionResponse").is_some())
}

pub fn parse_response(raw: &Value) -> Result<ChatResponse, ProviderError> {
    let parts = raw["candidates"]
        .as_array()
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate["content"]["parts"].as_array())
        .ok_or_else(|| parse_failure(ProviderKind::Google, "response has no candidate parts"))?;

    let mut texts = Vec::new();
    let mut tool_calls = Vec::new();
    for part in parts {
        if let Some(text) = part["text"].as_str() {
            texts.push(text.to_string());
        }
        if let Some(call) = part.get("functionCall") {
            let name = call["name"].as_str().ok_or_else(|| {
                parse_failure(ProviderKind::Google, "functionCall is missing `name`")
            })?;
            tool_calls.push(ToolCall {
                id: format!("call-{}", tool_calls.len()),
                name: name.to_string(),
                arguments: call["args"].clone(),
            });
        }
    }

    Ok(ChatResponse {
        text: texts.join(""),
        tool_calls,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ToolSpec;
    use std::time::Duration;

    #[test]
    fn endpoint_encodes_model_and_key() {
        let backend = GoogleBackend::new(
            BackendConfig {
                provider: ProviderKind::Google,
                model: "gemini-1.5-flash".to_string(),
                api_key: None,
                api_base: Some("http://127.0.0.1:1".to_string()),
                timeout: Duration::from_secs(1),
            },
            "k&y".to_string(),
        );
        assert_eq!(
            backend.endpoint(),
            "http://127.0.0.1:1/v1beta/models/gemini-1.5-flash:generateContent?key=k%26y"
        );
    }

    #[test]
    fn function_responses_answer_in_one_content_block() {
        let messages = vec![
            ChatMessage::user("q"),
            ChatMessage::Assistant {
                text: String::new(),
                tool_calls: vec![ToolCall {
                    id: "call-0".to_string(),
                    name: "report_answer".to_string(),
                    arguments: json!({"filename": "a"}),
                }],
            },
            ChatMessage::ToolResult {
                call_id: "call-0".to_string(),
                name: "report_answer".to_string(),
                content: "true".to_string(),
            },
        ];
        let tools = vec![ToolSpec {
            name: "report_answer".to_string(),
            description: "d".to_string(),
            parameters: json!({"type": "object"}),
        }];
        let body = request_body(&ChatRequest {
            system_prompt: "sys",
            messages: &messages,
            tools: &tools,
        });

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "sys");
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(
            body["contents"][2]["parts"][0]["functionResponse"]["response"]["result"],
            "true"
        );
        assert_eq!(
            body["tools"][0]["functionDeclarations"][0]["name"],
            "report_answer"
        );
    }

    #[test]
    fn function_calls_are_extracted() {
        let raw = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "Here you go."},
                        {"functionCall": {"name": "report_answer", "args": {"filename": "z"}}}
                    ]
                }
            }]
        });
        let parsed = parse_response(&raw).expect("parse");
        assert_eq!(parsed.text, "Here you go.");
        assert_eq!(parsed.tool_calls[0].id, "call-0");
        assert_eq!(parsed.tool_calls[0].arguments["filename"], "z");
    }
}
