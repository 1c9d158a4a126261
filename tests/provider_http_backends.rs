use quarto_assistant::provider::{
    build_backend, BackendConfig, ChatMessage, ChatRequest, ProviderError, ProviderKind, ToolSpec,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
struct RecordedRequest {
    target: String,
    headers: BTreeMap<String, String>,
    body: Value,
}

struct MockProviderServer {
    base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl MockProviderServer {
    fn start(status: u16, response_body: Value) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
        let addr = listener.local_addr().expect("local addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let requests_for_thread = Arc::clone(&requests);

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

            let mut request_line = String::new();
            reader
                .read_line(&mut request_line)
                .expect("read request line");
            let target = request_line
                .split_whitespace()
                .nth(1)
                .unwrap_or("/")
                .to_string();

            let mut headers = BTreeMap::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).expect("read header");
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
                }
            }
            let content_length = headers
                .get("content-length")
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(0);
            let mut body = vec![0_u8; content_length];
            reader.read_exact(&mut body).expect("read body");

            requests_for_thread
                .lock()
                .expect("lock requests")
                .push(RecordedRequest {
                    target,
                    headers,
                    body: serde_json::from_slice(&body).expect("json body"),
                });

            let response_body = response_body.to_string();
            let response = format!(
                "HTTP/1.1 {status} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                response_body.len(),
                response_body
            );
            stream
                .write_all(response.as_bytes())
                .expect("write response");
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
            handle: Some(handle),
        }
    }

    fn finish(mut self) -> RecordedRequest {
        if let Some(handle) = self.handle.take() {
            handle.join().expect("join mock server");
        }
        self.requests
            .lock()
            .expect("lock requests")
            .first()
            .cloned()
            .expect("one request")
    }
}

fn config(provider: ProviderKind, model: &str, api_key: Option<&str>, base: &str) -> BackendConfig {
    BackendConfig {
        provider,
        model: model.to_string(),
        api_key: api_key.map(str::to_string),
        api_base: Some(base.to_string()),
        timeout: Duration::from_secs(5),
    }
}

fn report_tool() -> ToolSpec {
    ToolSpec {
        name: "report_answer".to_string(),
        description: "Reports an answer".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {"filename": {"type": "string"}, "answer": {"type": "string"}},
            "required": ["filename", "answer"]
        }),
    }
}

#[test]
fn anthropic_round_trip_over_http() {
    let server = MockProviderServer::start(
        200,
        json!({
            "content": [
                {"type": "text", "text": "Saving the answer."},
                {
                    "type": "tool_use",
                    "id": "toolu_01",
                    "name": "report_answer",
                    "input": {"filename": "a-b-c-d-e.qmd", "answer": "# A"}
                }
            ],
            "stop_reason": "tool_use"
        }),
    );
    let backend = build_backend(config(
        ProviderKind::Anthropic,
        "claude-3-5-sonnet-latest",
        Some("sk-ant-test"),
        &server.base_url,
    ))
    .expect("backend");

    let messages = [ChatMessage::user("What is a p-value?")];
    let tools = [report_tool()];
    let response = backend
        .chat(&ChatRequest {
            system_prompt: "be terse",
            messages: &messages,
            tools: &tools,
        })
        .expect("chat");

    assert_eq!(response.text, "Saving the answer.");
    assert_eq!(response.tool_calls.len(), 1);
    assert_eq!(response.tool_calls[0].id, "toolu_01");
    assert_eq!(response.tool_calls[0].arguments["filename"], "a-b-c-d-e.qmd");

    let request = server.finish();
    assert_eq!(request.target, "/v1/messages");
    assert_eq!(request.headers["x-api-key"], "sk-ant-test");
    assert_eq!(request.headers["anthropic-version"], "2023-06-01");
    assert_eq!(request.body["model"], "claude-3-5-sonnet-latest");
    assert_eq!(request.body["system"], "be terse");
    assert_eq!(request.body["tools"][0]["name"], "report_answer");
}

#[test]
fn openai_sends_bearer_token_and_parses_text() {
    let server = MockProviderServer::start(
        200,
        json!({"choices": [{"message": {"role": "assistant", "content": "Done."}}]}),
    );
    let backend = build_backend(config(
        ProviderKind::OpenAi,
        "gpt-4o",
        Some("sk-test"),
        &format!("{}/", server.base_url),
    ))
    .expect("backend");

    let messages = [ChatMessage::user("hi")];
    let response = backend
        .chat(&ChatRequest {
            system_prompt: "sys",
            messages: &messages,
            tools: &[],
        })
        .expect("chat");
    assert_eq!(response.text, "Done.");
    assert!(response.tool_calls.is_empty());

    let request = server.finish();
    assert_eq!(request.target, "/v1/chat/completions");
    assert_eq!(request.headers["authorization"], "Bearer sk-test");
    assert_eq!(request.body["messages"][0]["role"], "system");
}

#[test]
fn ollama_needs_no_key_and_disables_streaming() {
    let server = MockProviderServer::start(
        200,
        json!({
            "message": {
                "role": "assistant",
                "content": "",
                "tool_calls": [{"function": {"name": "report_answer", "arguments": {"filename": "x", "answer": "y"}}}]
            },
            "done": true
        }),
    );
    let backend = build_backend(config(ProviderKind::Ollama, "llama3.2", None, &server.base_url))
        .expect("backend");

    let messages = [ChatMessage::user("hi")];
    let tools = [report_tool()];
    let response = backend
        .chat(&ChatRequest {
            system_prompt: "sys",
            messages: &messages,
            tools: &tools,
        })
        .expect("chat");
    assert_eq!(response.tool_calls[0].name, "report_answer");
    assert_eq!(response.tool_calls[0].arguments["answer"], "y");

    let request = server.finish();
    assert_eq!(request.target, "/api/chat");
    assert_eq!(request.body["stream"], false);
    assert!(!request.headers.contains_key("authorization"));
}

#[test]
fn google_puts_model_and_key_in_the_url() {
    let server = MockProviderServer::start(
        200,
        json!({"candidates": [{"content": {"role": "model", "parts": [{"text": "ok"}]}}]}),
    );
    let backend = build_backend(config(
        ProviderKind::Google,
        "gemini-1.5-flash",
        Some("g-key"),
        &server.base_url,
    ))
    .expect("backend");

    let messages = [ChatMessage::user("hi")];
    let response = backend
        .chat(&ChatRequest {
            system_prompt: "sys",
            messages: &messages,
            tools: &[],
        })
        .expect("chat");
    assert_eq!(response.text, "ok");

    let request = server.finish();
    assert_eq!(
        request.target,
        "/v1beta/models/gemini-1.5-flash:generateContent?key=g-key"
    );
}

#[test]
fn http_error_status_carries_the_body() {
    let server = MockProviderServer::start(401, json!({"error": {"message": "invalid x-api-key"}}));
    let backend = build_backend(config(
        ProviderKind::Anthropic,
        "claude-3-5-sonnet-latest",
        Some("bad"),
        &server.base_url,
    ))
    .expect("backend");

    let messages = [ChatMessage::user("hi")];
    let err = backend
        .chat(&ChatRequest {
            system_prompt: "sys",
            messages: &messages,
            tools: &[],
        })
        .expect_err("unauthorized");
    server.finish();
    match err {
        ProviderError::HttpStatus { status, body, .. } => {
            assert_eq!(status, 401);
            assert!(body.contains("invalid x-api-key"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unreachable_endpoint_is_a_request_error() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let base = format!("http://{}", listener.local_addr().expect("addr"));
    drop(listener);

    let backend = build_backend(config(ProviderKind::Ollama, "llama3.2", None, &base))
        .expect("backend");
    let messages = [ChatMessage::user("hi")];
    let err = backend
        .chat(&ChatRequest {
            system_prompt: "sys",
            messages: &messages,
            tools: &[],
        })
        .expect_err("connection refused");
    assert!(matches!(err, ProviderError::Request { .. }));
}

#[test]
fn hosted_providers_require_a_key() {
    for provider in [ProviderKind::Anthropic, ProviderKind::OpenAi, ProviderKind::Google] {
        let result = build_backend(config(provider, "m", Some("  "), "http://127.0.0.1:9"));
        assert!(
            matches!(result, Err(ProviderError::MissingApiKey { .. })),
            "{provider} accepted a blank key"
        );
    }
}
