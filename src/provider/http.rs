use crate::provider::{parse_failure, ProviderError, ProviderKind};
use serde_json::Value;
use std::time::Duration;

pub(crate) fn post_json(
    provider: ProviderKind,
    url: &str,
    headers: &[(&str, String)],
    body: &Value,
    timeout: Duration,
) -> Result<Value, ProviderError> {
    let agent = ureq::AgentBuilder::new().timeout(timeout).build();
    let mut request = agent.post(url);
    for (name, value) in headers {
        request = request.set(name, value);
    }

    let response = match request.send_json(body.clone()) {
        Ok(response) => response,
        Err(ureq::Error::Status(status, response)) => {
            let body = response
                .into_string()
                .unwrap_or_else(|err| format!("<unreadable body: {err}>"));
            return Err(ProviderError::HttpStatus {
                provider,
                status,
                body,
            });
        }
        Err(err) => {
            return Err(ProviderError::Request {
                provider,
                reason: err.to_string(),
            })
        }
    };

    response
        .into_json::<Value>()
        .map_err(|err| parse_failure(provider, format!("response is not valid json: {err}")))
}
