//! OpenAI Responses API provider with the hosted web search tool.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use searchchat_core::{
    ContentPart, OutputItem, ProviderError, ProviderOutput, ProviderReply, ProviderRequest,
    ResponseId, ResponsesProvider,
};

/// Client for `POST {base_url}/responses`.
pub struct OpenAiResponsesClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Option<Duration>,
}

impl OpenAiResponsesClient {
    /// Create a new client with the default model and endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: None,
        }
    }

    /// Set the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (for API-compatible services).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Bound each provider call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct CreateResponseBody<'a> {
    model: &'a str,
    #[serde(flatten)]
    request: &'a ProviderRequest,
}

#[derive(Deserialize)]
struct ResponseBody {
    id: String,
    #[serde(default)]
    output_text: Option<String>,
    #[serde(default)]
    output: Option<Vec<WireOutputItem>>,
}

#[derive(Deserialize)]
struct WireOutputItem {
    #[serde(rename = "type", default)]
    item_type: String,
    #[serde(default)]
    content: Option<WireContent>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireContent {
    Text(String),
    Parts(Vec<WireContentPart>),
}

#[derive(Deserialize)]
struct WireContentPart {
    #[serde(rename = "type", default)]
    part_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl From<WireOutputItem> for OutputItem {
    fn from(item: WireOutputItem) -> Self {
        let content = match item.content {
            None => Vec::new(),
            Some(WireContent::Text(text)) => vec![ContentPart::Text(text)],
            Some(WireContent::Parts(parts)) => parts
                .into_iter()
                .map(|part| match (part.part_type.as_str(), part.text) {
                    ("output_text" | "text", Some(text)) => ContentPart::Text(text),
                    _ => ContentPart::Other(part.part_type),
                })
                .collect(),
        };
        OutputItem {
            kind: item.item_type,
            content,
        }
    }
}

impl From<ResponseBody> for ProviderReply {
    fn from(body: ResponseBody) -> Self {
        let output = match (body.output_text, body.output) {
            (Some(text), _) if !text.trim().is_empty() => ProviderOutput::Text(text),
            (_, Some(items)) if !items.is_empty() => {
                ProviderOutput::Items(items.into_iter().map(OutputItem::from).collect())
            }
            _ => ProviderOutput::Empty,
        };
        ProviderReply {
            id: ResponseId::new(body.id),
            output,
        }
    }
}

#[async_trait]
impl ResponsesProvider for OpenAiResponsesClient {
    async fn create_response(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderReply, ProviderError> {
        let url = format!("{}/responses", self.base_url);
        debug!(url = %url, model = %self.model, items = request.input.len(), "POST request");

        let body = CreateResponseBody {
            model: &self.model,
            request,
        };

        let mut builder = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error.message)
                .unwrap_or(text);
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: ResponseBody =
            serde_json::from_str(&text).map_err(|e| ProviderError::Decode(e.to_string()))?;

        Ok(body.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use searchchat_core::{build_request, extract_answer, SystemPrompt, FALLBACK_RESPONSE};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_request() -> ProviderRequest {
        build_request(&SystemPrompt::new("sys"), None, &[], "Hello").unwrap()
    }

    fn client(server: &MockServer) -> OpenAiResponsesClient {
        OpenAiResponsesClient::new("sk-test")
            .with_model("gpt-4o")
            .with_base_url(format!("{}/v1/", server.uri()))
    }

    #[tokio::test]
    async fn test_sends_search_tool_and_store_flag() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/responses"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4o",
                "input": [
                    { "role": "system", "content": "sys" },
                    { "role": "user", "content": "Hello" },
                ],
                "tools": [{ "type": "web_search" }],
                "tool_choice": "auto",
                "store": true,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "resp_123",
                "output_text": "Hi there!",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client(&server).create_response(&sample_request()).await.unwrap();

        assert_eq!(reply.id.as_str(), "resp_123");
        assert_eq!(reply.output, ProviderOutput::Text("Hi there!".to_string()));
    }

    #[tokio::test]
    async fn test_decodes_structured_output() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/responses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "resp_456",
                "output": [
                    { "type": "web_search_call", "id": "ws_1", "status": "completed" },
                    {
                        "type": "message",
                        "id": "msg_1",
                        "role": "assistant",
                        "content": [
                            { "type": "output_text", "text": "The Knicks play at 7pm.", "annotations": [] }
                        ]
                    }
                ]
            })))
            .mount(&server)
            .await;

        let reply = client(&server).create_response(&sample_request()).await.unwrap();
        let answer = extract_answer(reply);

        assert_eq!(answer.text, "The Knicks play at 7pm.");
        assert!(!answer.fallback);
    }

    #[tokio::test]
    async fn test_blank_output_text_falls_through_to_items() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "resp_789",
                "output_text": "  ",
                "output": [{ "type": "message", "content": "plain string content" }]
            })))
            .mount(&server)
            .await;

        let reply = client(&server).create_response(&sample_request()).await.unwrap();
        assert_eq!(reply.output.normalize().as_deref(), Some("plain string content"));
    }

    #[tokio::test]
    async fn test_empty_reply_normalizes_to_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "resp_empty",
                "output": []
            })))
            .mount(&server)
            .await;

        let reply = client(&server).create_response(&sample_request()).await.unwrap();
        assert_eq!(reply.output, ProviderOutput::Empty);
        assert_eq!(extract_answer(reply).text, FALLBACK_RESPONSE);
    }

    #[tokio::test]
    async fn test_error_status_carries_provider_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" }
            })))
            .mount(&server)
            .await;

        let err = client(&server).create_response(&sample_request()).await.unwrap_err();

        assert_eq!(
            err,
            ProviderError::Status {
                status: 401,
                message: "Incorrect API key provided".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_undecodable_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client(&server).create_response(&sample_request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_transport_error() {
        let client = OpenAiResponsesClient::new("sk-test")
            .with_base_url("http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(2));

        let err = client.create_response(&sample_request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
    }
}
