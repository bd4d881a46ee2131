//! Google Gemini `generateContent` client.
//!
//! A single non-streaming request per call: the prompt, a JSON response MIME
//! type with the schema from [`CompletionRequest`], and the search tool when
//! the request is about a link. The reply text is the concatenation of the
//! text parts of the first candidate.

use crate::error::{ErrorKind, Result};
use crate::{CompletionRequest, Summarizer};
use async_trait::async_trait;
use exn::{OptionExt, ResultExt};
use instanews_config::AiConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::instrument;

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig<'a>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [TextPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// [`Summarizer`] backed by the Gemini REST API.
#[derive(Clone, Debug)]
pub struct GeminiSummarizer {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiSummarizer {
    /// Creates a client. A missing API key is only reported when a request is
    /// attempted, so that manual entry keeps working without one.
    pub fn new(config: &AiConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(seconds) = config.timeout {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder.build().or_raise(|| ErrorKind::Network)?;
        tracing::debug!(model = %config.model, has_key = config.api_key.is_some(), "Gemini summarizer configured");
        Ok(Self {
            client,
            api_key: config.api_key.clone().filter(|key| !key.trim().is_empty()),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn body<'a>(request: &'a CompletionRequest) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            contents: [Content { role: "user", parts: [TextPart { text: &request.prompt }] }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: &request.schema,
            },
            tools: match request.search {
                true => vec![serde_json::json!({ "googleSearch": {} })],
                false => Vec::new(),
            },
        }
    }

    fn reply_text(response: GenerateContentResponse) -> Result<String> {
        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
            .ok_or_raise(|| ErrorKind::EmptyReply)?;
        match text.trim().is_empty() {
            true => exn::bail!(ErrorKind::EmptyReply),
            false => Ok(text),
        }
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    fn name(&self) -> &str {
        &self.model
    }

    #[instrument(skip_all, fields(model = %self.model, search = request.search))]
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or_raise(|| ErrorKind::MissingApiKey)?;
        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, api_key)
            .json(&Self::body(request))
            .send()
            .await
            .or_raise(|| ErrorKind::Network)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Summarization request rejected");
            exn::bail!(ErrorKind::Service { status: status.as_u16(), body });
        }
        let bytes = response.bytes().await.or_raise(|| ErrorKind::Network)?;
        let parsed: GenerateContentResponse = serde_json::from_slice(&bytes)
            .or_raise(|| ErrorKind::MalformedReply("unexpected generateContent response shape".into()))?;
        let text = Self::reply_text(parsed)?;
        tracing::debug!(reply_size = text.len(), "Summarization reply received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Source;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL_PATH: &str = "/models/gemini-test:generateContent";

    fn config(base_url: &str, api_key: Option<&str>) -> AiConfig {
        AiConfig {
            api_key: api_key.map(str::to_string),
            model: "gemini-test".to_string(),
            base_url: base_url.to_string(),
            timeout: Some(5),
        }
    }

    fn candidate(text: &str) -> Value {
        json!({ "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }] })
    }

    #[tokio::test]
    async fn sends_schema_and_returns_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .and(header(API_KEY_HEADER, "key-123"))
            .and(body_partial_json(json!({
                "generationConfig": { "responseMimeType": "application/json" },
                "tools": [{ "googleSearch": {} }],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate(r#"{"title":"T"}"#)))
            .expect(1)
            .mount(&server)
            .await;

        let summarizer = GeminiSummarizer::new(&config(&server.uri(), Some("key-123"))).unwrap();
        let request = CompletionRequest::from(&Source::Url("https://example.com".into()));
        assert_eq!(summarizer.complete(&request).await.unwrap(), r#"{"title":"T"}"#);
    }

    #[test]
    fn text_requests_have_no_tools() {
        let request = CompletionRequest::from(&Source::Text("texto".into()));
        let body = serde_json::to_value(GeminiSummarizer::body(&request)).unwrap();
        assert!(body.get("tools").is_none());
        assert_eq!(body["contents"][0]["parts"][0]["text"], request.prompt);
        assert_eq!(body["generationConfig"]["responseSchema"], request.schema);
    }

    #[tokio::test]
    async fn joins_text_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] } }]
            })))
            .mount(&server)
            .await;

        let summarizer = GeminiSummarizer::new(&config(&server.uri(), Some("k"))).unwrap();
        let request = CompletionRequest::from(&Source::Text("x".into()));
        assert_eq!(summarizer.complete(&request).await.unwrap(), "{\"a\":1}");
    }

    #[tokio::test]
    async fn http_error_is_service_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let summarizer = GeminiSummarizer::new(&config(&server.uri(), Some("k"))).unwrap();
        let request = CompletionRequest::from(&Source::Text("x".into()));
        let err = summarizer.complete(&request).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Service { status: 503, body: "overloaded".to_string() });
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn no_candidates_is_empty_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let summarizer = GeminiSummarizer::new(&config(&server.uri(), Some("k"))).unwrap();
        let request = CompletionRequest::from(&Source::Text("x".into()));
        let err = summarizer.complete(&request).await.unwrap_err();
        assert_eq!(*err, ErrorKind::EmptyReply);
    }

    #[tokio::test]
    async fn missing_key_fails_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

        let summarizer = GeminiSummarizer::new(&config(&server.uri(), None)).unwrap();
        let request = CompletionRequest::from(&Source::Text("x".into()));
        let err = summarizer.complete(&request).await.unwrap_err();
        assert_eq!(*err, ErrorKind::MissingApiKey);
    }

    #[tokio::test]
    async fn unreachable_service_is_network_error() {
        // Nothing listens on port 9 (discard) in the test environment.
        let summarizer = GeminiSummarizer::new(&config("http://127.0.0.1:9", Some("k"))).unwrap();
        let request = CompletionRequest::from(&Source::Text("x".into()));
        let err = summarizer.complete(&request).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Network);
    }
}
