//! Bot gateway: issues stateless completion requests to the Gemini API
//! and normalizes the response shapes it is known to produce.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use parlor_config::BotConfig;

/// Reply substituted when the service produced nothing usable.
pub const NO_VALID_RESPONSE: &str = "No valid response from Gemini.";

#[derive(Debug, Error)]
pub enum BotError {
    #[error("missing Gemini API key")]
    ApiKeyMissing,
    #[error("request to Gemini failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Gemini returned status {status}: {message}")]
    Api { status: u16, message: String },
}

/// A single content fragment of a structured completion result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Fragment {
    #[serde(default)]
    pub text: Option<String>,
}

/// Normalized completion response.
///
/// The service answers in one of three shapes: a direct text field, a
/// structured result carrying content fragments, or neither.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotReply {
    DirectText(String),
    FragmentList(Vec<Fragment>),
    Empty,
}

impl BotReply {
    /// Render the reply as chat text. Fragments that carry text are
    /// joined in order with single spaces; an empty response becomes
    /// the fixed warning literal.
    pub fn into_text(self) -> String {
        match self {
            BotReply::DirectText(text) => text,
            BotReply::FragmentList(fragments) => fragments
                .iter()
                .filter_map(|fragment| fragment.text.as_deref())
                .collect::<Vec<_>>()
                .join(" "),
            BotReply::Empty => NO_VALID_RESPONSE.to_string(),
        }
    }
}

/// Seam for the external completion service, so the router can be
/// exercised against a scripted backend.
pub trait CompletionBackend: Send + Sync + 'static {
    /// Issue a single completion request with `prompt` as the entire
    /// input; no conversation context is carried between calls.
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<BotReply, BotError>> + Send;
}

/// HTTP client for the Google Generative Language API.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Build a client from configuration. A missing API key is not an
    /// error here: every completion attempt will fail through the
    /// normal error path until one is configured.
    pub fn from_config(config: &BotConfig) -> Result<Self, BotError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok());

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.clone(),
        })
    }

    /// Whether a credential was resolved from config or environment.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl CompletionBackend for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<BotReply, BotError> {
        let api_key = self.api_key.as_deref().ok_or(BotError::ApiKeyMissing)?;

        let url = format!(
            "{}/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(url)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorEnvelope>().await {
                Ok(envelope) => envelope.error.message,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
            };
            return Err(BotError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        debug!(model = %self.model, "completion response received");
        Ok(parsed.into_reply())
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    fn into_reply(self) -> BotReply {
        if let Some(text) = self.text.filter(|text| !text.is_empty()) {
            return BotReply::DirectText(text);
        }

        if let Some(candidate) = self.candidates.into_iter().next() {
            if !candidate.content.parts.is_empty() {
                return BotReply::FragmentList(candidate.content.parts);
            }
        }

        BotReply::Empty
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Fragment>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: ErrorDetail,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).expect("response should parse")
    }

    #[test]
    fn direct_text_is_used_verbatim() {
        let response = parse(r#"{"text": "hello there"}"#);
        assert_eq!(
            response.into_reply(),
            BotReply::DirectText("hello there".to_string())
        );
    }

    #[test]
    fn empty_direct_text_falls_through_to_candidates() {
        let response = parse(
            r#"{"text": "", "candidates": [{"content": {"parts": [{"text": "fallback"}]}}]}"#,
        );
        assert_eq!(response.into_reply().into_text(), "fallback");
    }

    #[test]
    fn fragments_are_joined_in_order_with_single_spaces() {
        let response = parse(
            r#"{"candidates": [{"content": {"parts": [
                {"text": "first"},
                {"inline_data": {}},
                {"text": "second"},
                {"text": "third"}
            ]}}]}"#,
        );
        assert_eq!(response.into_reply().into_text(), "first second third");
    }

    #[test]
    fn only_the_first_candidate_is_considered() {
        let response = parse(
            r#"{"candidates": [
                {"content": {"parts": [{"text": "kept"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]}"#,
        );
        assert_eq!(response.into_reply().into_text(), "kept");
    }

    #[test]
    fn missing_text_and_candidates_yields_warning() {
        let response = parse(r#"{}"#);
        assert_eq!(response.into_reply(), BotReply::Empty);
        assert_eq!(BotReply::Empty.into_text(), NO_VALID_RESPONSE);
    }

    #[test]
    fn candidate_without_parts_yields_warning() {
        let response = parse(r#"{"candidates": [{"content": {"parts": []}}]}"#);
        assert_eq!(response.into_reply(), BotReply::Empty);
    }

    #[tokio::test]
    async fn missing_api_key_fails_at_invocation() {
        std::env::remove_var("GEMINI_API_KEY");

        let client = GeminiClient::from_config(&BotConfig::default()).expect("client builds");
        assert!(!client.has_api_key());

        let error = client
            .complete("hello")
            .await
            .expect_err("completion must fail without a key");
        assert!(matches!(error, BotError::ApiKeyMissing));
    }
}
