//! Gemini `generateContent` oracle
//!
//! Thin HTTP client; retries and pacing are the job of [`crate::OracleClient`].

use crate::error::OracleError;
use crate::oracle::Oracle;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini client settings
#[derive(Clone, PartialEq)]
pub struct GeminiSettings {
    /// API key
    pub api_key: String,
    /// Model name
    pub model: String,
    /// API base URL
    pub base_url: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Nucleus sampling mass
    pub top_p: f32,
    /// Output token cap
    pub max_output_tokens: u32,
    /// HTTP timeout
    pub timeout: Duration,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            temperature: 0.7,
            top_p: 0.9,
            max_output_tokens: 4096,
            timeout: Duration::from_secs(120),
        }
    }
}

impl fmt::Debug for GeminiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiSettings")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Oracle backed by the Gemini REST API
#[derive(Debug, Clone)]
pub struct GeminiOracle {
    client: Client,
    settings: GeminiSettings,
}

impl GeminiOracle {
    /// Create oracle
    ///
    /// # Errors
    /// Returns [`OracleError::Transport`] if the HTTP client cannot be built.
    pub fn new(settings: GeminiSettings) -> Result<Self, OracleError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| OracleError::transport(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { client, settings })
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model
        )
    }

    fn body<'a>(&self, prompt: &'a str) -> GeminiRequest<'a> {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiPart { text: prompt }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: self.settings.temperature,
                top_p: self.settings.top_p,
                max_output_tokens: self.settings.max_output_tokens,
            },
        }
    }
}

#[async_trait]
impl Oracle for GeminiOracle {
    async fn generate(&self, prompt: &str) -> Result<String, OracleError> {
        tracing::debug!(model = %self.settings.model, prompt_len = prompt.len(), "calling Gemini");

        let response = self
            .client
            .post(self.url())
            .header(API_KEY_HEADER, &self.settings.api_key)
            .json(&self.body(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(if status.as_u16() == 429 {
                OracleError::quota(text)
            } else {
                OracleError::transport(format!("API error {status}: {text}"))
            });
        }

        let reply: GeminiResponse = response.json().await?;
        reply.text().ok_or(OracleError::Empty)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    role: &'static str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiReplyContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiReplyContent {
    #[serde(default)]
    parts: Vec<GeminiReplyPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiReplyPart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiResponse {
    fn text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        (!text.is_empty()).then_some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_body_shape() {
        let oracle = GeminiOracle::new(GeminiSettings::default()).unwrap();
        let body = serde_json::to_value(oracle.body("hi")).unwrap();

        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 4096);
    }

    #[test]
    fn url_carries_model_but_not_key() {
        let oracle = GeminiOracle::new(GeminiSettings {
            api_key: "k".into(),
            base_url: "http://localhost:9/".into(),
            ..GeminiSettings::default()
        })
        .unwrap();
        assert_eq!(
            oracle.url(),
            "http://localhost:9/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn debug_hides_key() {
        let settings = GeminiSettings {
            api_key: "SECRET-KEY-123".into(),
            ..GeminiSettings::default()
        };
        assert!(!format!("{settings:?}").contains("SECRET-KEY-123"));
    }

    #[tokio::test]
    async fn transport_failure_never_reveals_key() {
        let oracle = GeminiOracle::new(GeminiSettings {
            api_key: "SECRET-KEY-123".into(),
            base_url: "http://127.0.0.1:9".into(),
            timeout: Duration::from_secs(5),
            ..GeminiSettings::default()
        })
        .unwrap();

        let err = oracle.generate("hi").await.unwrap_err();
        assert!(matches!(err, OracleError::Transport(_)));
        assert!(!err.describe().contains("SECRET-KEY-123"));
        assert!(!err.to_string().contains("SECRET-KEY-123"));
    }

    #[test]
    fn reply_text_joins_parts() {
        let reply: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "a"}, {"text": "b"}]}}]
        }))
        .unwrap();
        assert_eq!(reply.text().as_deref(), Some("ab"));

        let empty: GeminiResponse = serde_json::from_value(json!({"candidates": []})).unwrap();
        assert!(empty.text().is_none());
    }
}
