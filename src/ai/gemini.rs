// file: src/ai/gemini.rs
// description: Gemini generateContent REST client
// reference: https://ai.google.dev/api/generate-content

use crate::ai::model::ContentModel;
use crate::config::GeminiConfig;
use crate::error::{EflError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
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
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    temperature: Option<f32>,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, endpoint: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            endpoint,
            temperature: None,
        }
    }

    /// Build from config; a missing API key is a configuration error.
    pub fn from_config(config: &GeminiConfig) -> Result<Self> {
        let api_key = config.resolved_api_key().ok_or_else(|| {
            EflError::Config(
                "No Gemini API key: set gemini.api_key or GEMINI_API_KEY".to_string(),
            )
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            endpoint: config.endpoint.clone(),
            temperature: config.temperature,
        })
    }

    pub fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl ContentModel for GeminiClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: self.temperature.map(|temperature| GenerationConfig { temperature }),
        };

        debug!(
            "Requesting completion from {} for {} chars",
            self.model,
            prompt.len()
        );

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| EflError::Ai(format!("Failed to send Gemini request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(EflError::Ai(format!(
                "Gemini request failed with status {}: {}",
                status, error_text
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| EflError::Ai(format!("Failed to parse Gemini response: {}", e)))?;

        let text = response_text(body);
        if text.trim().is_empty() {
            return Err(EflError::Ai("Gemini returned no text".to_string()));
        }

        debug!("Received {} chars from {}", text.len(), self.model);
        Ok(text)
    }
}

/// Concatenate the text parts of the first candidate.
fn response_text(body: GenerateResponse) -> String {
    body.candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_request_body_shape() {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: "hello" }],
            }],
            generation_config: None,
        };
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"contents":[{"parts":[{"text":"hello"}]}]}"#
        );
    }

    #[test]
    fn test_response_text_joins_parts() {
        let body: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"1. A?\n"},{"text":"2. B?"}]}},{"content":{"parts":[{"text":"ignored"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(response_text(body), "1. A?\n2. B?");
    }

    #[test]
    fn test_response_without_candidates() {
        let body: GenerateResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert_eq!(response_text(body), "");
    }

    #[test]
    fn test_url_and_missing_key() {
        let client = GeminiClient::new(
            "k".to_string(),
            "gemini-2.5-flash".to_string(),
            "https://example.test/v1beta/".to_string(),
        );
        assert_eq!(
            client.url(),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );

        let mut config = crate::config::Config::default_config().gemini;
        config.api_key = Some("   ".to_string());
        assert!(matches!(
            GeminiClient::from_config(&config),
            Err(EflError::Config(_))
        ));
    }
}
