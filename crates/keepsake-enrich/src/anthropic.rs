//! Analyze capability over Anthropic's messages API.

use base64::Engine;
use keepsake_core::GeneratedMetadata;
use keepsake_processing::Sample;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::parse::extract_json;
use crate::prompts;
use crate::EnrichError;

const API_BASE: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 2048;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

// Messages API request/response structures
#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<MessageParam>,
}

#[derive(Debug, Serialize)]
struct MessageParam {
    role: String,
    content: Vec<ContentBlock>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    Image { source: ImageSource },
}

#[derive(Debug, Serialize)]
struct ImageSource {
    #[serde(rename = "type")]
    source_type: String,
    media_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlockResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlockResponse {
    Text { text: String },
}

/// Multimodal analyzer over the messages API.
pub struct AnthropicAnalyzer {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
}

impl AnthropicAnalyzer {
    pub fn new(api_key: String, model: String) -> Result<Self, EnrichError> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| EnrichError::Unavailable(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key,
            model,
        })
    }

    /// Submit all samples in one request; decode the JSON contract
    /// leniently.
    pub async fn analyze(
        &self,
        samples: &[Sample],
        comic_mode: bool,
    ) -> Result<GeneratedMetadata, EnrichError> {
        let mut content: Vec<ContentBlock> = samples
            .iter()
            .map(|sample| ContentBlock::Image {
                source: ImageSource {
                    source_type: "base64".to_string(),
                    media_type: sample.content_type.to_string(),
                    data: base64::engine::general_purpose::STANDARD.encode(&sample.data),
                },
            })
            .collect();
        content.push(ContentBlock::Text {
            text: prompts::analysis_prompt(comic_mode),
        });

        let body = MessagesRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            messages: vec![MessageParam {
                role: "user".to_string(),
                content,
            }],
        };

        tracing::debug!(
            sample_count = samples.len(),
            model = %self.model,
            comic_mode,
            "Submitting samples for analysis"
        );

        let response = self
            .http_client
            .post(format!("{}/messages", API_BASE))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(EnrichError::from_status(status, error_text));
        }

        let parsed: MessagesResponse = response.json().await?;

        let text = parsed
            .content
            .into_iter()
            .map(|b| match b {
                ContentBlockResponse::Text { text } => text,
            })
            .next()
            .unwrap_or_default();

        let value = extract_json(&text)?;
        serde_json::from_value(value)
            .map_err(|e| EnrichError::InvalidResponse(format!("metadata shape mismatch: {}", e)))
    }
}
