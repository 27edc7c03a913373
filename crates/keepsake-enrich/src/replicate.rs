//! Image synthesis through Replicate's prediction API.

use base64::Engine;
use keepsake_processing::Sample;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::client::AspectRatio;
use crate::EnrichError;

const API_BASE: &str = "https://api.replicate.com/v1";
const MAX_POLL_ATTEMPTS: u32 = 120;
const POLL_INTERVAL: Duration = Duration::from_secs(1);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    id: String,
    status: String,
    output: Option<serde_json::Value>,
    error: Option<String>,
}

/// Reference-conditioned image generator.
pub struct ReplicateImageGenerator {
    http_client: reqwest::Client,
    api_token: String,
    model: String,
}

impl ReplicateImageGenerator {
    pub fn new(api_token: String, model: String) -> Result<Self, EnrichError> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| EnrichError::Unavailable(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_token,
            model,
        })
    }

    /// Create a prediction, poll it to completion and download the result.
    pub async fn generate(
        &self,
        reference: &Sample,
        prompt: &str,
        aspect: AspectRatio,
    ) -> Result<Vec<u8>, EnrichError> {
        let prediction = self.create_prediction(reference, prompt, aspect).await?;

        tracing::debug!(
            prediction_id = %prediction.id,
            model = %self.model,
            "Created image generation prediction"
        );

        let completed = self.wait_for_prediction(&prediction.id).await?;
        let url = output_url(&completed)?;
        self.download(&url).await
    }

    async fn create_prediction(
        &self,
        reference: &Sample,
        prompt: &str,
        aspect: AspectRatio,
    ) -> Result<PredictionResponse, EnrichError> {
        let data_uri = format!(
            "data:{};base64,{}",
            reference.content_type,
            base64::engine::general_purpose::STANDARD.encode(&reference.data)
        );

        let body = json!({
            "input": {
                "prompt": prompt,
                "input_image": data_uri,
                "aspect_ratio": aspect.as_str(),
            }
        });

        let response = self
            .http_client
            .post(format!("{}/models/{}/predictions", API_BASE, self.model))
            .header("Authorization", format!("Bearer {}", self.api_token))
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

        Ok(response.json().await?)
    }

    async fn wait_for_prediction(&self, id: &str) -> Result<PredictionResponse, EnrichError> {
        for _ in 0..MAX_POLL_ATTEMPTS {
            let response = self
                .http_client
                .get(format!("{}/predictions/{}", API_BASE, id))
                .header("Authorization", format!("Bearer {}", self.api_token))
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

            let prediction: PredictionResponse = response.json().await?;
            match prediction.status.as_str() {
                "succeeded" => return Ok(prediction),
                "failed" | "canceled" => {
                    return Err(EnrichError::Unavailable(format!(
                        "prediction {}: {}",
                        prediction.status,
                        prediction.error.unwrap_or_else(|| "no detail".to_string())
                    )));
                }
                _ => tokio::time::sleep(POLL_INTERVAL).await,
            }
        }

        Err(EnrichError::Unavailable(format!(
            "prediction {} did not complete within {} polls",
            id, MAX_POLL_ATTEMPTS
        )))
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, EnrichError> {
        let response = self.http_client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichError::from_status(
                status,
                format!("downloading generated image from {}", url),
            ));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// The output field is either a bare URL string or a list of URLs.
fn output_url(prediction: &PredictionResponse) -> Result<String, EnrichError> {
    match &prediction.output {
        Some(serde_json::Value::String(url)) => Ok(url.clone()),
        Some(serde_json::Value::Array(items)) => items
            .first()
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                EnrichError::InvalidResponse("prediction output list is empty".to_string())
            }),
        _ => Err(EnrichError::InvalidResponse(
            "prediction succeeded without output".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(output: Option<serde_json::Value>) -> PredictionResponse {
        PredictionResponse {
            id: "pred-1".to_string(),
            status: "succeeded".to_string(),
            output,
            error: None,
        }
    }

    #[test]
    fn test_output_url_from_string() {
        let p = prediction(Some(json!("https://replicate.delivery/out.webp")));
        assert_eq!(output_url(&p).unwrap(), "https://replicate.delivery/out.webp");
    }

    #[test]
    fn test_output_url_from_list() {
        let p = prediction(Some(json!(["https://replicate.delivery/a.webp", "b"])));
        assert_eq!(output_url(&p).unwrap(), "https://replicate.delivery/a.webp");
    }

    #[test]
    fn test_missing_output_is_invalid() {
        assert!(matches!(
            output_url(&prediction(None)),
            Err(EnrichError::InvalidResponse(_))
        ));
        assert!(matches!(
            output_url(&prediction(Some(json!([])))),
            Err(EnrichError::InvalidResponse(_))
        ));
    }
}
