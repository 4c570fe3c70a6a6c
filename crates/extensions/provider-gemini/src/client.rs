//! Gemini API client.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use inkcheck_config::ProviderConfig;
use inkcheck_protocols::CapabilityError;

use crate::types::*;

/// Gemini API client.
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    /// Create a client for the configured endpoint and model.
    pub fn new(config: &ProviderConfig) -> Result<Self, CapabilityError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| CapabilityError::Unreachable(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate content (non-streaming).
    pub async fn generate_content(
        &self,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, CapabilityError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        debug!(model = %self.model, "Gemini generate_content");

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(request)
            .send()
            .await
            .map_err(|e| CapabilityError::Unreachable(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CapabilityError::Unreachable(e.without_url().to_string()))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<GeminiError>(&body) {
                Ok(e) => e.error.message,
                Err(_) => body,
            };
            return Err(CapabilityError::from_status(status.as_u16(), message));
        }

        serde_json::from_str(&body).map_err(|e| CapabilityError::Api {
            status: status.as_u16(),
            message: format!("Failed to parse response: {}", e),
        })
    }
}
