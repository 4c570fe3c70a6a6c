//! [`TextGenerator`] backed by Gemini.

use async_trait::async_trait;
use tracing::{debug, warn};

use inkcheck_config::ProviderConfig;
use inkcheck_protocols::{CapabilityError, GenerationConfig, TextGenerator};

use crate::client::GeminiClient;
use crate::types::{Content, GenerateContentRequest};

/// Gemini text generation.
pub struct GeminiGenerator {
    client: GeminiClient,
}

impl GeminiGenerator {
    pub fn new(config: &ProviderConfig) -> Result<Self, CapabilityError> {
        Ok(Self {
            client: GeminiClient::new(config)?,
        })
    }

    /// Same as [`GeminiGenerator::new`] with a different API base URL.
    pub fn with_url(config: &ProviderConfig, base_url: impl Into<String>) -> Result<Self, CapabilityError> {
        let config = ProviderConfig {
            base_url: base_url.into(),
            ..config.clone()
        };
        Self::new(&config)
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(
        &self,
        api_key: &str,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String, CapabilityError> {
        let request = GenerateContentRequest {
            contents: vec![Content::user_text(prompt)],
            generation_config: Some(config.into()),
        };

        let response = self.client.generate_content(api_key, &request).await?;

        match response.first_text() {
            Some(text) => {
                debug!(model = self.client.model(), chars = text.len(), "Generated text");
                Ok(text)
            }
            None => {
                let reason = response
                    .candidates
                    .first()
                    .and_then(|c| c.finish_reason.clone());
                warn!(model = self.client.model(), ?reason, "No text in response");
                Err(CapabilityError::EmptyResponse)
            }
        }
    }
}

#[cfg(test)]
#[path = "generator_tests.rs"]
mod tests;
