//! External AI text generation capability.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CapabilityError;

/// Sampling parameters for one call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: Option<f32>,
    pub max_output_tokens: u32,
}

impl GenerationConfig {
    pub fn new(temperature: f32, max_output_tokens: u32) -> Self {
        Self {
            temperature: Some(temperature),
            max_output_tokens,
        }
    }

    /// Tiny request used to check that an API key is accepted.
    pub fn key_probe() -> Self {
        Self {
            temperature: None,
            max_output_tokens: 10,
        }
    }
}

/// Black-box text generation: prompt in, free-form text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        api_key: &str,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String, CapabilityError>;
}
