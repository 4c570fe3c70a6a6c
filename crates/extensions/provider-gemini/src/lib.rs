//! # inkcheck Provider - Gemini
//!
//! Google Gemini `generateContent` client behind the
//! [`TextGenerator`](inkcheck_protocols::TextGenerator) capability.

mod client;
mod generator;
mod types;

pub use client::GeminiClient;
pub use generator::GeminiGenerator;
pub use types::*;
