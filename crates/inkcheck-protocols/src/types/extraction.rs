//! Typed results produced from raw AI output.

use serde::{Deserialize, Serialize};

/// Severity of a single correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
}

impl Severity {
    /// Map a free-form label from model output. Unrecognised labels are `Low`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "high" | "高" => Severity::High,
            "medium" | "mid" | "中" => Severity::Medium,
            _ => Severity::Low,
        }
    }
}

/// One correction found by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: Severity,
    pub original: String,
    pub corrected: String,
    pub explanation: String,
}

/// Result of correction mode.
///
/// `has_issues` is reported as given by the model and may disagree with
/// `issues.len()`; the view decides which one to trust.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionResult {
    pub has_issues: bool,
    pub corrected_text: String,
    pub issues: Vec<Issue>,
    pub overall_comment: String,
}

impl CorrectionResult {
    /// Comment used when the model output could not be parsed.
    pub const EXTRACTION_FAILED: &'static str = "extraction failed";

    /// Deterministic result for unparseable output.
    pub fn fallback(original: &str) -> Self {
        Self {
            has_issues: false,
            corrected_text: original.to_string(),
            issues: Vec::new(),
            overall_comment: Self::EXTRACTION_FAILED.to_string(),
        }
    }

    /// Number of issues counted towards the persisted totals.
    pub fn reported_issue_count(&self) -> u64 {
        if self.has_issues {
            self.issues.len() as u64
        } else {
            0
        }
    }
}

/// Result of transform mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResult {
    pub original_text: String,
    /// Never empty.
    pub basic_prompt: String,
    pub creative_prompt: String,
    pub learning_content: String,
    pub has_learning: bool,
    pub is_simple_translation: bool,
}

/// What an agent produced for a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "result", rename_all = "snake_case")]
pub enum AgentOutcome {
    Corrected(CorrectionResult),
    Converted(TransformResult),
}
