//! Structured extraction of AI replies.
//!
//! Both extractors are total: any input yields a usable result, falling
//! back to the user's own text when the reply cannot be understood.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use inkcheck_protocols::{CorrectionResult, Issue, PromptStyle, Severity, TransformResult};

static FENCED_JSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```json\s*(.*?)```").expect("fenced json regex"));

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCorrection {
    #[serde(default)]
    has_issues: bool,
    #[serde(default)]
    corrected_text: Option<String>,
    #[serde(default)]
    issues: Vec<RawIssue>,
    #[serde(default)]
    overall_comment: String,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    severity: String,
    #[serde(default)]
    original: String,
    #[serde(default)]
    corrected: String,
    #[serde(default)]
    explanation: String,
}

impl From<RawIssue> for Issue {
    fn from(raw: RawIssue) -> Self {
        Issue {
            kind: raw.kind,
            severity: Severity::from_label(&raw.severity),
            original: raw.original,
            corrected: raw.corrected,
            explanation: raw.explanation,
        }
    }
}

/// Parse a correction reply.
///
/// A ```` ```json ```` fenced block is preferred; otherwise the first
/// balanced `{...}` span is used. `has_issues` is kept exactly as given.
pub fn extract_correction(raw: &str, original: &str) -> CorrectionResult {
    let fenced = FENCED_JSON
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim());

    let parsed = fenced
        .into_iter()
        .chain(first_balanced_object(raw))
        .find_map(|candidate| serde_json::from_str::<RawCorrection>(candidate).ok());

    let Some(parsed) = parsed else {
        warn!(reply_len = raw.len(), "Correction reply could not be parsed");
        return CorrectionResult::fallback(original);
    };

    let corrected_text = parsed
        .corrected_text
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| original.to_string());

    CorrectionResult {
        has_issues: parsed.has_issues,
        corrected_text,
        issues: parsed.issues.into_iter().map(Issue::from).collect(),
        overall_comment: parsed.overall_comment,
    }
}

/// First top-level `{...}` span with balanced braces, ignoring braces
/// inside JSON strings.
fn first_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Basic,
    Creative,
    Learning,
}

const SECTION_HEADERS: &[(Section, &str)] = &[
    (Section::Basic, "**基本プロンプト:**"),
    (Section::Basic, "**Basic Prompt:**"),
    (Section::Creative, "**クリエイティブ提案:**"),
    (Section::Creative, "**Creative Suggestion:**"),
    (Section::Learning, "**英語学習:**"),
    (Section::Learning, "**Learning Notes:**"),
];

struct Marker {
    section: Section,
    start: usize,
    body: usize,
}

fn find_markers(raw: &str) -> Vec<Marker> {
    let mut markers: Vec<Marker> = SECTION_HEADERS
        .iter()
        .flat_map(|(section, header)| {
            raw.match_indices(header).map(move |(start, h)| Marker {
                section: *section,
                start,
                body: start + h.len(),
            })
        })
        .collect();
    markers.sort_by_key(|m| m.start);
    markers
}

/// Body of the first occurrence of `section`, up to the next known header.
fn section_text(raw: &str, markers: &[Marker], section: Section) -> Option<String> {
    let index = markers.iter().position(|m| m.section == section)?;
    let body = markers[index].body;
    let end = markers
        .get(index + 1)
        .map(|next| next.start)
        .unwrap_or(raw.len());
    Some(raw[body..end].trim().to_string())
}

/// Parse a transform reply into its sections.
///
/// The creative section is only read for styles other than
/// [`PromptStyle::None`] and the learning section only when learning is
/// enabled. A missing or empty basic section falls back to the whole reply.
pub fn extract_transform(
    raw: &str,
    original: &str,
    style: PromptStyle,
    learning_enabled: bool,
) -> TransformResult {
    let markers = find_markers(raw);

    let basic_prompt = section_text(raw, &markers, Section::Basic)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| {
            debug!("No basic prompt section, using the whole reply");
            raw.trim().to_string()
        });
    let basic_prompt = if basic_prompt.is_empty() {
        original.trim().to_string()
    } else {
        basic_prompt
    };

    let creative_prompt = if style.is_simple_translation() {
        String::new()
    } else {
        section_text(raw, &markers, Section::Creative).unwrap_or_default()
    };

    let learning_content = if learning_enabled {
        section_text(raw, &markers, Section::Learning).unwrap_or_default()
    } else {
        String::new()
    };

    TransformResult {
        original_text: original.to_string(),
        basic_prompt,
        creative_prompt,
        learning_content,
        has_learning: learning_enabled,
        is_simple_translation: style.is_simple_translation(),
    }
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod tests;
