//! Prompt templates for the AI capability.

use inkcheck_protocols::{PromptLength, PromptStyle};

use crate::agent::PageContext;

fn context_line(context: PageContext) -> &'static str {
    match context {
        PageContext::Email => "The following text is part of an email.",
        PageContext::Chat => "The following text is a chat message.",
        PageContext::Form => "The following text was entered into a web form.",
        PageContext::Default => "The following text is from a web page.",
    }
}

/// Correction prompt asking for the JSON shape the extractor expects.
pub fn correction_prompt(text: &str, context: PageContext) -> String {
    format!(
        r#"{context}
Check the text for typos and missing or doubled characters and fix them.

Rules:
1. Only fix typos. Do not change politeness, tone or phrasing.
2. If anything needs fixing, return the full corrected text.
3. List every fix separately.

Text:
"{text}"

Answer with JSON in exactly this shape:
{{
  "hasIssues": boolean,
  "correctedText": "full corrected text (the original text if nothing changed)",
  "issues": [
    {{
      "type": "typo",
      "severity": "low" | "medium" | "high",
      "original": "the wrong fragment",
      "corrected": "the fixed fragment",
      "explanation": "why it was changed"
    }}
  ],
  "overallComment": "short summary of the changes"
}}"#,
        context = context_line(context),
        text = text,
    )
}

fn length_instruction(length: PromptLength) -> &'static str {
    match length {
        PromptLength::Short => "concise (about 15-30 words)",
        PromptLength::Medium => "moderately detailed (about 30-50 words)",
        PromptLength::Long => "detailed and specific (about 50-80 words)",
    }
}

fn style_instruction(style: PromptStyle) -> &'static str {
    match style {
        PromptStyle::None => "",
        PromptStyle::Detailed => "rich in concrete visual detail, lighting and composition",
        PromptStyle::Artistic => "painterly, naming an art movement or medium",
        PromptStyle::Anime => "anime illustration style, clean line art and vivid colours",
        PromptStyle::Photography => "photographic, naming camera, lens and lighting",
        PromptStyle::Minimalist => "minimalist, few elements and generous negative space",
    }
}

const LEARNING_BLOCK: &str = "**Learning Notes:**
- [key English word]: [meaning] - [how it is used here]
- [expression tip]: [explanation]";

/// Transform prompt using the section headers the extractor recognises.
pub fn transform_prompt(
    text: &str,
    style: PromptStyle,
    length: PromptLength,
    learning_enabled: bool,
) -> String {
    let learning = if learning_enabled {
        format!("\n{}\n", LEARNING_BLOCK)
    } else {
        String::new()
    };

    if style.is_simple_translation() {
        return format!(
            r#"Translate the following text into natural English.

Input: "{text}"

Instructions:
1. A {length} natural, accurate translation.
2. No decorative or technical modifiers.

Output format:
**Basic Prompt:**
[plain English translation]
{learning}"#,
            text = text,
            length = length_instruction(length),
            learning = learning,
        );
    }

    format!(
        r#"Turn the following text into an English image-generation prompt.

Input: "{text}"

Instructions:
1. Basic prompt: a {length} natural English rendering.
2. Style: {style}.
3. Do not include tool parameters.
4. Creative suggestion: a more striking variation.

Output format:
**Basic Prompt:**
[plain English prompt]

**Creative Suggestion:**
[creative variation]
{learning}"#,
        text = text,
        length = length_instruction(length),
        style = style_instruction(style),
        learning = learning,
    )
}
