//! Structured-payload extraction from free-form completion text
//!
//! Providers wrap JSON in markdown fences, prose, or nothing at all. Tiers
//! are tried in a fixed order and the first one that yields a `T` wins:
//!
//! 1. `Direct` - the whole (trimmed) text
//! 2. `Fenced` - the interior of a code fence labelled `json`
//! 3. `Delimited` - the first balanced `{...}` or `[...]` span that parses

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which extraction tier produced a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionTier {
    Direct,
    Fenced,
    Delimited,
}

impl fmt::Display for ExtractionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Direct => "direct",
            Self::Fenced => "fenced",
            Self::Delimited => "delimited",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extracted<T> {
    pub value: T,
    pub tier: ExtractionTier,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("response was empty")]
    Empty,

    #[error("no structured payload found in response: {preview}")]
    NotFound { preview: String },
}

const PREVIEW_LEN: usize = 120;

/// Locate and parse a `T` embedded in `text`
pub fn extract_structured<T: DeserializeOwned>(text: &str) -> Result<Extracted<T>, ExtractionError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ExtractionError::Empty);
    }

    if let Ok(value) = serde_json::from_str::<T>(trimmed) {
        return Ok(Extracted {
            value,
            tier: ExtractionTier::Direct,
        });
    }

    for block in fenced_json_blocks(trimmed) {
        if let Ok(value) = serde_json::from_str::<T>(block.trim()) {
            return Ok(Extracted {
                value,
                tier: ExtractionTier::Fenced,
            });
        }
    }

    for span in balanced_spans(trimmed) {
        if let Ok(value) = serde_json::from_str::<T>(span) {
            return Ok(Extracted {
                value,
                tier: ExtractionTier::Delimited,
            });
        }
    }

    Err(ExtractionError::NotFound {
        preview: preview(trimmed),
    })
}

/// Interiors of every ```` ```json ```` fence, in order of appearance
fn fenced_json_blocks(text: &str) -> Vec<&str> {
    const FENCE: &str = "```";
    let mut blocks = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find(FENCE) {
        let after_open = &rest[open + FENCE.len()..];
        let Some(line_end) = after_open.find('\n') else {
            break;
        };
        let label = after_open[..line_end].trim();
        let body = &after_open[line_end + 1..];
        let Some(close) = body.find(FENCE) else {
            break;
        };

        if label.eq_ignore_ascii_case("json") {
            blocks.push(&body[..close]);
        }
        rest = &body[close + FENCE.len()..];
    }

    blocks
}

/// Balanced `{...}` / `[...]` spans, ordered by opening position.
///
/// One pass over the text. Quotes only delimit strings inside brackets, so
/// prose quoting around a payload does not hide it, and brackets inside JSON
/// strings are ignored. A mismatched closer abandons every span still open.
fn balanced_spans(text: &str) -> impl Iterator<Item = &str> {
    let mut open: Vec<(usize, char)> = Vec::new();
    let mut spans = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
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
            '"' if !open.is_empty() => in_string = true,
            '{' => open.push((i, '}')),
            '[' => open.push((i, ']')),
            '}' | ']' => match open.pop() {
                Some((start, expected)) if expected == c => {
                    spans.push((start, i + c.len_utf8()));
                }
                Some(_) => open.clear(),
                None => {}
            },
            _ => {}
        }
    }

    spans.sort_unstable_by_key(|&(start, _)| start);
    spans.into_iter().map(move |(start, end)| &text[start..end])
}

fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_LEN {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(PREVIEW_LEN - 3).collect();
    truncated.push_str("...");
    truncated
}
