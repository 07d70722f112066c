//! Redis-style glob patterns
//!
//! Supports `*`, `?`, `[abc]`, `[^abc]`, `[a-z]` and `\` escapes, matching
//! the semantics of `KEYS`/`SCAN MATCH` so both stores agree on which keys a
//! pattern selects.

use crate::utils::error::{GatewayError, Result};
use regex::Regex;

/// Compiled glob pattern
#[derive(Debug, Clone)]
pub struct GlobPattern {
    regex: Regex,
}

impl GlobPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let mut out = String::with_capacity(pattern.len() * 2 + 2);
        out.push('^');

        let mut chars = pattern.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '*' => out.push_str(".*"),
                '?' => out.push('.'),
                '\\' => match chars.next() {
                    Some(escaped) => out.push_str(&regex::escape(&escaped.to_string())),
                    None => out.push_str(r"\\"),
                },
                '[' => {
                    let mut class = String::new();
                    let mut closed = false;
                    if chars.peek() == Some(&'^') {
                        chars.next();
                        class.push('^');
                    }
                    while let Some(inner) = chars.next() {
                        match inner {
                            ']' => {
                                closed = true;
                                break;
                            }
                            '\\' => {
                                if let Some(escaped) = chars.next() {
                                    class.push_str(&regex::escape(&escaped.to_string()));
                                }
                            }
                            '-' => class.push('-'),
                            other => class.push_str(&regex::escape(&other.to_string())),
                        }
                    }
                    if !closed {
                        return Err(GatewayError::invalid_request(format!(
                            "Unterminated character class in pattern: {}",
                            pattern
                        )));
                    }
                    out.push('[');
                    out.push_str(&class);
                    out.push(']');
                }
                other => out.push_str(&regex::escape(&other.to_string())),
            }
        }

        out.push('$');
        let regex = Regex::new(&out).map_err(|e| {
            GatewayError::invalid_request(format!("Invalid pattern '{}': {}", pattern, e))
        })?;
        Ok(Self { regex })
    }

    pub fn matches(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }
}

/// Escape glob metacharacters so `prefix` is matched literally
pub fn escape_glob(prefix: &str) -> String {
    let mut out = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
