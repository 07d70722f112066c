//! Composite cache keys
//!
//! `prefix:operation[:segment...][:name=value...][:+flag...]`
//!
//! Segments keep their insertion order so that prefix invalidation can target
//! them (`recipes:search:pasta:` covers every page). Parameters and flags are
//! sorted, and every value is normalised, so semantically identical inputs
//! produce the same key.

use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Values longer than this are replaced by a digest
const MAX_VALUE_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    prefix: String,
    operation: String,
    segments: Vec<String>,
    params: BTreeMap<String, String>,
    flags: BTreeSet<String>,
}

impl CacheKey {
    pub fn new(prefix: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            operation: operation.into(),
            segments: Vec::new(),
            params: BTreeMap::new(),
            flags: BTreeSet::new(),
        }
    }

    /// Positional component placed directly after the operation
    pub fn segment(mut self, value: impl AsRef<str>) -> Self {
        self.segments.push(encode_value(value.as_ref()));
        self
    }

    pub fn param(mut self, name: &str, value: impl fmt::Display) -> Self {
        self.params
            .insert(name.to_string(), encode_value(&value.to_string()));
        self
    }

    /// Parameter that is omitted entirely when absent
    pub fn param_opt<V: fmt::Display>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.param(name, value),
            None => self,
        }
    }

    pub fn flag(mut self, flag: &str) -> Self {
        self.flags.insert(encode_value(flag));
        self
    }

    /// The key up to and including its segments, with a trailing separator
    pub fn scope_prefix(&self) -> String {
        let mut out = format!("{}:{}:", self.prefix, self.operation);
        for segment in &self.segments {
            out.push_str(segment);
            out.push(':');
        }
        out
    }

    pub fn build(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.prefix, self.operation)?;
        for segment in &self.segments {
            write!(f, ":{}", segment)?;
        }
        for (name, value) in &self.params {
            write!(f, ":{}={}", name, value)?;
        }
        for flag in &self.flags {
            write!(f, ":+{}", flag)?;
        }
        Ok(())
    }
}

/// Trim, lowercase and collapse internal whitespace
pub fn normalize_value(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn encode_value(value: &str) -> String {
    let normalized = normalize_value(value);
    if normalized.len() > MAX_VALUE_LEN {
        let digest = Sha256::digest(normalized.as_bytes());
        return format!("#{}", &hex::encode(digest)[..32]);
    }
    // Separators and markers inside values would let two inputs collide
    normalized
        .replace('%', "%25")
        .replace(':', "%3A")
        .replace('=', "%3D")
        .replace('+', "%2B")
        .replace('#', "%23")
}
