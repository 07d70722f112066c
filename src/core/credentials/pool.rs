//! Credential discovery

use std::collections::HashSet;
use tracing::debug;

/// Ordered set of interchangeable credentials; order is priority
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialPool {
    credentials: Vec<String>,
}

impl CredentialPool {
    /// Build a pool from explicit values, dropping blanks and duplicates
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let credentials = values
            .into_iter()
            .map(|v| v.into().trim().to_string())
            .filter(|v| !v.is_empty())
            .filter(|v| seen.insert(v.clone()))
            .collect();
        Self { credentials }
    }

    /// Read `PREFIX`, then `PREFIX_2`, `PREFIX_3`, ... through `lookup`.
    ///
    /// Discovery stops at the first missing numbered successor. A missing or
    /// blank `PREFIX` does not stop discovery of `PREFIX_2`.
    pub fn discover<F>(prefix: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut values = Vec::new();
        if let Some(first) = lookup(prefix) {
            values.push(first);
        }
        for index in 2.. {
            match lookup(&format!("{}_{}", prefix, index)) {
                Some(value) => values.push(value),
                None => break,
            }
        }

        let pool = Self::from_values(values);
        debug!("Discovered {} credentials under {}", pool.len(), prefix);
        pool
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    pub fn contains(&self, credential: &str) -> bool {
        self.credentials.iter().any(|c| c == credential)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.credentials.iter().map(String::as_str)
    }

    pub fn first(&self) -> Option<&str> {
        self.credentials.first().map(String::as_str)
    }
}
