//! Credential usage records

use crate::utils::logging::mask_secret;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Usage of one pool member since its last reset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialUsage {
    pub credential: String,
    pub used: u32,
    pub limit: u32,
    pub last_used: Option<DateTime<Utc>>,
    /// UTC day the counter belongs to, tracked for daily windows
    pub epoch: NaiveDate,
}

impl CredentialUsage {
    pub fn new(credential: impl Into<String>, limit: u32, epoch: NaiveDate) -> Self {
        Self {
            credential: credential.into(),
            used: 0,
            limit,
            last_used: None,
            epoch,
        }
    }

    pub fn is_available(&self) -> bool {
        self.used < self.limit
    }

    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.used)
    }

    pub fn masked(&self) -> String {
        mask_secret(&self.credential)
    }

    pub(crate) fn reset(&mut self, epoch: NaiveDate) {
        self.used = 0;
        self.epoch = epoch;
    }
}

/// Per-credential snapshot safe to log or return to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialStats {
    pub credential: String,
    pub used: u32,
    pub limit: u32,
    pub remaining: u32,
    pub exhausted: bool,
    pub last_used: Option<DateTime<Utc>>,
}

impl From<&CredentialUsage> for CredentialStats {
    fn from(usage: &CredentialUsage) -> Self {
        Self {
            credential: usage.masked(),
            used: usage.used,
            limit: usage.limit,
            remaining: usage.remaining(),
            exhausted: !usage.is_available(),
            last_used: usage.last_used,
        }
    }
}
