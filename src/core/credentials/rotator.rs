//! Credential rotator
//!
//! Selection walks the pool in priority order and hands out the first key
//! whose usage is below its limit. When every key is spent, all counters are
//! zeroed and the first key is returned: availability wins over strict quota
//! adherence. Counters live in process memory only.

use super::clock::{Clock, SystemClock};
use super::pool::CredentialPool;
use super::types::{CredentialStats, CredentialUsage};
use crate::config::{CredentialConfig, QuotaWindow};
use crate::core::providers::ProviderError;
use crate::utils::logging::mask_secret;
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug)]
struct RotatorState {
    limit: u32,
    usage: HashMap<String, CredentialUsage>,
    resets: u64,
}

/// Hands out credentials from a pool without exceeding per-key quotas
#[derive(Debug)]
pub struct CredentialRotator {
    name: String,
    pool: CredentialPool,
    window: QuotaWindow,
    clock: Arc<dyn Clock>,
    state: Mutex<RotatorState>,
}

impl CredentialRotator {
    pub fn new(name: impl Into<String>, pool: CredentialPool, daily_limit: u32) -> Self {
        Self {
            name: name.into(),
            pool,
            window: QuotaWindow::Lifetime,
            clock: Arc::new(SystemClock),
            state: Mutex::new(RotatorState {
                limit: daily_limit,
                usage: HashMap::new(),
                resets: 0,
            }),
        }
    }

    /// Pool discovered from the environment described by `config`
    pub fn from_config<F>(name: impl Into<String>, config: &CredentialConfig, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let pool = CredentialPool::discover(&config.env_prefix, lookup);
        Self::new(name, pool, config.daily_limit).with_window(config.window)
    }

    pub fn with_window(mut self, window: QuotaWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pool(&self) -> &CredentialPool {
        &self.pool
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Number of wholesale resets performed so far
    pub fn reset_count(&self) -> u64 {
        self.state.lock().resets
    }

    fn today(&self) -> NaiveDate {
        self.clock.now().date_naive()
    }

    /// Fetch (creating lazily) the record for `credential`, rolling its
    /// counter over if a daily window has passed
    fn record<'a>(
        state: &'a mut RotatorState,
        credential: &str,
        window: QuotaWindow,
        today: NaiveDate,
    ) -> &'a mut CredentialUsage {
        let limit = state.limit;
        let record = state
            .usage
            .entry(credential.to_string())
            .or_insert_with(|| CredentialUsage::new(credential, limit, today));

        if window == QuotaWindow::Daily && record.epoch != today {
            debug!(
                "Quota day rolled over for {} ({} -> {})",
                record.masked(),
                record.epoch,
                today
            );
            record.reset(today);
        }
        record
    }

    /// First credential in priority order with quota left.
    ///
    /// When the whole pool is exhausted every counter is reset and the first
    /// credential is returned. `None` only for an empty pool.
    pub fn select_credential(&self) -> Option<String> {
        let first = self.pool.first()?;
        let today = self.today();
        let mut state = self.state.lock();

        for credential in self.pool.iter() {
            if Self::record(&mut state, credential, self.window, today).is_available() {
                return Some(credential.to_string());
            }
        }

        warn!(
            "All {} {} credentials exhausted, resetting usage counters",
            self.pool.len(),
            self.name
        );
        for record in state.usage.values_mut() {
            record.reset(today);
        }
        state.resets += 1;
        Some(first.to_string())
    }

    /// Whether any credential has quota left, without triggering a reset
    pub fn has_available(&self) -> bool {
        let today = self.today();
        let mut state = self.state.lock();
        self.pool
            .iter()
            .any(|c| Self::record(&mut state, c, self.window, today).is_available())
    }

    /// Count one successful call against `credential`
    pub fn record_use(&self, credential: &str) {
        if !self.pool.contains(credential) {
            warn!(
                "Ignoring usage for unknown {} credential {}",
                self.name,
                mask_secret(credential)
            );
            return;
        }
        let now = self.clock.now();
        let mut state = self.state.lock();
        let record = Self::record(&mut state, credential, self.window, now.date_naive());
        record.used = record.used.saturating_add(1);
        record.last_used = Some(now);
    }

    /// Take `credential` out of rotation after an explicit quota rejection.
    ///
    /// Usage is set to the limit rather than flagged separately, so raising
    /// the limit later makes the credential eligible again.
    pub fn record_exhausted(&self, credential: &str) {
        if !self.pool.contains(credential) {
            return;
        }
        let now = self.clock.now();
        let mut state = self.state.lock();
        let record = Self::record(&mut state, credential, self.window, now.date_naive());
        record.used = record.limit;
        record.last_used = Some(now);
        warn!(
            "{} credential {} marked exhausted",
            self.name,
            record.masked()
        );
    }

    /// Change the limit of every credential, existing records included
    pub fn set_daily_limit(&self, limit: u32) {
        let mut state = self.state.lock();
        state.limit = limit;
        for record in state.usage.values_mut() {
            record.limit = limit;
        }
    }

    /// Usage per credential in pool order
    pub fn stats(&self) -> Vec<CredentialStats> {
        let today = self.today();
        let mut state = self.state.lock();
        self.pool
            .iter()
            .map(|c| CredentialStats::from(&*Self::record(&mut state, c, self.window, today)))
            .collect()
    }

    /// Run `call` with a selected credential, bookkeeping the outcome.
    ///
    /// A quota rejection marks the credential exhausted and retries with the
    /// next credential that still has quota. When none is left the
    /// rejection is returned. Other errors are returned as-is.
    pub async fn call_with_rotation<T, F, Fut>(&self, mut call: F) -> Result<T, ProviderError>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut last_error = None;

        for _ in 0..self.pool.len() {
            let Some(credential) = self.select_credential() else {
                break;
            };

            match call(credential.clone()).await {
                Ok(value) => {
                    self.record_use(&credential);
                    return Ok(value);
                }
                Err(e) if e.is_quota_rejection() => {
                    self.record_exhausted(&credential);
                    if !self.has_available() {
                        return Err(e);
                    }
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| ProviderError::not_configured(&self.name)))
    }
}
