//! Process-lifetime admission counter.
//!
//! Every gated recorder shares one [`AdmissionCounter`]. Each record attempt
//! bumps the counter exactly once; the first `ceiling` attempts (in increment
//! order) are admitted, everything after is rejected for the rest of the
//! counter's lifetime.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use crate::config::QuotaConfig;

/// Maximum number of time series a single Cloud Monitoring write accepts.
pub const DEFAULT_MAX_RECORDS: u64 = 200;

static GLOBAL: OnceLock<Arc<AdmissionCounter>> = OnceLock::new();

/// Shared, lock-free admission counter with a fixed ceiling.
#[derive(Debug)]
pub struct AdmissionCounter {
    attempts: AtomicU64,
    ceiling: u64,
}

impl AdmissionCounter {
    /// Create a fresh counter starting at zero.
    pub fn new(ceiling: u64) -> Self {
        Self {
            attempts: AtomicU64::new(0),
            ceiling,
        }
    }

    /// Create a counter from quota configuration.
    pub fn from_config(config: &QuotaConfig) -> Self {
        Self::new(config.max_records)
    }

    /// Count one record attempt and decide whether it is admitted.
    ///
    /// The counter keeps growing past the ceiling; a `u64` bumped once per
    /// nanosecond would take centuries to wrap.
    #[inline]
    pub fn try_admit(&self) -> bool {
        self.attempts.fetch_add(1, Ordering::Relaxed) < self.ceiling
    }

    /// Configured ceiling.
    pub fn ceiling(&self) -> u64 {
        self.ceiling
    }

    /// Number of record attempts seen so far, admitted or not.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    /// True once no further attempt can be admitted.
    pub fn is_exhausted(&self) -> bool {
        self.attempts() >= self.ceiling
    }

    /// Point-in-time view of the quota.
    pub fn status(&self) -> QuotaStatus {
        QuotaStatus::new(self.ceiling, self.attempts())
    }
}

impl Default for AdmissionCounter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RECORDS)
    }
}

/// Snapshot of an [`AdmissionCounter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaStatus {
    pub ceiling: u64,
    pub attempts: u64,
    pub admitted: u64,
    pub dropped: u64,
}

impl QuotaStatus {
    fn new(ceiling: u64, attempts: u64) -> Self {
        let admitted = attempts.min(ceiling);
        Self {
            ceiling,
            attempts,
            admitted,
            dropped: attempts - admitted,
        }
    }
}

/// The process-wide counter.
///
/// Initialised on first use from [`QuotaConfig::from_env`] and never reset.
pub fn global() -> Arc<AdmissionCounter> {
    GLOBAL
        .get_or_init(|| Arc::new(AdmissionCounter::from_config(&QuotaConfig::from_env())))
        .clone()
}
