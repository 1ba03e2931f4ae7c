//! Resilient request wrapper
//!
//! Every remote call goes through `RetryManager`: one attempt, then up to
//! `retry_count` more after a fixed pause. When all attempts fail the caller
//! gets an empty result (an empty page with `total_pages = 1`, or no
//! keywords) and the failure reason is recorded in the manager's history and
//! the log. Nothing past this boundary ever sees a `FetchError`.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::{CatalogPage, CatalogQuery, CatalogSource, FetchError, ItemId, KeywordSource};
use crate::infrastructure::config::HarvestConfig;

/// Bounded, fixed-delay retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub retry_count: u32,
    /// Pause before each retry (never before the first attempt)
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_harvest_config(&HarvestConfig::default())
    }
}

impl RetryPolicy {
    pub const fn from_harvest_config(config: &HarvestConfig) -> Self {
        Self {
            retry_count: config.retry_count,
            retry_delay: config.retry_delay(),
        }
    }

    pub const fn no_delay(retry_count: u32) -> Self {
        Self {
            retry_count,
            retry_delay: Duration::ZERO,
        }
    }
}

/// A request that failed on every attempt
#[derive(Debug, Clone)]
pub struct FailureRecord {
    pub operation: String,
    pub error: FetchError,
    pub attempts: u32,
    pub failed_at: DateTime<Utc>,
}

/// Retry statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct RetryStats {
    /// Logical requests issued
    pub requests: u64,
    /// Extra attempts made after a failure
    pub retries: u64,
    /// Requests that succeeded only after retrying
    pub recovered: u64,
    /// Requests downgraded to an empty result
    pub failed: u64,
}

impl RetryStats {
    /// Counter growth since an earlier snapshot
    pub const fn since(self, earlier: Self) -> Self {
        Self {
            requests: self.requests.saturating_sub(earlier.requests),
            retries: self.retries.saturating_sub(earlier.retries),
            recovered: self.recovered.saturating_sub(earlier.recovered),
            failed: self.failed.saturating_sub(earlier.failed),
        }
    }
}

pub struct RetryManager {
    policy: RetryPolicy,
    requests: AtomicU64,
    retries: AtomicU64,
    recovered: AtomicU64,
    failed: AtomicU64,
    failure_history: Mutex<Vec<FailureRecord>>,
}

impl RetryManager {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            requests: AtomicU64::new(0),
            retries: AtomicU64::new(0),
            recovered: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            failure_history: Mutex::new(Vec::new()),
        }
    }

    pub const fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Run `operation` under the retry policy, returning the last error when
    /// every attempt failed.
    pub async fn execute<T, F, Fut>(&self, operation: &str, mut attempt: F) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        self.requests.fetch_add(1, Ordering::Relaxed);
        let max_attempts = self.policy.retry_count + 1;
        let mut attempt_no = 1;

        loop {
            match attempt().await {
                Ok(value) => {
                    if attempt_no > 1 {
                        self.recovered.fetch_add(1, Ordering::Relaxed);
                        debug!("✅ {} succeeded on attempt {}", operation, attempt_no);
                    }
                    return Ok(value);
                }
                Err(error) if attempt_no < max_attempts => {
                    debug!(
                        kind = error.kind(),
                        "🔄 {} failed on attempt {}: {}; retrying in {:?}",
                        operation,
                        attempt_no,
                        error,
                        self.policy.retry_delay
                    );
                    self.retries.fetch_add(1, Ordering::Relaxed);
                    if !self.policy.retry_delay.is_zero() {
                        tokio::time::sleep(self.policy.retry_delay).await;
                    }
                    attempt_no += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// Run `operation`, downgrading a final failure to `fallback()`.
    pub async fn execute_or_else<T, F, Fut>(
        &self,
        operation: &str,
        attempt: F,
        fallback: impl FnOnce() -> T,
    ) -> T
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        match self.execute(operation, attempt).await {
            Ok(value) => value,
            Err(error) => {
                self.record_failure(operation, error).await;
                fallback()
            }
        }
    }

    /// One catalog page, or the empty sentinel page on failure
    pub async fn fetch_page<S>(&self, source: &S, query: &CatalogQuery, page: u32) -> CatalogPage
    where
        S: CatalogSource + ?Sized,
    {
        let operation = format!("page {} of '{}'", page, query.partition.label);
        self.execute_or_else(&operation, || source.fetch_page(query, page), CatalogPage::empty)
            .await
    }

    /// Keywords of one item, or none on failure
    pub async fn fetch_keywords<K>(&self, source: &K, id: &ItemId) -> Vec<String>
    where
        K: KeywordSource + ?Sized,
    {
        let operation = format!("keywords of item {id}");
        self.execute_or_else(&operation, || source.fetch_keywords(id), Vec::new)
            .await
    }

    async fn record_failure(&self, operation: &str, error: FetchError) {
        let attempts = self.policy.retry_count + 1;
        warn!(
            kind = error.kind(),
            "❌ {} failed after {} attempt(s), continuing with empty result: {}",
            operation,
            attempts,
            error
        );
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.failure_history.lock().await.push(FailureRecord {
            operation: operation.to_string(),
            error,
            attempts,
            failed_at: Utc::now(),
        });
    }

    /// Snapshot of the counters
    pub fn get_retry_stats(&self) -> RetryStats {
        RetryStats {
            requests: self.requests.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            recovered: self.recovered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }

    /// Requests that ended in the empty fallback, oldest first
    pub async fn failures(&self) -> Vec<FailureRecord> {
        self.failure_history.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[tokio::test]
    async fn success_on_first_attempt_uses_no_retry() {
        let manager = RetryManager::new(RetryPolicy::no_delay(1));
        let value = manager
            .execute("op", || async { Ok::<_, FetchError>(5) })
            .await
            .unwrap();
        assert_eq!(value, 5);
        assert_eq!(
            manager.get_retry_stats(),
            RetryStats { requests: 1, retries: 0, recovered: 0, failed: 0 }
        );
    }

    #[tokio::test]
    async fn single_failure_is_recovered_by_retry() {
        let calls = AtomicU32::new(0);
        let manager = RetryManager::new(RetryPolicy::no_delay(1));
        let value = manager
            .execute("op", || async {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(FetchError::status(502, "u"))
                } else {
                    Ok(7)
                }
            })
            .await
            .unwrap();
        assert_eq!(value, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let stats = manager.get_retry_stats();
        assert_eq!(stats.retries, 1);
        assert_eq!(stats.recovered, 1);
    }

    #[tokio::test]
    async fn exactly_one_retry_then_fallback() {
        let calls = AtomicU32::new(0);
        let manager = RetryManager::new(RetryPolicy::no_delay(1));
        let value = manager
            .execute_or_else(
                "op",
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<u32, _>(FetchError::Timeout { url: "u".into() })
                },
                || 0,
            )
            .await;
        assert_eq!(value, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let failures = manager.failures().await;
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].attempts, 2);
        assert_eq!(failures[0].error.kind(), "timeout");
        assert_eq!(manager.get_retry_stats().failed, 1);
    }

    #[test]
    fn stats_delta_between_snapshots() {
        let before = RetryStats { requests: 3, retries: 1, recovered: 1, failed: 0 };
        let after = RetryStats { requests: 10, retries: 4, recovered: 2, failed: 2 };
        assert_eq!(
            after.since(before),
            RetryStats { requests: 7, retries: 3, recovered: 1, failed: 2 }
        );
    }

    #[tokio::test]
    async fn retry_waits_for_configured_delay() {
        let manager = RetryManager::new(RetryPolicy {
            retry_count: 1,
            retry_delay: Duration::from_millis(30),
        });
        let started = std::time::Instant::now();
        let _ = manager
            .execute("op", || async { Err::<(), _>(FetchError::status(500, "u")) })
            .await;
        assert!(started.elapsed() >= Duration::from_millis(30));
    }
}
