//! Gate Module
//!
//! Shared service object combining the TTL cache and the rate limiter in
//! front of outbound third-party API calls.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, TtlCache};
use crate::config::Config;
use crate::error::Result;
use crate::limiter::{Admission, LimiterStats, RateLimiter, WindowStatus, DEFAULT_IDENTITY};

/// Combined statistics for both halves of the gate.
#[derive(Debug, Clone, Serialize)]
pub struct GateStats {
    pub cache: CacheStats,
    pub limiter: LimiterStats,
}

/// What one sweep removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub expired_entries: usize,
    pub idle_identities: usize,
}

// == Api Gate ==
/// Cache and rate limiter shared by every outbound call site.
///
/// Cloning is cheap and every clone sees the same state. Construct one at
/// startup and hand clones to call sites; call [`ApiGate::reset`] between
/// tests.
///
/// Fetches are single-flight per cache key: concurrent misses on one key
/// issue one outbound call and the others read its cached result.
#[derive(Debug)]
pub struct ApiGate<T> {
    cache: Arc<RwLock<TtlCache<T>>>,
    limiter: Arc<Mutex<RateLimiter>>,
    /// Per-key locks of fetches in progress
    inflight: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl<T> Clone for ApiGate<T> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            limiter: Arc::clone(&self.limiter),
            inflight: Arc::clone(&self.inflight),
        }
    }
}

impl<T: Clone + Send + Sync> ApiGate<T> {
    // == Constructors ==
    pub fn new(cache: TtlCache<T>, limiter: RateLimiter) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
            limiter: Arc::new(Mutex::new(limiter)),
            inflight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Builds a gate from validated configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let cache = TtlCache::new(config.cache_ttl(), config.cache_max_entries)?;
        let limiter = RateLimiter::new(config.max_requests_per_window, config.rate_window())?
            .with_policy(config.wait_policy()?, config.poll_interval())?
            .with_idle_windows(config.idle_windows)?;

        Ok(Self::new(cache, limiter))
    }

    // == Cache Operations ==
    /// Cached value for `key`, if present and fresh.
    pub async fn get_cached(&self, key: &str) -> Option<T> {
        // Write lock: a stale hit is evicted on read
        self.cache.write().await.get(key)
    }

    pub async fn store(&self, key: impl Into<String>, value: T) {
        self.cache.write().await.set(key, value);
    }

    pub async fn should_refresh(&self, key: &str) -> bool {
        self.cache.read().await.should_refresh(key)
    }

    /// Remaining lifetime of a fresh entry.
    pub async fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        self.cache.read().await.ttl_remaining(key)
    }

    pub async fn invalidate(&self, key: &str) -> bool {
        self.cache.write().await.remove(key)
    }

    /// Drops every cached value, returning how many there were.
    pub async fn clear_cache(&self) -> usize {
        let removed = self.cache.write().await.clear();
        info!(removed, "cache cleared");
        removed
    }

    // == Limiter Operations ==
    pub async fn can_make_request(&self, identity: Option<&str>) -> bool {
        self.limiter.lock().await.can_make_request(identity)
    }

    pub async fn record_request(&self, identity: Option<&str>) {
        self.limiter.lock().await.record_request(identity);
    }

    /// Non-blocking admission: records and grants, or reports the wait.
    pub async fn try_admit(&self, identity: Option<&str>) -> Admission {
        self.limiter.lock().await.try_admit(identity)
    }

    /// [`ApiGate::try_admit`] plus the resulting window, under one lock.
    pub async fn admit(&self, identity: Option<&str>) -> (Admission, WindowStatus) {
        self.limiter.lock().await.try_admit_with_status(identity)
    }

    pub async fn window_status(&self, identity: Option<&str>) -> WindowStatus {
        self.limiter.lock().await.status(identity)
    }

    // == Wait For Rate Limit ==
    /// Suspends until the identity is admitted. On return the request has
    /// been counted against the window.
    ///
    /// The lock is released while sleeping. Each retry is a fresh atomic
    /// admission, so concurrent waiters on one identity cannot overshoot.
    pub async fn wait_for_rate_limit(&self, identity: Option<&str>) {
        let name = identity.unwrap_or(DEFAULT_IDENTITY);
        let mut waited = false;
        loop {
            let delay = {
                let mut limiter = self.limiter.lock().await;
                match limiter.try_admit(identity) {
                    Admission::Granted => {
                        if waited {
                            debug!(identity = name, "admitted after wait");
                        }
                        return;
                    }
                    Admission::Throttled { retry_after } => limiter.next_delay(retry_after),
                }
            };

            if !waited {
                warn!(
                    identity = name,
                    delay_ms = delay.as_millis() as u64,
                    "rate limit reached, waiting"
                );
                waited = true;
            }
            tokio::time::sleep(delay).await;
        }
    }

    // == Fetch ==
    /// Cache-first gated call.
    ///
    /// Returns the cached value for `key` when fresh. Otherwise waits for
    /// admission, runs `call`, and caches a successful result. Errors from
    /// `call` are returned untouched and nothing is cached.
    ///
    /// Callers missing on the same key queue behind the one already calling
    /// and are served from its result. A failed call is not shared: the next
    /// caller in line makes its own attempt.
    pub async fn fetch<F, Fut, E>(
        &self,
        identity: Option<&str>,
        key: &str,
        call: F,
    ) -> std::result::Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        let flight = self.join_flight(key).await;
        let result = {
            let _turn = flight.lock().await;
            match self.get_cached(key).await {
                Some(value) => {
                    debug!(key, "served from cache");
                    Ok(value)
                }
                None => self.call_and_store(identity, key, call).await,
            }
        };
        self.leave_flight(key, flight).await;
        result
    }

    /// Like [`ApiGate::fetch`] but always performs the call. Still queues
    /// behind any fetch in progress on `key`.
    pub async fn fetch_fresh<F, Fut, E>(
        &self,
        identity: Option<&str>,
        key: &str,
        call: F,
    ) -> std::result::Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        let flight = self.join_flight(key).await;
        let result = {
            let _turn = flight.lock().await;
            self.call_and_store(identity, key, call).await
        };
        self.leave_flight(key, flight).await;
        result
    }

    async fn call_and_store<F, Fut, E>(
        &self,
        identity: Option<&str>,
        key: &str,
        call: F,
    ) -> std::result::Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        self.wait_for_rate_limit(identity).await;

        let value = call().await?;
        self.store(key, value.clone()).await;
        debug!(key, "cache filled");
        Ok(value)
    }

    // == Single Flight ==
    /// Lock shared by every fetch currently interested in `key`.
    async fn join_flight(&self, key: &str) -> Arc<Mutex<()>> {
        let mut inflight = self.inflight.lock().await;
        Arc::clone(inflight.entry(key.to_string()).or_default())
    }

    /// Drops our handle and forgets the key once nobody else holds one.
    ///
    /// Handles are cloned and released under the map lock, so the strong
    /// count read here is exact. A fetch cancelled mid-flight leaves its
    /// entry behind until the next fetch on that key completes.
    async fn leave_flight(&self, key: &str, flight: Arc<Mutex<()>>) {
        let mut inflight = self.inflight.lock().await;
        drop(flight);
        if inflight
            .get(key)
            .is_some_and(|shared| Arc::strong_count(shared) == 1)
        {
            inflight.remove(key);
        }
    }

    // == Maintenance ==
    /// One cleanup pass over both structures.
    pub async fn sweep(&self) -> SweepReport {
        let expired_entries = self.cache.write().await.cleanup_expired();
        let idle_identities = self.limiter.lock().await.cleanup_idle();
        SweepReport {
            expired_entries,
            idle_identities,
        }
    }

    /// Clears cache, windows and statistics.
    pub async fn reset(&self) {
        self.cache.write().await.reset();
        self.limiter.lock().await.reset();
    }

    pub async fn stats(&self) -> GateStats {
        GateStats {
            cache: self.cache.read().await.stats(),
            limiter: self.limiter.lock().await.stats(),
        }
    }
}
