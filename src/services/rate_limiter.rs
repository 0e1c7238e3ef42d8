//! Per-IP request rate limiter
//!
//! Sliding window: a client may make `max_requests` requests within any
//! `window`. Rejected requests are not counted.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

/// Outcome of a single rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: usize,
    pub remaining: usize,
    /// Seconds until the oldest counted request leaves the window
    pub reset_after_secs: u64,
}

pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    hits: Arc<RwLock<HashMap<IpAddr, Vec<DateTime<Utc>>>>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::seconds(window_secs as i64),
            hits: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn window_secs(&self) -> u64 {
        self.window.num_seconds().max(0) as u64
    }

    /// Count a request from `ip` unless it is over the limit
    pub async fn check(&self, ip: IpAddr) -> RateLimitDecision {
        self.check_at(ip, Utc::now()).await
    }

    async fn check_at(&self, ip: IpAddr, now: DateTime<Utc>) -> RateLimitDecision {
        let cutoff = now - self.window;
        let mut hits = self.hits.write().await;
        let times = hits.entry(ip).or_default();
        times.retain(|time| *time > cutoff);

        let allowed = times.len() < self.max_requests;
        if allowed {
            times.push(now);
        }

        let reset_after_secs = times
            .first()
            .map(|oldest| (*oldest + self.window - now).num_seconds().max(0) as u64)
            .unwrap_or_else(|| self.window_secs());

        RateLimitDecision {
            allowed,
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(times.len()),
            reset_after_secs,
        }
    }

    /// Drop clients with no requests left in the window
    pub async fn cleanup(&self) {
        let cutoff = Utc::now() - self.window;
        let mut hits = self.hits.write().await;
        hits.retain(|_, times| {
            times.retain(|time| *time > cutoff);
            !times.is_empty()
        });
    }

    #[cfg(test)]
    async fn tracked_clients(&self) -> usize {
        self.hits.read().await.len()
    }
}
