use axum::http::HeaderMap;
use dashmap::DashMap;
use std::time::{Duration, Instant};

use crate::config::AppConfig;

/// Tracked keys above which expired windows are dropped on the next check.
const SWEEP_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

/// RateLimiter
///
/// Fixed-window counter per key, kept in process memory. A window opens on the
/// first hit for a key and admits `max` hits until it is `window` old. State is
/// lost on restart and not shared between replicas.
#[derive(Debug)]
pub struct RateLimiter {
    max: u32,
    window: Duration,
    hits: DashMap<String, Window>,
}

impl RateLimiter {
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            max,
            window,
            hits: DashMap::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.contact_rate_limit_max,
            Duration::from_secs(config.contact_rate_limit_window_secs),
        )
    }

    pub fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    /// Records one hit for `key` at `now` and reports whether it is admitted.
    pub fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        if self.hits.len() > SWEEP_THRESHOLD {
            self.sweep(now);
        }

        let mut entry = self.hits.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.saturating_duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        if entry.count >= self.max {
            let retry_after = self
                .window
                .saturating_sub(now.saturating_duration_since(entry.started));
            return RateDecision::Limited { retry_after };
        }

        entry.count += 1;
        RateDecision::Allowed {
            remaining: self.max - entry.count,
        }
    }

    /// Drops every window that has fully elapsed.
    pub fn sweep(&self, now: Instant) {
        let window = self.window;
        self.hits
            .retain(|_, w| now.saturating_duration_since(w.started) < window);
    }

    pub fn tracked_keys(&self) -> usize {
        self.hits.len()
    }
}

/// client_ip
///
/// Key for the contact-form limiter: the first `x-forwarded-for` hop, then
/// `x-real-ip`, else the shared `anonymous` bucket.
pub fn client_ip(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .unwrap_or("anonymous")
        .to_string()
}
