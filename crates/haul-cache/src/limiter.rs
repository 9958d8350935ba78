//! Fixed-window rate limiting

use serde::Serialize;
use std::borrow::Cow;
use std::time::Duration;

use haul_cache_core::{CacheError, Clock, Result, duration_millis, now_millis, system_clock};
use haul_cache_storage::WindowStore;

/// Limit for one bucket: at most `max_requests` per `window`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    key: Cow<'static, str>,
    max_requests: u32,
    window: Duration,
}

impl RateLimitConfig {
    /// Lead form submissions: 3 per 5 minutes
    pub const LEAD_SUBMISSION: Self =
        Self::preset("lead_submission", 3, Duration::from_secs(5 * 60));

    /// Chat messages: 10 per minute
    pub const CHAT_MESSAGE: Self = Self::preset("chat_message", 10, Duration::from_secs(60));

    /// Outbound API calls: 50 per minute
    pub const API_REQUEST: Self = Self::preset("api_request", 50, Duration::from_secs(60));

    const fn preset(key: &'static str, max_requests: u32, window: Duration) -> Self {
        Self {
            key: Cow::Borrowed(key),
            max_requests,
            window,
        }
    }

    /// Create a limit for the bucket `key`
    ///
    /// Fails if `max_requests` or `window` is zero.
    pub fn new(key: impl Into<Cow<'static, str>>, max_requests: u32, window: Duration) -> Result<Self> {
        if max_requests == 0 {
            return Err(CacheError::InvalidConfig(
                "max_requests must be at least 1".to_string(),
            ));
        }
        if window.is_zero() {
            return Err(CacheError::InvalidConfig(
                "window must be longer than zero".to_string(),
            ));
        }

        Ok(Self {
            key: key.into(),
            max_requests,
            window,
        })
    }

    /// Bucket name; configs with the same key share one window
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Requests admitted per window
    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Length of one window
    pub fn window(&self) -> Duration {
        self.window
    }
}

/// Result of a [`RateLimitService::check`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitStatus {
    /// Whether the request may proceed
    pub allowed: bool,
    /// Requests left in the current window
    pub remaining: u32,
    /// Whole seconds until the window resets, rounded up
    pub reset_in: u64,
}

/// Fixed-window rate limiter
///
/// Each bucket key has one window. The first request opens a window of
/// `config.window()`; requests are admitted until `max_requests` is reached
/// and rejected until the window ends. A request exactly at the reset time
/// still counts against the old window.
///
/// Cloning creates a new handle to the SAME windows.
#[derive(Debug, Clone)]
pub struct RateLimitService {
    windows: WindowStore,
    clock: Clock,
}

impl Default for RateLimitService {
    fn default() -> Self {
        Self::with_clock(system_clock())
    }
}

impl RateLimitService {
    /// Create a limiter on the system clock
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a limiter reading time from `clock`
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            windows: WindowStore::new(),
            clock,
        }
    }

    /// Admit or reject one request against `config`
    pub fn is_allowed(&self, config: &RateLimitConfig) -> bool {
        let admission = self.windows.admit(
            config.key(),
            config.max_requests,
            config.window,
            now_millis(&self.clock),
        );

        if !admission.is_allowed() {
            tracing::debug!(
                target: "haul_cache",
                bucket = %config.key(),
                max_requests = config.max_requests,
                "Rate limit reached"
            );
        }
        admission.is_allowed()
    }

    /// Requests left in the current window without consuming one
    pub fn remaining_requests(&self, config: &RateLimitConfig) -> u32 {
        self.windows
            .remaining(config.key(), config.max_requests, now_millis(&self.clock))
    }

    /// Time until the bucket's window ends, zero without a window
    pub fn time_until_reset(&self, config: &RateLimitConfig) -> Duration {
        self.windows.until_reset(config.key(), now_millis(&self.clock))
    }

    /// Drop every window
    pub fn clear(&self) {
        self.windows.clear();
    }

    /// Admit one request and report the bucket's state afterwards
    pub fn check(&self, config: &RateLimitConfig) -> RateLimitStatus {
        let allowed = self.is_allowed(config);
        let remaining = self.remaining_requests(config);
        let reset_in = duration_millis(self.time_until_reset(config)).div_ceil(1000);

        RateLimitStatus {
            allowed,
            remaining,
            reset_in,
        }
    }

    /// Check a lead form submission (3 per 5 minutes)
    pub fn check_lead_submission(&self) -> RateLimitStatus {
        self.check(&RateLimitConfig::LEAD_SUBMISSION)
    }

    /// Check a chat message (10 per minute)
    pub fn check_chat_message(&self) -> RateLimitStatus {
        self.check(&RateLimitConfig::CHAT_MESSAGE)
    }

    /// Check an API call (50 per minute)
    pub fn check_api_request(&self) -> RateLimitStatus {
        self.check(&RateLimitConfig::API_REQUEST)
    }
}
