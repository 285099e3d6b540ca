//! Per-caller sliding-window rate limiter.
//!
//! Each caller identity owns one window: the ordered instants of its admitted
//! requests within the trailing `window` duration. A request is admitted when
//! fewer than `max_requests` instants remain after evicting expired ones.
//!
//! # Locking
//!
//! The identity map sits behind an `RwLock` that is only write-locked to
//! create or evict a window. Each window has its own `Mutex`, so callers with
//! different identities never contend, and two concurrent requests for the
//! same identity are serialized on that identity's window alone.
//!
//! # Eviction
//!
//! A window with no instants younger than `window` is idle. Idle windows are
//! swept every [`SWEEP_INTERVAL`] checks and by [`RateLimiter::evict_idle`],
//! which servers also run on a timer.

use crate::error::GatewayError;
use crate::types::CallerIdentity;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::{Duration, Instant};

/// Checks between opportunistic idle-window sweeps
pub const SWEEP_INTERVAL: u64 = 256;

/// Source of the current instant, replaceable in tests
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for deterministic tests
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self { now: Arc::new(Mutex::new(Instant::now())) }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = lock(&self.now);
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *lock(&self.now)
    }
}

/// Admission thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: usize,
    pub window: Duration,
}

impl RateLimitConfig {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self { max_requests, window }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { max_requests: 100, window: Duration::from_secs(60) }
    }
}

/// Outcome of one admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed { remaining: usize },
    Limited { retry_after: Duration },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }

    /// Convert a denial into the gateway error, rounding the wait up to whole seconds
    pub fn into_result(self) -> Result<usize, GatewayError> {
        match self {
            RateLimitDecision::Allowed { remaining } => Ok(remaining),
            RateLimitDecision::Limited { retry_after } => {
                let mut secs = retry_after.as_secs();
                if retry_after.subsec_nanos() > 0 || secs == 0 {
                    secs += 1;
                }
                Err(GatewayError::RateLimited { retry_after_secs: secs })
            }
        }
    }
}

#[derive(Debug, Default)]
struct RateWindow {
    timestamps: VecDeque<Instant>,
}

impl RateWindow {
    fn evict_expired(&mut self, now: Instant, window: Duration) {
        while let Some(oldest) = self.timestamps.front() {
            if now.saturating_duration_since(*oldest) >= window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    fn is_idle(&self, now: Instant, window: Duration) -> bool {
        self.timestamps
            .back()
            .map_or(true, |newest| now.saturating_duration_since(*newest) >= window)
    }
}

/// Sliding-window limiter keyed by caller identity
pub struct RateLimiter {
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
    windows: RwLock<HashMap<CallerIdentity, Arc<Mutex<RateWindow>>>>,
    checks: AtomicU64,
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .field("tracked_identities", &self.tracked_identities())
            .finish()
    }
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock, windows: RwLock::new(HashMap::new()), checks: AtomicU64::new(0) }
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Admit or deny one request; admitted requests are recorded
    pub fn check(&self, identity: &CallerIdentity) -> RateLimitDecision {
        if self.checks.fetch_add(1, Ordering::Relaxed) % SWEEP_INTERVAL == SWEEP_INTERVAL - 1 {
            self.evict_idle();
        }

        let window = self.window_for(identity);
        let mut window = lock(&window);
        let now = self.clock.now();
        window.evict_expired(now, self.config.window);

        if window.timestamps.len() < self.config.max_requests {
            window.timestamps.push_back(now);
            RateLimitDecision::Allowed {
                remaining: self.config.max_requests - window.timestamps.len(),
            }
        } else {
            let retry_after = window
                .timestamps
                .front()
                .map(|oldest| self.config.window.saturating_sub(now.saturating_duration_since(*oldest)))
                .unwrap_or(self.config.window);
            tracing::debug!(
                identity = %identity.short(),
                retry_after_ms = retry_after.as_millis() as u64,
                "rate limit reached"
            );
            RateLimitDecision::Limited { retry_after }
        }
    }

    pub fn is_allowed(&self, identity: &CallerIdentity) -> bool {
        self.check(identity).is_allowed()
    }

    /// Drop windows that saw no request for a full window. Returns how many were removed.
    pub fn evict_idle(&self) -> usize {
        let now = self.clock.now();
        let mut windows = self.windows.write().unwrap_or_else(|e| e.into_inner());
        let before = windows.len();
        // A window still referenced elsewhere belongs to an in-flight check.
        windows.retain(|_, window| {
            Arc::strong_count(window) > 1 || !lock(window).is_idle(now, self.config.window)
        });
        let removed = before - windows.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = windows.len(), "evicted idle rate windows");
        }
        removed
    }

    pub fn tracked_identities(&self) -> usize {
        self.windows.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn window_for(&self, identity: &CallerIdentity) -> Arc<Mutex<RateWindow>> {
        {
            let windows = self.windows.read().unwrap_or_else(|e| e.into_inner());
            if let Some(window) = windows.get(identity) {
                return window.clone();
            }
        }

        let mut windows = self.windows.write().unwrap_or_else(|e| e.into_inner());
        windows.entry(identity.clone()).or_default().clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
