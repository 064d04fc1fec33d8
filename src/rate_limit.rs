// Per-client, per-route fixed-window rate limiting.
//
// Each (identity, route) pair owns one counter that resets `window` after the
// first request of its window, so a client can burst up to 2 x limit across a
// window boundary. State is process-local; replicas each enforce their own quota.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::time::{Duration, Instant};

use crate::error::ConfigError;

const MIN_WINDOW: Duration = Duration::from_millis(1);

// One eviction pass frees max_entries / EVICTION_BATCH_DIVISOR slots (at least one)
const EVICTION_BATCH_DIVISOR: usize = 10;

// Validated request quota for one route group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    limit: u32,
    window: Duration,
}

impl Quota {
    pub fn new(limit: u32, window: Duration) -> Result<Self, ConfigError> {
        if limit == 0 {
            return Err(ConfigError::ZeroLimit);
        }
        if window.is_zero() {
            return Err(ConfigError::ZeroWindow);
        }
        Ok(Self { limit, window })
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

// Rate limit entry - tracks requests per identity/route key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub count: u32,
    pub reset_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub remaining: u32, // before the next call consumes one
    pub reset_at: Instant,
}

// Decision plus the quota left after it, read under one entry lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    pub admitted: bool,
    pub info: RateLimitInfo,
}

// In-memory fixed-window counter table.
// Read-modify-write on one key runs under the DashMap shard lock, so concurrent
// callers for the same key never admit more than `limit`.
// With max_entries > 0, a new key arriving at capacity sweeps expired entries and
// then evicts the soonest-expiring ones until a tenth of the table is free.
pub struct RateLimiter {
    entries: DashMap<String, RateLimitEntry>,
    max_entries: usize,
}

impl RateLimiter {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries,
        }
    }

    fn make_key(identity: &str, route: &str) -> String {
        format!("{}:{}", identity, route)
    }

    // Admit and count a request, or reject it without touching state
    pub fn check_and_consume(
        &self,
        identity: &str,
        route: &str,
        limit: u32,
        window: Duration,
    ) -> bool {
        self.consume_at(identity, route, limit, window, Instant::now())
            .admitted
    }

    pub fn check_and_consume_at(
        &self,
        identity: &str,
        route: &str,
        limit: u32,
        window: Duration,
        now: Instant,
    ) -> bool {
        self.consume_at(identity, route, limit, window, now).admitted
    }

    pub fn consume_at(
        &self,
        identity: &str,
        route: &str,
        limit: u32,
        window: Duration,
        now: Instant,
    ) -> Admission {
        let limit = limit.max(1);
        let window = window.max(MIN_WINDOW);
        let key = Self::make_key(identity, route);

        if !self.entries.contains_key(&key) {
            self.make_room(now);
        }

        let admit = |entry: &RateLimitEntry| Admission {
            admitted: true,
            info: RateLimitInfo {
                remaining: limit.saturating_sub(entry.count),
                reset_at: entry.reset_at,
            },
        };

        match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();

                // window expired..? start a new one
                if entry.reset_at <= now {
                    entry.count = 1;
                    entry.reset_at = now + window;
                    return admit(entry);
                }

                if entry.count >= limit {
                    return Admission {
                        admitted: false,
                        info: RateLimitInfo {
                            remaining: 0,
                            reset_at: entry.reset_at,
                        },
                    };
                }

                entry.count += 1;
                admit(entry)
            }
            Entry::Vacant(vacant) => {
                let entry = vacant.insert(RateLimitEntry {
                    count: 1,
                    reset_at: now + window,
                });
                admit(entry.value())
            }
        }
    }

    // Remaining quota and window end for a key, without consuming anything
    pub fn peek(&self, identity: &str, route: &str, limit: u32, window: Duration) -> RateLimitInfo {
        self.peek_at(identity, route, limit, window, Instant::now())
    }

    pub fn peek_at(
        &self,
        identity: &str,
        route: &str,
        limit: u32,
        window: Duration,
        now: Instant,
    ) -> RateLimitInfo {
        let limit = limit.max(1);
        let window = window.max(MIN_WINDOW);
        let key = Self::make_key(identity, route);

        match self.entries.get(&key) {
            Some(entry) if entry.reset_at > now => RateLimitInfo {
                remaining: limit.saturating_sub(entry.count),
                reset_at: entry.reset_at,
            },
            _ => RateLimitInfo {
                remaining: limit,
                reset_at: now + window,
            },
        }
    }

    // Drop every entry whose window has ended, returns how many went
    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Instant::now())
    }

    pub fn sweep_expired_at(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.reset_at > now);
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn entry(&self, identity: &str, route: &str) -> Option<RateLimitEntry> {
        self.entries
            .get(&Self::make_key(identity, route))
            .map(|entry| entry.value().clone())
    }

    // Must not be called while holding a reference into `entries`
    fn make_room(&self, now: Instant) {
        if self.max_entries == 0 || self.entries.len() < self.max_entries {
            return;
        }

        self.sweep_expired_at(now);

        let batch = (self.max_entries / EVICTION_BATCH_DIVISOR).max(1);
        let target = self.max_entries.saturating_sub(batch);
        let excess = self.entries.len().saturating_sub(target);
        if excess == 0 {
            return;
        }

        let mut by_expiry: Vec<(Instant, String)> = self
            .entries
            .iter()
            .map(|entry| (entry.value().reset_at, entry.key().clone()))
            .collect();

        if excess < by_expiry.len() {
            by_expiry.select_nth_unstable_by_key(excess - 1, |(reset_at, _)| *reset_at);
        }

        for (_, key) in by_expiry.into_iter().take(excess) {
            self.entries.remove(&key);
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(0)
    }
}
