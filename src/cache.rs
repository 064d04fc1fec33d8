use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::time::{Duration, Instant};

use crate::models::{GenerateRequest, GenerateResponse};

// Cache entry with timestamp
#[derive(Clone)]
pub struct CacheEntry {
    pub response: GenerateResponse,
    pub created_at: Instant,
}

// Create a cache key (hash of model + prompt)
pub fn make_cache_key(req: &GenerateRequest) -> String {
    let mut hasher = Sha256::new();
    hasher.update(&req.model);
    hasher.update([0u8]);
    hasher.update(&req.prompt);
    format!("{:x}", hasher.finalize())
}

// Generation responses, valid for `ttl` after they were stored
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn get(&self, key: &str) -> Option<GenerateResponse> {
        let entry = self.entries.get(key)?;
        if entry.created_at.elapsed() < self.ttl {
            Some(entry.response.clone())
        } else {
            None
        }
    }

    pub fn insert(&self, key: String, response: GenerateResponse) {
        self.entries.insert(
            key,
            CacheEntry {
                response,
                created_at: Instant::now(),
            },
        );
    }

    pub fn prune_expired(&self) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.created_at.elapsed() < ttl);
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
