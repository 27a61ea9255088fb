/// Time-based cache for the rendered index page
///
/// The index is anonymous-safe content, so the cache key is the rendered
/// surface itself (per page number) with no per-viewer variance. Entries are
/// deliberately stale within the TTL: a post created inside the window is not
/// guaranteed to appear until the entry expires. There is no write-triggered
/// invalidation, only expiry.
///
/// Entry lifecycle: EMPTY -> POPULATED (first read) -> EXPIRED (after TTL)
/// -> POPULATED (next read).
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::config::CacheConfig;

/// Injectable time source so expiry is testable without sleeping
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time source used in production
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct Entry {
    body: String,
    stored_at: Instant,
}

enum Backend {
    /// In-memory TTL map
    Memory(Mutex<HashMap<String, Entry>>),
    /// No-op passthrough: never stores, every read recomputes
    Disabled,
}

pub struct PageCache {
    backend: Backend,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl PageCache {
    /// In-memory cache with the system clock
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// In-memory cache with an injected clock
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        PageCache {
            backend: Backend::Memory(Mutex::new(HashMap::new())),
            ttl,
            clock,
        }
    }

    /// Passthrough cache for deterministic test environments
    pub fn disabled() -> Self {
        PageCache {
            backend: Backend::Disabled,
            ttl: Duration::ZERO,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn from_config(cfg: &CacheConfig) -> Self {
        if cfg.enabled {
            Self::new(Duration::from_secs(cfg.ttl_secs))
        } else {
            Self::disabled()
        }
    }

    /// Cache key for one page of the index surface
    pub fn index_key(page: u32) -> String {
        format!("index:page:{}", page)
    }

    /// Fetch a cached body if present and not expired. Expired entries are
    /// dropped on the way out.
    pub fn get(&self, key: &str) -> Option<String> {
        let entries = match &self.backend {
            Backend::Memory(entries) => entries,
            Backend::Disabled => return None,
        };

        let now = self.clock.now();
        let mut entries = entries.lock().unwrap_or_else(|e| e.into_inner());

        match entries.get(key) {
            Some(entry) if now.duration_since(entry.stored_at) < self.ttl => {
                tracing::debug!(key, "page cache HIT");
                Some(entry.body.clone())
            }
            Some(_) => {
                tracing::debug!(key, "page cache EXPIRED");
                entries.remove(key);
                None
            }
            None => {
                tracing::debug!(key, "page cache MISS");
                None
            }
        }
    }

    /// Store a rendered body. Concurrent writers race benignly; the content
    /// is regenerable and at most one TTL stale.
    pub fn put(&self, key: &str, body: String) {
        let entries = match &self.backend {
            Backend::Memory(entries) => entries,
            Backend::Disabled => return,
        };

        let mut entries = entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            key.to_string(),
            Entry {
                body,
                stored_at: self.clock.now(),
            },
        );
        tracing::debug!(key, "page cache WRITE");
    }
}
