// SPDX-License-Identifier: Apache-2.0

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as SyncMutex, PoisonError};
use std::time::{Duration, Instant};

use nouns_reasons_model::Vote;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::{CacheKey, QueryError};

/// Window during which a fetched page is served without revalidation.
pub const DEFAULT_REVALIDATE: Duration = Duration::from_secs(30);

/// Votes per page when the cache is built without an explicit size.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Prefetched pages keyed by derived cache key, used to seed the cache.
pub type FallbackMap = BTreeMap<CacheKey, Vec<Vote>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub inflight: usize,
}

#[derive(Clone)]
struct CachedPage {
    votes: Vec<Vote>,
    stored_at: Instant,
}

type FlightMap = SyncMutex<HashMap<CacheKey, Arc<Mutex<()>>>>;

/// One caller's membership in a key's single-flight group.
///
/// Dropping it, whether the fetch finished or the caller was cancelled,
/// releases the turn and removes the map entry once no other caller holds it.
struct Flight<'a> {
    map: &'a FlightMap,
    key: CacheKey,
    lock: Arc<Mutex<()>>,
    turn: Option<OwnedMutexGuard<()>>,
}

impl<'a> Flight<'a> {
    fn join(map: &'a FlightMap, key: &CacheKey) -> Self {
        let mut inflight = map.lock().unwrap_or_else(PoisonError::into_inner);
        let lock = Arc::clone(
            inflight
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        );
        Self {
            map,
            key: key.clone(),
            lock,
            turn: None,
        }
    }

    async fn wait_turn(&mut self) {
        self.turn = Some(Arc::clone(&self.lock).lock_owned().await);
    }
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        self.turn.take();
        let mut inflight = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        // The map's handle plus ours; any other count means a caller still waits.
        if inflight
            .get(&self.key)
            .is_some_and(|current| Arc::ptr_eq(current, &self.lock))
            && Arc::strong_count(&self.lock) == 2
        {
            inflight.remove(&self.key);
        }
    }
}

/// Page store shared by every pagination sequence.
///
/// A key's value is immutable until its revalidation window lapses. At most
/// one fetch per key is in flight; concurrent callers for the same key wait
/// for it and read the stored page. Keys do not carry a page size, so the
/// cache serves exactly one size, fixed at construction.
pub struct PageCache {
    ttl: Duration,
    max_entries: usize,
    page_size: u64,
    entries: Mutex<HashMap<CacheKey, CachedPage>>,
    inflight: FlightMap,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl PageCache {
    #[must_use]
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries: max_entries.max(1),
            page_size: DEFAULT_PAGE_SIZE,
            entries: Mutex::new(HashMap::new()),
            inflight: SyncMutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    #[must_use]
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub async fn get(&self, key: &CacheKey) -> Option<Vec<Vote>> {
        let mut entries = self.entries.lock().await;
        let ttl = self.ttl;
        entries.retain(|_, v| v.stored_at.elapsed() < ttl);
        entries.get(key).map(|page| page.votes.clone())
    }

    pub async fn insert(&self, key: CacheKey, votes: Vec<Vote>) {
        let mut entries = self.entries.lock().await;
        let ttl = self.ttl;
        entries.retain(|_, v| v.stored_at.elapsed() < ttl);
        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            if let Some(victim) = entries
                .iter()
                .min_by_key(|(_, v)| v.stored_at)
                .map(|(k, _)| k.clone())
            {
                entries.remove(&victim);
            }
        }
        entries.insert(
            key,
            CachedPage {
                votes,
                stored_at: Instant::now(),
            },
        );
    }

    /// Loads prefetched pages, e.g. from a page payload's fallback map.
    pub async fn seed(&self, fallback: FallbackMap) {
        for (key, votes) in fallback {
            self.insert(key, votes).await;
        }
    }

    /// Returns the cached page for `key`, or runs `fetch` once and stores its
    /// result. Errors are not cached.
    pub async fn get_or_fetch<F, Fut>(&self, key: &CacheKey, fetch: F) -> Result<Vec<Vote>, QueryError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Vote>, QueryError>>,
    {
        if let Some(hit) = self.get(key).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(hit);
        }

        let mut flight = Flight::join(&self.inflight, key);
        flight.wait_turn().await;

        if let Some(hit) = self.get(key).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(hit);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, "page cache miss");
        let result = fetch().await;
        if let Ok(votes) = &result {
            self.insert(key.clone(), votes.clone()).await;
        }
        result
    }

    pub async fn stats(&self) -> CacheStats {
        let inflight = self
            .inflight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.lock().await.len(),
            inflight,
        }
    }
}

impl Default for PageCache {
    fn default() -> Self {
        Self::new(DEFAULT_REVALIDATE, 1024)
    }
}
