//! Keyed store with per-item single-flight refresh

use super::item::CacheItem;
use crate::error::{InfoCacheError, InfoCacheResult};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Snapshot of one installed item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemStatus {
    pub key: String,
    pub last_cached: Option<DateTime<Utc>>,
    pub stale: bool,
}

/// Concurrency-safe map from key to refreshable item
pub struct ItemCache<I: CacheItem> {
    items: RwLock<HashMap<String, Arc<Slot<I>>>>,
    refresh_timeout: Option<Duration>,
}

struct Slot<I> {
    /// Count of finished refresh attempts. Bumped while the state lock is held.
    attempts: AtomicU64,
    state: Mutex<SlotState<I>>,
}

struct SlotState<I> {
    item: I,
    last_error: Option<InfoCacheError>,
}

impl<I> Slot<I> {
    fn new(item: I) -> Self {
        Self {
            attempts: AtomicU64::new(0),
            state: Mutex::new(SlotState {
                item,
                last_error: None,
            }),
        }
    }
}

impl<I: CacheItem> ItemCache<I> {
    /// Create an empty cache with unbounded refreshes
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            refresh_timeout: None,
        }
    }

    /// Create an empty cache whose refreshes fail after `timeout`
    pub fn with_refresh_timeout(timeout: Option<Duration>) -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            refresh_timeout: timeout,
        }
    }

    pub fn refresh_timeout(&self) -> Option<Duration> {
        self.refresh_timeout
    }

    /// Install or replace the item under its own key. Does not refresh.
    pub fn set(&self, item: I) {
        let key = item.key();
        debug!(key = %key, "installing cache item");
        self.items.write().insert(key, Arc::new(Slot::new(item)));
    }

    /// Install the item built by `make` unless `key` is already present
    ///
    /// Returns true if a new item was installed.
    pub fn insert_if_absent(&self, key: &str, make: impl FnOnce() -> I) -> bool {
        if self.items.read().contains_key(key) {
            return false;
        }

        let mut items = self.items.write();
        if items.contains_key(key) {
            return false;
        }
        let item = make();
        debug_assert_eq!(item.key(), key);
        debug!(key, "installing cache item");
        items.insert(key.to_string(), Arc::new(Slot::new(item)));
        true
    }

    /// True if an item is installed for `key`, stale or not
    pub fn has(&self, key: &str) -> bool {
        self.items.read().contains_key(key)
    }

    /// Installed keys in sorted order
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.items.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Get the payload for `key`, refreshing first if the item is stale
    ///
    /// A failed refresh keeps the previous payload in the cache, but the
    /// caller receives the refresh error.
    pub async fn get(&self, key: &str) -> InfoCacheResult<I::Payload> {
        self.fetch(key, false).await
    }

    /// Refresh the item for `key` regardless of staleness
    pub async fn refresh(&self, key: &str) -> InfoCacheResult<I::Payload> {
        self.fetch(key, true).await
    }

    /// Current payload without triggering a refresh
    pub async fn peek(&self, key: &str) -> InfoCacheResult<Option<I::Payload>> {
        let slot = self.slot(key)?;
        let state = slot.state.lock().await;
        Ok(state.item.payload())
    }

    /// Status of every installed item, sorted by key
    pub async fn status(&self) -> Vec<ItemStatus> {
        let mut slots: Vec<(String, Arc<Slot<I>>)> = self
            .items
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), Arc::clone(v)))
            .collect();
        slots.sort_by(|a, b| a.0.cmp(&b.0));

        let mut out = Vec::with_capacity(slots.len());
        for (key, slot) in slots {
            let state = slot.state.lock().await;
            out.push(ItemStatus {
                key,
                last_cached: state.item.last_cached(),
                stale: state.item.needs_refresh(),
            });
        }
        out
    }

    async fn fetch(&self, key: &str, force: bool) -> InfoCacheResult<I::Payload> {
        let slot = self.slot(key)?;
        let seen = slot.attempts.load(Ordering::Acquire);
        let mut state = slot.state.lock().await;

        let wants_refresh = force || state.item.needs_refresh();

        // Another caller finished a refresh while this one waited. Its outcome
        // only applies if this call would have refreshed too; a plain get on
        // still-fresh data keeps serving the cached payload.
        if wants_refresh && slot.attempts.load(Ordering::Acquire) != seen {
            debug!(key, "sharing result of concurrent refresh");
            if let Some(err) = &state.last_error {
                return Err(err.clone());
            }
            return payload_of(key, &state.item);
        }

        if wants_refresh {
            debug!(key, force, "refreshing cache item");
            let result = with_timeout(key, self.refresh_timeout, state.item.refresh()).await;
            state.last_error = result.as_ref().err().cloned();
            slot.attempts.fetch_add(1, Ordering::AcqRel);
            result?;
        } else {
            debug!(key, "cache hit");
        }

        payload_of(key, &state.item)
    }

    fn slot(&self, key: &str) -> InfoCacheResult<Arc<Slot<I>>> {
        self.items
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| InfoCacheError::ItemNotFound(key.to_string()))
    }
}

impl<I: CacheItem> Default for ItemCache<I> {
    fn default() -> Self {
        Self::new()
    }
}

fn payload_of<I: CacheItem>(key: &str, item: &I) -> InfoCacheResult<I::Payload> {
    item.payload()
        .ok_or_else(|| InfoCacheError::ItemEmpty(key.to_string()))
}

/// Bound a fetch by the configured timeout
pub(crate) async fn with_timeout<T, F>(
    key: &str,
    timeout: Option<Duration>,
    fut: F,
) -> InfoCacheResult<T>
where
    F: Future<Output = InfoCacheResult<T>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
            InfoCacheError::RefreshTimeout {
                key: key.to_string(),
                timeout: limit,
            }
        })?,
        None => fut.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Freshness;
    use async_trait::async_trait;
    use futures_util::future::join_all;
    use std::sync::atomic::AtomicUsize;

    struct MockItem {
        key: String,
        freshness: Freshness,
        data: Option<Arc<String>>,
        next: InfoCacheResult<String>,
        delay: Duration,
        calls: Arc<AtomicUsize>,
    }

    impl MockItem {
        fn new(key: &str, next: InfoCacheResult<String>) -> Self {
            Self {
                key: key.to_string(),
                freshness: Freshness::new(Duration::ZERO),
                data: None,
                next,
                delay: Duration::ZERO,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn cached(mut self, value: &str, freshness: Freshness) -> Self {
            self.data = Some(Arc::new(value.to_string()));
            self.freshness = freshness;
            self
        }

        fn delayed(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    #[async_trait]
    impl CacheItem for MockItem {
        type Payload = Arc<String>;

        fn key(&self) -> String {
            self.key.clone()
        }

        fn needs_refresh(&self) -> bool {
            self.freshness.needs_refresh()
        }

        async fn refresh(&mut self) -> InfoCacheResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let value = self.next.clone()?;
            self.data = Some(Arc::new(value));
            self.freshness.mark_cached();
            Ok(())
        }

        fn payload(&self) -> Option<Arc<String>> {
            self.data.clone()
        }

        fn last_cached(&self) -> Option<DateTime<Utc>> {
            self.freshness.last_cached()
        }
    }

    fn expired() -> Freshness {
        Freshness::cached_ago(Duration::from_secs(60), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn get_missing_key_not_found() {
        let cache: ItemCache<MockItem> = ItemCache::new();
        let err = cache.get("nope").await.unwrap_err();
        assert!(matches!(err, InfoCacheError::ItemNotFound(k) if k == "nope"));
        assert!(!cache.has("nope"));
    }

    #[tokio::test]
    async fn set_then_get_returns_value_unchanged() {
        let cache = ItemCache::new();
        let item = MockItem::new("k", Err(InfoCacheError::Internal("no fetch".into())))
            .cached("v1", Freshness::cached_ago(Duration::ZERO, Duration::ZERO));
        let calls = Arc::clone(&item.calls);
        cache.set(item);

        assert!(cache.has("k"));
        assert_eq!(*cache.get("k").await.unwrap(), "v1");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn stale_item_is_refreshed_on_get() {
        let cache = ItemCache::new();
        let item = MockItem::new("k", Ok("v2".into())).cached("v1", expired());
        let calls = Arc::clone(&item.calls);
        cache.set(item);

        assert_eq!(*cache.get("k").await.unwrap(), "v2");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_payload() {
        let cache = ItemCache::new();
        let item =
            MockItem::new("k", Err(InfoCacheError::FabricScan("mock".into()))).cached("v1", expired());
        cache.set(item);

        let err = cache.get("k").await.unwrap_err();
        assert!(matches!(err, InfoCacheError::FabricScan(_)));
        let kept = cache.peek("k").await.unwrap().unwrap();
        assert_eq!(*kept, "v1");
    }

    #[tokio::test]
    async fn never_populated_failure_leaves_item_empty() {
        let cache = ItemCache::new();
        cache.set(MockItem::new("k", Err(InfoCacheError::FabricScan("mock".into()))));

        assert!(cache.get("k").await.is_err());
        assert!(cache.has("k"));
        assert!(cache.peek("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn concurrent_gets_share_one_fetch() {
        let cache = ItemCache::new();
        let item = MockItem::new("k", Ok("fresh".into())).delayed(Duration::from_millis(50));
        let calls = Arc::clone(&item.calls);
        cache.set(item);

        let results = join_all((0..16).map(|_| cache.get("k"))).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for r in results {
            assert_eq!(*r.unwrap(), "fresh");
        }
    }

    #[tokio::test]
    async fn concurrent_gets_share_one_failure() {
        let cache = ItemCache::new();
        let item = MockItem::new("k", Err(InfoCacheError::AttachInfoFetch("mock remote".into())))
            .delayed(Duration::from_millis(50));
        let calls = Arc::clone(&item.calls);
        cache.set(item);

        let results = join_all((0..8).map(|_| cache.get("k"))).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for r in results {
            let err = r.unwrap_err();
            assert_eq!(err.to_string(), "GetAttachInfo failed: mock remote");
        }
    }

    #[tokio::test]
    async fn failed_forced_refresh_does_not_fail_fresh_get() {
        let cache = ItemCache::new();
        let item = MockItem::new("k", Err(InfoCacheError::FabricScan("boom".into())))
            .cached("good", Freshness::cached_ago(Duration::ZERO, Duration::ZERO))
            .delayed(Duration::from_millis(50));
        let calls = Arc::clone(&item.calls);
        cache.set(item);

        let (forced, plain) = tokio::join!(cache.refresh("k"), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            cache.get("k").await
        });

        assert!(matches!(forced, Err(InfoCacheError::FabricScan(_))));
        assert_eq!(*plain.unwrap(), "good");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_gets_share_one_timeout() {
        let cache = ItemCache::with_refresh_timeout(Some(Duration::from_millis(20)));
        let item = MockItem::new("k", Ok("late".into())).delayed(Duration::from_secs(5));
        let calls = Arc::clone(&item.calls);
        cache.set(item);

        let results = join_all((0..5).map(|_| cache.get("k"))).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for r in results {
            assert!(matches!(r, Err(InfoCacheError::RefreshTimeout { ref key, .. }) if key == "k"));
        }
        assert!(cache.peek("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn dropped_refresher_leaves_next_waiter_to_fetch() {
        let cache = ItemCache::new();
        let item = MockItem::new("k", Ok("fresh".into())).delayed(Duration::from_millis(50));
        let calls = Arc::clone(&item.calls);
        cache.set(item);

        let (first, second) = tokio::join!(
            tokio::time::timeout(Duration::from_millis(10), cache.get("k")),
            async {
                tokio::time::sleep(Duration::from_millis(1)).await;
                cache.get("k").await
            }
        );

        assert!(first.is_err());
        assert_eq!(*second.unwrap(), "fresh");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn forced_refresh_ignores_freshness() {
        let cache = ItemCache::new();
        let item = MockItem::new("k", Ok("v2".into()))
            .cached("v1", Freshness::cached_ago(Duration::ZERO, Duration::ZERO));
        let calls = Arc::clone(&item.calls);
        cache.set(item);

        assert_eq!(*cache.refresh("k").await.unwrap(), "v2");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn refresh_timeout_keeps_previous_payload() {
        let cache = ItemCache::with_refresh_timeout(Some(Duration::from_millis(20)));
        let item = MockItem::new("k", Ok("late".into()))
            .cached("v1", expired())
            .delayed(Duration::from_secs(5));
        cache.set(item);

        let err = cache.get("k").await.unwrap_err();
        assert!(matches!(err, InfoCacheError::RefreshTimeout { ref key, .. } if key == "k"));
        assert_eq!(*cache.peek("k").await.unwrap().unwrap(), "v1");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn refresh_does_not_block_other_keys() {
        let cache = Arc::new(ItemCache::new());
        cache.set(MockItem::new("slow", Ok("s".into())).delayed(Duration::from_secs(2)));
        cache.set(
            MockItem::new("fast", Ok("unused".into()))
                .cached("f", Freshness::cached_ago(Duration::ZERO, Duration::ZERO)),
        );

        let slow = {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.get("slow").await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        let fast = tokio::time::timeout(Duration::from_millis(500), cache.get("fast"))
            .await
            .expect("fast key blocked by slow refresh")
            .unwrap();
        assert_eq!(*fast, "f");

        // Installing another key is not blocked either.
        cache.set(MockItem::new("other", Ok("o".into())));
        assert!(cache.has("other"));

        slow.abort();
    }

    #[tokio::test]
    async fn insert_if_absent_keeps_existing() {
        let cache = ItemCache::new();
        cache.set(
            MockItem::new("k", Ok("unused".into()))
                .cached("first", Freshness::cached_ago(Duration::ZERO, Duration::ZERO)),
        );

        let installed = cache.insert_if_absent("k", || MockItem::new("k", Ok("second".into())));
        assert!(!installed);
        assert_eq!(*cache.get("k").await.unwrap(), "first");

        assert!(cache.insert_if_absent("j", || MockItem::new("j", Ok("new".into()))));
        assert_eq!(cache.keys(), vec!["j".to_string(), "k".to_string()]);
    }

    #[tokio::test]
    async fn status_reports_staleness() {
        let cache = ItemCache::new();
        cache.set(MockItem::new("b", Ok("x".into())));
        cache.set(
            MockItem::new("a", Ok("x".into()))
                .cached("y", Freshness::cached_ago(Duration::ZERO, Duration::ZERO)),
        );

        let status = cache.status().await;
        assert_eq!(status.len(), 2);
        assert_eq!(status[0].key, "a");
        assert!(!status[0].stale);
        assert!(status[0].last_cached.is_some());
        assert_eq!(status[1].key, "b");
        assert!(status[1].stale);
    }
}
