//! Cache item wrapping the scanned NUMA fabric

use super::numa::NumaFabric;
use super::scan::{FabricScanner, NumaResolver};
use crate::cache::{CacheItem, Freshness};
use crate::error::InfoCacheResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Key of the single fabric entry
pub const FABRIC_KEY: &str = "fabric";

/// Scanned fabric topology with staleness tracking
pub struct CachedFabricInfo {
    freshness: Freshness,
    scanner: Arc<dyn FabricScanner>,
    resolver: Option<Arc<dyn NumaResolver>>,
    ignored: Arc<BTreeSet<String>>,
    providers: Arc<RwLock<BTreeSet<String>>>,
    last_results: Option<Arc<NumaFabric>>,
}

impl CachedFabricInfo {
    pub fn new(
        refresh_interval: Duration,
        scanner: Arc<dyn FabricScanner>,
        resolver: Option<Arc<dyn NumaResolver>>,
        ignored: Arc<BTreeSet<String>>,
        providers: Arc<RwLock<BTreeSet<String>>>,
    ) -> Self {
        Self {
            freshness: Freshness::new(refresh_interval),
            scanner,
            resolver,
            ignored,
            providers,
            last_results: None,
        }
    }

    /// Seed with an existing topology, counted as cached now
    pub fn with_results(mut self, fabric: NumaFabric) -> Self {
        self.last_results = Some(Arc::new(fabric));
        self.freshness.mark_cached();
        self
    }

    /// Scan and group, without touching cached state
    pub async fn scan(&self) -> InfoCacheResult<NumaFabric> {
        let providers: Vec<String> = self.providers.read().iter().cloned().collect();
        let scanned = self.scanner.scan(&providers).await?;
        debug!(
            devices = scanned.len(),
            providers = ?providers,
            "fabric scan complete"
        );
        Ok(NumaFabric::from_scan(
            &scanned,
            &self.ignored,
            self.resolver.as_deref(),
        ))
    }
}

#[async_trait]
impl CacheItem for CachedFabricInfo {
    type Payload = Arc<NumaFabric>;

    fn key(&self) -> String {
        FABRIC_KEY.to_string()
    }

    fn needs_refresh(&self) -> bool {
        self.freshness.needs_refresh()
    }

    async fn refresh(&mut self) -> InfoCacheResult<()> {
        let fabric = self.scan().await?;
        self.last_results = Some(Arc::new(fabric));
        self.freshness.mark_cached();
        Ok(())
    }

    fn payload(&self) -> Option<Arc<NumaFabric>> {
        self.last_results.clone()
    }

    fn last_cached(&self) -> Option<DateTime<Utc>> {
        self.freshness.last_cached()
    }
}
