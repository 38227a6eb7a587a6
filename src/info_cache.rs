//! Agent-facing cache façade
//!
//! Owns the attach info and fabric caches, the switches that turn each of
//! them on or off, and the collaborators that fetch fresh data. When a cache
//! is disabled every request goes straight to its source and errors surface
//! exactly as they would from the source.

use crate::attach_info::{
    attach_info_key, AttachInfoFetcher, CachedAttachInfo, GetAttachInfoReq, GetAttachInfoResp,
};
use crate::cache::{with_timeout, ItemCache, ItemStatus};
use crate::config::AgentConfig;
use crate::error::{InfoCacheError, InfoCacheResult};
use crate::fabric::{
    CachedFabricInfo, FabricInterface, FabricScanner, NetDevClass, NumaFabric, NumaResolver,
    FABRIC_KEY,
};
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CacheSettings {
    enabled: bool,
    refresh_interval: Duration,
}

impl CacheSettings {
    fn enabled(refresh_interval: Duration) -> Self {
        Self {
            enabled: true,
            refresh_interval,
        }
    }
}

/// Which of the two caches a status entry describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    AttachInfo,
    Fabric,
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttachInfo => f.write_str("attach info"),
            Self::Fabric => f.write_str("fabric"),
        }
    }
}

/// State of one cache as reported by [`InfoCache::status`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStatus {
    pub kind: CacheKind,
    pub enabled: bool,
    pub refresh_interval: Duration,
    pub items: Vec<ItemStatus>,
}

/// Attach info and fabric caches for one agent process
pub struct InfoCache {
    attach_info: ItemCache<CachedAttachInfo>,
    fabric: ItemCache<CachedFabricInfo>,
    fetcher: Option<Arc<dyn AttachInfoFetcher>>,
    scanner: Option<Arc<dyn FabricScanner>>,
    resolver: Option<Arc<dyn NumaResolver>>,
    attach_info_settings: RwLock<CacheSettings>,
    fabric_settings: RwLock<CacheSettings>,
    ignored_ifaces: Arc<BTreeSet<String>>,
    providers: Arc<RwLock<BTreeSet<String>>>,
    system_name: String,
}

impl InfoCache {
    pub fn builder() -> InfoCacheBuilder {
        InfoCacheBuilder::new()
    }

    /// Cache attach info, refetching after `refresh_interval` (zero = on demand only)
    pub fn enable_attach_info_cache(&self, refresh_interval: Duration) {
        *self.attach_info_settings.write() = CacheSettings::enabled(refresh_interval);
        info!(?refresh_interval, "attach info cache enabled");
    }

    pub fn disable_attach_info_cache(&self) {
        self.attach_info_settings.write().enabled = false;
        info!("attach info cache disabled");
    }

    pub fn is_attach_info_cache_enabled(&self) -> bool {
        self.attach_info_settings.read().enabled
    }

    /// Cache the fabric scan, rescanning after `refresh_interval` (zero = on demand only)
    pub fn enable_fabric_cache(&self, refresh_interval: Duration) {
        *self.fabric_settings.write() = CacheSettings::enabled(refresh_interval);
        info!(?refresh_interval, "fabric cache enabled");
    }

    pub fn disable_fabric_cache(&self) {
        self.fabric_settings.write().enabled = false;
        info!("fabric cache disabled");
    }

    pub fn is_fabric_cache_enabled(&self) -> bool {
        self.fabric_settings.read().enabled
    }

    /// Accept interfaces supporting `provider` in future scans
    pub fn add_provider(&self, provider: &str) {
        if provider.is_empty() {
            return;
        }
        if self.providers.write().insert(provider.to_string()) {
            debug!(provider, "added fabric provider");
        }
    }

    pub fn providers(&self) -> Vec<String> {
        self.providers.read().iter().cloned().collect()
    }

    pub fn ignored_interfaces(&self) -> &BTreeSet<String> {
        &self.ignored_ifaces
    }

    /// Attach info for `system` (the configured default if empty)
    pub async fn get_attach_info(&self, system: &str) -> InfoCacheResult<Arc<GetAttachInfoResp>> {
        let fetcher = self
            .fetcher
            .as_ref()
            .ok_or(InfoCacheError::Uninitialized("attach info fetcher"))?;
        let system = if system.is_empty() {
            self.system_name.as_str()
        } else {
            system
        };
        let key = attach_info_key(system);
        let settings = *self.attach_info_settings.read();

        if !settings.enabled {
            debug!(system, "attach info cache disabled, fetching directly");
            let req = GetAttachInfoReq::new(system);
            let resp = with_timeout(
                &key,
                self.attach_info.refresh_timeout(),
                fetcher.get_attach_info(&req),
            )
            .await?;
            return Ok(Arc::new(resp));
        }

        self.attach_info.insert_if_absent(&key, || {
            CachedAttachInfo::new(settings.refresh_interval, system, Arc::clone(fetcher))
        });
        self.attach_info.get(&key).await
    }

    /// Pick the interface a client on `numa` should use for `class` and `provider`
    pub async fn get_fabric_device(
        &self,
        numa: u32,
        class: NetDevClass,
        provider: &str,
    ) -> InfoCacheResult<FabricInterface> {
        let fabric = self.get_numa_fabric().await?;
        fabric.find_device(numa, class, provider)
    }

    /// The cached fabric topology, or a fresh scan if the cache is disabled
    pub async fn get_numa_fabric(&self) -> InfoCacheResult<Arc<NumaFabric>> {
        let settings = *self.fabric_settings.read();
        let item = self.new_fabric_item(settings.refresh_interval)?;

        if !settings.enabled {
            debug!("fabric cache disabled, scanning directly");
            let fabric = with_timeout(FABRIC_KEY, self.fabric.refresh_timeout(), item.scan()).await?;
            return Ok(Arc::new(fabric));
        }

        self.fabric.insert_if_absent(FABRIC_KEY, || item);
        self.fabric.get(FABRIC_KEY).await
    }

    /// Refetch everything cached, regardless of staleness
    ///
    /// Both caches are attempted even if one fails; the first error is
    /// returned.
    pub async fn refresh(&self) -> InfoCacheResult<()> {
        info!("refreshing info cache");
        let (attach_info, fabric) = tokio::join!(self.refresh_attach_info(), self.refresh_fabric());
        attach_info.and(fabric)
    }

    async fn refresh_attach_info(&self) -> InfoCacheResult<()> {
        let settings = *self.attach_info_settings.read();
        if !settings.enabled {
            return Ok(());
        }
        let Some(fetcher) = self.fetcher.as_ref() else {
            debug!("no attach info fetcher configured, skipping refresh");
            return Ok(());
        };

        let mut keys = self.attach_info.keys();
        if keys.is_empty() {
            let key = attach_info_key(&self.system_name);
            self.attach_info.insert_if_absent(&key, || {
                CachedAttachInfo::new(settings.refresh_interval, &self.system_name, Arc::clone(fetcher))
            });
            keys.push(key);
        }

        let mut first_err = None;
        for key in keys {
            if let Err(e) = self.attach_info.refresh(&key).await {
                warn!(key = %key, "attach info refresh failed: {}", e);
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    async fn refresh_fabric(&self) -> InfoCacheResult<()> {
        let settings = *self.fabric_settings.read();
        if !settings.enabled {
            return Ok(());
        }
        if self.scanner.is_none() {
            debug!("no fabric scanner configured, skipping refresh");
            return Ok(());
        }

        let item = self.new_fabric_item(settings.refresh_interval)?;
        self.fabric.insert_if_absent(FABRIC_KEY, || item);
        if let Err(e) = self.fabric.refresh(FABRIC_KEY).await {
            warn!("fabric refresh failed: {}", e);
            return Err(e);
        }
        Ok(())
    }

    /// Per-cache settings and installed items
    pub async fn status(&self) -> Vec<CacheStatus> {
        let attach_info = *self.attach_info_settings.read();
        let fabric = *self.fabric_settings.read();
        vec![
            CacheStatus {
                kind: CacheKind::AttachInfo,
                enabled: attach_info.enabled,
                refresh_interval: attach_info.refresh_interval,
                items: self.attach_info.status().await,
            },
            CacheStatus {
                kind: CacheKind::Fabric,
                enabled: fabric.enabled,
                refresh_interval: fabric.refresh_interval,
                items: self.fabric.status().await,
            },
        ]
    }

    fn new_fabric_item(&self, refresh_interval: Duration) -> InfoCacheResult<CachedFabricInfo> {
        let scanner = self
            .scanner
            .as_ref()
            .ok_or(InfoCacheError::Uninitialized("fabric scanner"))?;
        Ok(CachedFabricInfo::new(
            refresh_interval,
            Arc::clone(scanner),
            self.resolver.clone(),
            Arc::clone(&self.ignored_ifaces),
            Arc::clone(&self.providers),
        ))
    }
}

/// Builds an [`InfoCache`]; both caches start enabled with on-demand refresh
pub struct InfoCacheBuilder {
    fetcher: Option<Arc<dyn AttachInfoFetcher>>,
    scanner: Option<Arc<dyn FabricScanner>>,
    resolver: Option<Arc<dyn NumaResolver>>,
    system_name: String,
    ignored_ifaces: BTreeSet<String>,
    providers: BTreeSet<String>,
    attach_info: CacheSettings,
    fabric: CacheSettings,
    refresh_timeout: Option<Duration>,
}

impl InfoCacheBuilder {
    pub fn new() -> Self {
        Self {
            fetcher: None,
            scanner: None,
            resolver: None,
            system_name: String::new(),
            ignored_ifaces: BTreeSet::new(),
            providers: BTreeSet::new(),
            attach_info: CacheSettings::enabled(Duration::ZERO),
            fabric: CacheSettings::enabled(Duration::ZERO),
            refresh_timeout: None,
        }
    }

    /// Apply the `[agent]` section of the config file
    pub fn with_config(mut self, config: &AgentConfig) -> Self {
        self.system_name = config.system_name.clone();
        self.ignored_ifaces = config.exclude_fabric_ifaces.iter().cloned().collect();
        self.providers = config
            .providers
            .iter()
            .filter(|p| !p.is_empty())
            .cloned()
            .collect();
        self.refresh_timeout = config.refresh_timeout();
        self.attach_info = CacheSettings {
            enabled: !config.disable_caching,
            refresh_interval: config.attach_info_refresh(),
        };
        self.fabric = CacheSettings {
            enabled: !config.disable_caching,
            refresh_interval: config.fabric_refresh(),
        };
        self
    }

    pub fn attach_info_fetcher(mut self, fetcher: Arc<dyn AttachInfoFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn fabric_scanner(mut self, scanner: Arc<dyn FabricScanner>) -> Self {
        self.scanner = Some(scanner);
        self
    }

    pub fn numa_resolver(mut self, resolver: Arc<dyn NumaResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn system_name(mut self, name: impl Into<String>) -> Self {
        self.system_name = name.into();
        self
    }

    pub fn ignore_interfaces<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_ifaces.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn providers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.providers.extend(
            names
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty()),
        );
        self
    }

    pub fn attach_info_refresh(mut self, interval: Duration) -> Self {
        self.attach_info = CacheSettings::enabled(interval);
        self
    }

    pub fn disable_attach_info_cache(mut self) -> Self {
        self.attach_info.enabled = false;
        self
    }

    pub fn fabric_refresh(mut self, interval: Duration) -> Self {
        self.fabric = CacheSettings::enabled(interval);
        self
    }

    pub fn disable_fabric_cache(mut self) -> Self {
        self.fabric.enabled = false;
        self
    }

    pub fn refresh_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    /// Fails if neither an attach info fetcher nor a fabric scanner is set
    pub fn build(self) -> InfoCacheResult<InfoCache> {
        if self.fetcher.is_none() && self.scanner.is_none() {
            return Err(InfoCacheError::Uninitialized("info cache sources"));
        }

        Ok(InfoCache {
            attach_info: ItemCache::with_refresh_timeout(self.refresh_timeout),
            fabric: ItemCache::with_refresh_timeout(self.refresh_timeout),
            fetcher: self.fetcher,
            scanner: self.scanner,
            resolver: self.resolver,
            attach_info_settings: RwLock::new(self.attach_info),
            fabric_settings: RwLock::new(self.fabric),
            ignored_ifaces: Arc::new(self.ignored_ifaces),
            providers: Arc::new(RwLock::new(self.providers)),
            system_name: self.system_name,
        })
    }
}

impl Default for InfoCacheBuilder {
    fn default() -> Self {
        Self::new()
    }
}
