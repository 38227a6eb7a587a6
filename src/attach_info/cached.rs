//! Cache item wrapping the last GetAttachInfo response

use super::types::{GetAttachInfoReq, GetAttachInfoResp};
use super::AttachInfoFetcher;
use crate::cache::{CacheItem, Freshness};
use crate::error::InfoCacheResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Key prefix for attach info entries
pub const ATTACH_INFO_KEY: &str = "GetAttachInfo";

/// Cache key for a system, so several systems can share one cache
pub fn attach_info_key(system: &str) -> String {
    if system.is_empty() {
        ATTACH_INFO_KEY.to_string()
    } else {
        format!("{}-{}", ATTACH_INFO_KEY, system)
    }
}

/// Attach info for one system with staleness tracking
pub struct CachedAttachInfo {
    freshness: Freshness,
    system: String,
    fetcher: Arc<dyn AttachInfoFetcher>,
    last_response: Option<Arc<GetAttachInfoResp>>,
}

impl CachedAttachInfo {
    pub fn new(
        refresh_interval: Duration,
        system: impl Into<String>,
        fetcher: Arc<dyn AttachInfoFetcher>,
    ) -> Self {
        Self {
            freshness: Freshness::new(refresh_interval),
            system: system.into(),
            fetcher,
            last_response: None,
        }
    }

    /// Seed with an existing response, counted as cached now
    pub fn with_response(mut self, resp: GetAttachInfoResp) -> Self {
        self.last_response = Some(Arc::new(resp));
        self.freshness.mark_cached();
        self
    }

    pub fn system(&self) -> &str {
        &self.system
    }
}

#[async_trait]
impl CacheItem for CachedAttachInfo {
    type Payload = Arc<GetAttachInfoResp>;

    fn key(&self) -> String {
        attach_info_key(&self.system)
    }

    fn needs_refresh(&self) -> bool {
        self.freshness.needs_refresh()
    }

    async fn refresh(&mut self) -> InfoCacheResult<()> {
        let req = GetAttachInfoReq::new(self.system.clone());
        let resp = self.fetcher.get_attach_info(&req).await?;
        debug!(
            system = %self.system,
            service_ranks = resp.service_ranks.len(),
            "cached attach info"
        );
        self.last_response = Some(Arc::new(resp));
        self.freshness.mark_cached();
        Ok(())
    }

    fn payload(&self) -> Option<Arc<GetAttachInfoResp>> {
        self.last_response.clone()
    }

    fn last_cached(&self) -> Option<DateTime<Utc>> {
        self.freshness.last_cached()
    }
}
