//! Mock collaborators shared by unit tests

use crate::attach_info::{AttachInfoFetcher, GetAttachInfoReq, GetAttachInfoResp};
use crate::error::{InfoCacheError, InfoCacheResult};
use crate::fabric::{FabricScanner, NetDevClass, ScannedInterface};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub(crate) fn scanned(
    name: &str,
    ifaces: &[&str],
    class: NetDevClass,
    providers: &[&str],
) -> ScannedInterface {
    ScannedInterface {
        name: name.to_string(),
        net_interfaces: ifaces.iter().map(|s| s.to_string()).collect(),
        class,
        providers: providers.iter().map(|s| s.to_string()).collect(),
    }
}

/// Scanner returning a canned result and counting calls
pub(crate) struct MockScanner {
    result: Mutex<InfoCacheResult<Vec<ScannedInterface>>>,
    delay: Duration,
    calls: AtomicUsize,
    providers: Mutex<Vec<String>>,
}

impl MockScanner {
    pub(crate) fn ok(devices: Vec<ScannedInterface>) -> Self {
        Self::with_result(Ok(devices))
    }

    pub(crate) fn err(err: InfoCacheError) -> Self {
        Self::with_result(Err(err))
    }

    fn with_result(result: InfoCacheResult<Vec<ScannedInterface>>) -> Self {
        Self {
            result: Mutex::new(result),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            providers: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn set_result(&self, result: InfoCacheResult<Vec<ScannedInterface>>) {
        *self.result.lock() = result;
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_providers(&self) -> Vec<String> {
        self.providers.lock().clone()
    }
}

#[async_trait]
impl FabricScanner for MockScanner {
    async fn scan(&self, providers: &[String]) -> InfoCacheResult<Vec<ScannedInterface>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.providers.lock() = providers.to_vec();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.result.lock().clone()
    }
}

/// Attach info fetcher returning a canned response and counting calls
pub(crate) struct MockFetcher {
    result: Mutex<InfoCacheResult<GetAttachInfoResp>>,
    delay: Duration,
    calls: AtomicUsize,
    requests: Mutex<Vec<GetAttachInfoReq>>,
}

impl MockFetcher {
    pub(crate) fn ok(resp: GetAttachInfoResp) -> Self {
        Self::with_result(Ok(resp))
    }

    pub(crate) fn err(err: InfoCacheError) -> Self {
        Self::with_result(Err(err))
    }

    fn with_result(result: InfoCacheResult<GetAttachInfoResp>) -> Self {
        Self {
            result: Mutex::new(result),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn set_result(&self, result: InfoCacheResult<GetAttachInfoResp>) {
        *self.result.lock() = result;
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<GetAttachInfoReq> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl AttachInfoFetcher for MockFetcher {
    async fn get_attach_info(&self, req: &GetAttachInfoReq) -> InfoCacheResult<GetAttachInfoResp> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(req.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.result.lock().clone()
    }
}
