//! Collaborator interfaces for hardware discovery

use super::types::ScannedInterface;
use crate::error::InfoCacheResult;
use async_trait::async_trait;

/// Discovers fabric devices on the local node
#[async_trait]
pub trait FabricScanner: Send + Sync {
    /// Scan for devices supporting any of `providers` (all devices if empty)
    async fn scan(&self, providers: &[String]) -> InfoCacheResult<Vec<ScannedInterface>>;
}

/// Maps an OS network interface to the NUMA node it is attached to
pub trait NumaResolver: Send + Sync {
    /// `None` if the affinity is unknown
    fn numa_node(&self, net_iface: &str) -> Option<u32>;
}
