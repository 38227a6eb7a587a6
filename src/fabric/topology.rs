//! Fixed topology loaded from a TOML file
//!
//! Stands in for hardware discovery on nodes where the scan results are
//! known ahead of time, and in tests.
//!
//! ```toml
//! [[interface]]
//! name = "mlx5_0"
//! net_interfaces = ["ib0"]
//! class = "infiniband"
//! providers = ["ofi+verbs", "ofi+tcp"]
//!
//! [numa]
//! ib0 = 1
//! ```

use super::scan::{FabricScanner, NumaResolver};
use super::types::ScannedInterface;
use crate::error::{InfoCacheError, InfoCacheResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticTopology {
    #[serde(default, rename = "interface")]
    interfaces: Vec<ScannedInterface>,

    /// Network interface name to NUMA node
    #[serde(default)]
    numa: BTreeMap<String, u32>,
}

impl StaticTopology {
    pub fn new(interfaces: Vec<ScannedInterface>, numa: BTreeMap<String, u32>) -> Self {
        Self { interfaces, numa }
    }

    /// Load a topology file
    pub async fn load(path: &Path) -> InfoCacheResult<Self> {
        let content = fs::read_to_string(path).await.map_err(|e| {
            InfoCacheError::io(format!("reading topology from {}", path.display()), e)
        })?;
        let topo = Self::parse(path, &content)?;
        debug!(
            "Loaded {} fabric devices from {}",
            topo.interfaces.len(),
            path.display()
        );
        Ok(topo)
    }

    fn parse(path: &Path, content: &str) -> InfoCacheResult<Self> {
        toml::from_str(content).map_err(|e| InfoCacheError::TopologyInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn interfaces(&self) -> &[ScannedInterface] {
        &self.interfaces
    }
}

#[async_trait]
impl FabricScanner for StaticTopology {
    async fn scan(&self, providers: &[String]) -> InfoCacheResult<Vec<ScannedInterface>> {
        Ok(self
            .interfaces
            .iter()
            .filter(|dev| dev.supports_any(providers))
            .cloned()
            .collect())
    }
}

impl NumaResolver for StaticTopology {
    fn numa_node(&self, net_iface: &str) -> Option<u32> {
        self.numa.get(net_iface).copied()
    }
}
