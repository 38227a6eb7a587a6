//! NUMA-organized fabric topology and interface selection

use super::scan::NumaResolver;
use super::types::{FabricInterface, NetDevClass, ScannedInterface};
use crate::error::{InfoCacheError, InfoCacheResult};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Fabric interfaces grouped by NUMA node, each list in scan order
///
/// Built once per scan and never mutated afterwards; a new scan produces a
/// new value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumaFabric {
    numa_map: BTreeMap<u32, Vec<FabricInterface>>,
}

impl NumaFabric {
    /// Group scan results by NUMA node
    ///
    /// Interfaces named in `ignored` are skipped. Interfaces with unknown
    /// affinity land on node 0. A name already seen on a node is dropped.
    pub fn from_scan(
        scan: &[ScannedInterface],
        ignored: &BTreeSet<String>,
        resolver: Option<&dyn NumaResolver>,
    ) -> Self {
        let mut numa_map: BTreeMap<u32, Vec<FabricInterface>> = BTreeMap::new();

        for dev in scan {
            for net_iface in &dev.net_interfaces {
                if ignored.contains(net_iface) {
                    debug!(iface = %net_iface, "skipping ignored fabric interface");
                    continue;
                }

                let numa = resolver.and_then(|r| r.numa_node(net_iface)).unwrap_or_else(|| {
                    debug!(iface = %net_iface, "NUMA affinity unknown, using node 0");
                    0
                });

                let ifaces = numa_map.entry(numa).or_default();
                if ifaces.iter().any(|fi| fi.name == *net_iface) {
                    debug!(iface = %net_iface, numa, "duplicate fabric interface dropped");
                    continue;
                }
                ifaces.push(FabricInterface {
                    name: net_iface.clone(),
                    domain: dev.name.clone(),
                    net_dev_class: dev.class,
                    providers: dev.providers.clone(),
                });
            }
        }

        Self { numa_map }
    }

    /// Build directly from per-node lists
    pub fn from_map(numa_map: BTreeMap<u32, Vec<FabricInterface>>) -> Self {
        Self { numa_map }
    }

    pub fn is_empty(&self) -> bool {
        self.numa_map.values().all(Vec::is_empty)
    }

    pub fn num_numa_nodes(&self) -> usize {
        self.numa_map.len()
    }

    pub fn num_devices(&self, numa: u32) -> usize {
        self.numa_map.get(&numa).map_or(0, Vec::len)
    }

    pub fn interfaces(&self, numa: u32) -> &[FabricInterface] {
        self.numa_map.get(&numa).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Nodes in ascending order with their interfaces
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[FabricInterface])> {
        self.numa_map.iter().map(|(n, v)| (*n, v.as_slice()))
    }

    /// Pick an interface of `class` supporting `provider`
    ///
    /// The requested NUMA node is searched first, then every other node in
    /// ascending order. Within a node the first match in scan order wins.
    pub fn find_device(
        &self,
        numa: u32,
        class: NetDevClass,
        provider: &str,
    ) -> InfoCacheResult<FabricInterface> {
        let matches = |fi: &&FabricInterface| fi.net_dev_class.satisfies(class) && fi.supports(provider);

        if let Some(fi) = self.interfaces(numa).iter().find(matches) {
            debug!(numa, iface = %fi.name, "selected fabric interface on requested NUMA node");
            return Ok(fi.clone());
        }

        for (node, ifaces) in self.iter().filter(|(node, _)| *node != numa) {
            if let Some(fi) = ifaces.iter().find(matches) {
                debug!(
                    requested = numa,
                    numa = node,
                    iface = %fi.name,
                    "selected fabric interface on another NUMA node"
                );
                return Ok(fi.clone());
            }
        }

        Err(InfoCacheError::NoSuitableFabricInterface {
            class,
            provider: provider.to_string(),
        })
    }
}
