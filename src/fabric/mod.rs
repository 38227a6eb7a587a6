//! Fabric interface discovery results and NUMA-aware selection
//!
//! A scan yields a flat list of fabric devices. Each OS network interface on
//! those devices is placed under the NUMA node it is attached to, keeping
//! scan order, to form a [`NumaFabric`]. Selection picks the first interface
//! matching a device class and provider, preferring the caller's NUMA node.

mod cached;
mod numa;
mod scan;
mod topology;
mod types;

pub use cached::{CachedFabricInfo, FABRIC_KEY};
pub use numa::NumaFabric;
pub use scan::{FabricScanner, NumaResolver};
pub use topology::StaticTopology;
pub use types::{FabricInterface, NetDevClass, ScannedInterface};
