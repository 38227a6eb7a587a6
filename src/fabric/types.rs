//! Fabric data types

use crate::error::InfoCacheError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Hardware class of a network device (ARPHRD values)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetDevClass {
    Ether,
    Infiniband,
    Loopback,
    /// Matches any class when requested
    Any,
}

impl NetDevClass {
    const ARPHRD_ETHER: u32 = 1;
    const ARPHRD_INFINIBAND: u32 = 32;
    const ARPHRD_LOOPBACK: u32 = 772;
    const ANY: u32 = u32::MAX;

    /// Map a raw ARPHRD number
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            Self::ARPHRD_ETHER => Some(Self::Ether),
            Self::ARPHRD_INFINIBAND => Some(Self::Infiniband),
            Self::ARPHRD_LOOPBACK => Some(Self::Loopback),
            Self::ANY => Some(Self::Any),
            _ => None,
        }
    }

    pub fn as_raw(&self) -> u32 {
        match self {
            Self::Ether => Self::ARPHRD_ETHER,
            Self::Infiniband => Self::ARPHRD_INFINIBAND,
            Self::Loopback => Self::ARPHRD_LOOPBACK,
            Self::Any => Self::ANY,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ether => "ether",
            Self::Infiniband => "infiniband",
            Self::Loopback => "loopback",
            Self::Any => "any",
        }
    }

    /// Whether a device of this class satisfies a request for `requested`
    pub fn satisfies(&self, requested: NetDevClass) -> bool {
        requested == NetDevClass::Any || *self == requested
    }
}

impl fmt::Display for NetDevClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NetDevClass {
    type Err = InfoCacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ether" | "ethernet" => Ok(Self::Ether),
            "infiniband" | "ib" => Ok(Self::Infiniband),
            "loopback" | "lo" => Ok(Self::Loopback),
            "any" => Ok(Self::Any),
            other => other
                .parse::<u32>()
                .ok()
                .and_then(Self::from_raw)
                .ok_or_else(|| InfoCacheError::InvalidNetDevClass(s.to_string())),
        }
    }
}

/// One fabric device as reported by a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedInterface {
    /// Device name, e.g. `mlx5_0`
    pub name: String,

    /// OS network interfaces backed by this device
    #[serde(default)]
    pub net_interfaces: BTreeSet<String>,

    pub class: NetDevClass,

    /// Fabric providers usable on this device
    #[serde(default)]
    pub providers: BTreeSet<String>,
}

impl ScannedInterface {
    pub fn supports_any(&self, providers: &[String]) -> bool {
        providers.is_empty() || providers.iter().any(|p| self.providers.contains(p))
    }
}

/// A network interface a client can be pointed at
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FabricInterface {
    /// OS network interface name
    pub name: String,

    /// Fabric device the interface belongs to
    pub domain: String,

    pub net_dev_class: NetDevClass,

    pub providers: BTreeSet<String>,
}

impl FabricInterface {
    pub fn supports(&self, provider: &str) -> bool {
        self.providers.contains(provider)
    }
}

impl fmt::Display for FabricInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (domain: {}, class: {})", self.name, self.domain, self.net_dev_class)
    }
}
