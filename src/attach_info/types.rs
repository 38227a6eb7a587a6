//! GetAttachInfo request and response

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetAttachInfoReq {
    /// System name; empty for the default system
    pub system: String,

    /// Request URIs for all ranks rather than service ranks only
    pub all_ranks: bool,
}

impl GetAttachInfoReq {
    pub fn new(system: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            all_ranks: false,
        }
    }
}

/// A rank and the URI a client uses to reach it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryServiceRank {
    pub rank: u32,
    pub uri: String,
}

/// Network settings the servers ask clients to use
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientNetworkHint {
    pub provider: String,
    pub interface: String,
    pub domain: String,
    pub crt_ctx_share_addr: u32,
    pub crt_timeout: u32,
    /// Raw ARPHRD device class
    pub net_dev_class: u32,
    pub srv_srx_set: i32,
    pub env_vars: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetAttachInfoResp {
    pub system: String,
    pub service_ranks: Vec<PrimaryServiceRank>,
    /// Ranks hosting a management service replica
    pub ms_ranks: Vec<u32>,
    pub client_net_hint: ClientNetworkHint,
}
