//! Cluster attach info: the control-plane response a client needs to join
//! the system, cached per system name.

mod cached;
mod file;
mod types;

pub use cached::{attach_info_key, CachedAttachInfo, ATTACH_INFO_KEY};
pub use file::FileAttachInfo;
pub use types::{ClientNetworkHint, GetAttachInfoReq, GetAttachInfoResp, PrimaryServiceRank};

use crate::error::InfoCacheResult;
use async_trait::async_trait;

/// Issues the GetAttachInfo request to the management service
#[async_trait]
pub trait AttachInfoFetcher: Send + Sync {
    async fn get_attach_info(&self, req: &GetAttachInfoReq) -> InfoCacheResult<GetAttachInfoResp>;
}
