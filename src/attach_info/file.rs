//! Attach info served from a JSON file
//!
//! The file is re-read on every fetch so an operator can update it in place
//! and trigger a refresh.

use super::types::{GetAttachInfoReq, GetAttachInfoResp};
use super::AttachInfoFetcher;
use crate::error::{InfoCacheError, InfoCacheResult};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

pub struct FileAttachInfo {
    path: PathBuf,
}

impl FileAttachInfo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AttachInfoFetcher for FileAttachInfo {
    async fn get_attach_info(&self, req: &GetAttachInfoReq) -> InfoCacheResult<GetAttachInfoResp> {
        let content = fs::read_to_string(&self.path).await.map_err(|e| {
            InfoCacheError::AttachInfoFetch(format!("reading {}: {}", self.path.display(), e))
        })?;

        let resp: GetAttachInfoResp = serde_json::from_str(&content).map_err(|e| {
            InfoCacheError::AttachInfoFetch(format!("parsing {}: {}", self.path.display(), e))
        })?;

        if !req.system.is_empty() && !resp.system.is_empty() && req.system != resp.system {
            return Err(InfoCacheError::AttachInfoFetch(format!(
                "system name mismatch: requested {:?}, got {:?}",
                req.system, resp.system
            )));
        }

        debug!("Read attach info for {:?} from {}", resp.system, self.path.display());
        Ok(resp)
    }
}
