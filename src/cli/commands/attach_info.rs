//! Attach-info command - dump the GetAttachInfo response as JSON

use super::open_info_cache;
use crate::cli::args::AttachInfoArgs;
use crate::cli::SourceArgs;
use crate::config::Config;
use crate::error::{InfoCacheError, InfoCacheResult};

/// Execute the attach-info command
pub async fn execute(
    args: AttachInfoArgs,
    sources: &SourceArgs,
    config: &Config,
) -> InfoCacheResult<()> {
    let cache = open_info_cache(sources, config).await?;
    let system = args.system.as_deref().unwrap_or_default();
    let resp = cache.get_attach_info(system).await?;

    let json = serde_json::to_string_pretty(resp.as_ref())
        .map_err(|e| InfoCacheError::Internal(format!("serializing attach info: {}", e)))?;
    println!("{}", json);

    Ok(())
}
