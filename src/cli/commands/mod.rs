//! CLI command implementations

pub mod attach_info;
pub mod config;
pub mod net_scan;
pub mod select;
pub mod watch;

pub use attach_info::execute as attach_info;
pub use config::execute as config;
pub use net_scan::execute as net_scan;
pub use select::execute as select;
pub use watch::execute as watch;

use crate::attach_info::FileAttachInfo;
use crate::cli::SourceArgs;
use crate::config::Config;
use crate::error::InfoCacheResult;
use crate::fabric::StaticTopology;
use crate::info_cache::InfoCache;
use std::sync::Arc;
use tracing::debug;

/// Build the cache from config, with command-line source paths taking precedence
pub(crate) async fn open_info_cache(
    sources: &SourceArgs,
    config: &Config,
) -> InfoCacheResult<InfoCache> {
    let mut builder = InfoCache::builder().with_config(&config.agent);

    let topology = sources
        .topology
        .as_ref()
        .or(config.sources.topology_file.as_ref());
    if let Some(path) = topology {
        debug!("Using fabric topology {}", path.display());
        let topo = Arc::new(StaticTopology::load(path).await?);
        builder = builder
            .fabric_scanner(topo.clone())
            .numa_resolver(topo);
    }

    let attach_info = sources
        .attach_info
        .as_ref()
        .or(config.sources.attach_info_file.as_ref());
    if let Some(path) = attach_info {
        debug!("Using attach info from {}", path.display());
        builder = builder.attach_info_fetcher(Arc::new(FileAttachInfo::new(path)));
    }

    builder.build()
}
