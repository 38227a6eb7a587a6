//! Net-scan command - list fabric interfaces per NUMA node

use super::open_info_cache;
use crate::cli::args::NetScanArgs;
use crate::cli::SourceArgs;
use crate::config::Config;
use crate::error::{InfoCacheError, InfoCacheResult};
use crate::fabric::FabricInterface;
use crate::ui::{self, UiContext};
use std::collections::BTreeMap;

/// Execute the net-scan command
pub async fn execute(args: NetScanArgs, sources: &SourceArgs, config: &Config) -> InfoCacheResult<()> {
    let cache = open_info_cache(sources, config).await?;
    let fabric = cache.get_numa_fabric().await?;

    if args.json {
        let by_node: BTreeMap<u32, &[FabricInterface]> = fabric.iter().collect();
        let json = serde_json::to_string_pretty(&by_node)
            .map_err(|e| InfoCacheError::Internal(format!("serializing fabric: {}", e)))?;
        println!("{}", json);
        return Ok(());
    }

    let ctx = UiContext::detect();
    if fabric.is_empty() {
        ui::step_warn_hint(
            &ctx,
            "No fabric interfaces found",
            "Check the topology file and agent.exclude_fabric_ifaces",
        );
        return Ok(());
    }

    for (numa, ifaces) in fabric.iter() {
        ui::section(&ctx, &format!("NUMA node {} ({} interfaces)", numa, ifaces.len()));
        for fi in ifaces {
            let providers: Vec<&str> = fi.providers.iter().map(String::as_str).collect();
            ui::key_value(
                &ctx,
                &fi.name,
                &format!("{} {} [{}]", fi.domain, fi.net_dev_class, providers.join(", ")),
            );
        }
    }

    Ok(())
}
