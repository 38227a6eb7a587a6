//! Select command - pick a fabric interface for a client

use super::open_info_cache;
use crate::cli::args::SelectArgs;
use crate::cli::SourceArgs;
use crate::config::Config;
use crate::error::{InfoCacheError, InfoCacheResult};
use crate::ui::{self, UiContext};

/// Execute the select command
pub async fn execute(args: SelectArgs, sources: &SourceArgs, config: &Config) -> InfoCacheResult<()> {
    let cache = open_info_cache(sources, config).await?;
    let fi = cache
        .get_fabric_device(args.numa, args.class, &args.provider)
        .await?;

    if args.json {
        let json = serde_json::to_string_pretty(&fi)
            .map_err(|e| InfoCacheError::Internal(format!("serializing interface: {}", e)))?;
        println!("{}", json);
        return Ok(());
    }

    let ctx = UiContext::detect();
    ui::step_ok(&ctx, &format!("Selected {}", fi));
    ui::key_value(&ctx, "interface", &fi.name);
    ui::key_value(&ctx, "domain", &fi.domain);
    ui::key_value(&ctx, "class", fi.net_dev_class.name());
    ui::key_value(&ctx, "provider", &args.provider);

    Ok(())
}
