//! Watch command - keep the caches warm until interrupted
//!
//! SIGHUP forces a refresh of both caches, mirroring how an operator pokes
//! a running agent after the fabric or system membership changed.

use super::open_info_cache;
use crate::cli::SourceArgs;
use crate::config::Config;
use crate::error::{InfoCacheError, InfoCacheResult};
use crate::info_cache::InfoCache;
use crate::ui::{self, UiContext};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, warn};

/// Execute the watch command
pub async fn execute(sources: &SourceArgs, config: &Config) -> InfoCacheResult<()> {
    let ctx = UiContext::detect();
    let cache = open_info_cache(sources, config).await?;

    let mut hangup = signal(SignalKind::hangup())
        .map_err(|e| InfoCacheError::io("installing SIGHUP handler", e))?;

    refresh(&cache, &ctx).await;
    info!("watching; send SIGHUP to refresh, Ctrl-C to exit");

    loop {
        tokio::select! {
            _ = hangup.recv() => {
                info!("SIGHUP received");
                refresh(&cache, &ctx).await;
            }
            res = tokio::signal::ctrl_c() => {
                res.map_err(|e| InfoCacheError::io("waiting for Ctrl-C", e))?;
                info!("interrupted, exiting");
                return Ok(());
            }
        }
    }
}

/// Refresh both caches and print their state; failures are reported, not fatal
async fn refresh(cache: &InfoCache, ctx: &UiContext) {
    if let Err(e) = cache.refresh().await {
        if e.is_retryable() {
            warn!("refresh failed, will retry on next SIGHUP: {}", e);
        } else {
            warn!("refresh failed: {}", e);
        }
        ui::step_error_detail(ctx, "Refresh failed", &e.to_string());
    }

    for status in cache.status().await {
        ui::section(ctx, &format!("{} cache", status.kind));
        let enabled = if status.enabled {
            if status.refresh_interval.is_zero() {
                "enabled (manual refresh)".to_string()
            } else {
                format!("enabled (every {:?})", status.refresh_interval)
            }
        } else {
            "disabled".to_string()
        };
        ui::key_value_status(ctx, "state", &enabled, status.enabled);

        for item in status.items {
            let cached = item
                .last_cached
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "never".to_string());
            ui::key_value_status(ctx, &item.key, &format!("cached {}", cached), !item.stale);
        }
    }
}
