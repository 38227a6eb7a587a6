//! infocache - agent-side caching of attach info and fabric topology
//!
//! Compute-node agents answer two questions for every client process: how
//! to reach the storage system (attach info) and which local network
//! interface to use (fabric selection). Both answers are expensive to
//! produce, so they are cached here with per-resource enable switches and
//! demand-driven refresh.

pub mod attach_info;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod fabric;
pub mod info_cache;
pub mod ui;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{InfoCacheError, InfoCacheResult};
pub use info_cache::{CacheKind, CacheStatus, InfoCache, InfoCacheBuilder};
