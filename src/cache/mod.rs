//! Generic in-memory item cache
//!
//! Maps string keys to refreshable items. Refresh is pull-based: an item is
//! only refetched when a caller asks for it and the item reports staleness,
//! or when a refresh is forced.
//!
//! # Concurrency
//!
//! | Operation | Lock held |
//! |-----------|-----------|
//! | `set` / `has` / `keys` | map lock, briefly |
//! | `get` / `refresh` | the item's own slot lock, for the refresh only |
//!
//! Concurrent callers on one key share a single fetch. Callers on different
//! keys never wait on each other.

mod item;
mod store;

pub use item::{CacheItem, Freshness};
pub(crate) use store::with_timeout;
pub use store::{ItemCache, ItemStatus};
