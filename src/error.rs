//! Error types for the info cache
//!
//! All modules use `InfoCacheResult<T>` as their return type.

use crate::fabric::NetDevClass;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for info cache operations
pub type InfoCacheResult<T> = Result<T, InfoCacheError>;

/// All errors that can occur in the info cache
///
/// Errors are `Clone` so that a single failed refresh can be reported to
/// every caller that was waiting on it.
#[derive(Error, Debug, Clone)]
pub enum InfoCacheError {
    // Construction errors
    #[error("{0} is not initialized")]
    Uninitialized(&'static str),

    // Cache errors
    #[error("cache item not found: {0}")]
    ItemNotFound(String),

    #[error("cache item {0} holds no data")]
    ItemEmpty(String),

    #[error("refresh of {key} timed out after {timeout:?}")]
    RefreshTimeout { key: String, timeout: Duration },

    // Collaborator errors
    #[error("GetAttachInfo failed: {0}")]
    AttachInfoFetch(String),

    #[error("fabric scan failed: {0}")]
    FabricScan(String),

    // Selection errors
    #[error("no suitable fabric interface found of type {class} with provider {provider:?}")]
    NoSuitableFabricInterface {
        class: NetDevClass,
        provider: String,
    },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Invalid topology file {path}: {reason}")]
    TopologyInvalid { path: PathBuf, reason: String },

    #[error("Invalid network device class: {0}")]
    InvalidNetDevClass(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: Arc<std::io::Error>,
    },

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl InfoCacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source: Arc::new(source),
        }
    }

    /// Check if the error came from a collaborator and may succeed on retry
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::AttachInfoFetch(_) | Self::FabricScan(_) | Self::RefreshTimeout { .. }
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NoSuitableFabricInterface { .. } => {
                Some("Check exclude_fabric_ifaces and providers in the agent config")
            }
            Self::ConfigInvalid { .. } => Some("Run: infocache config show"),
            Self::Uninitialized("fabric scanner") => {
                Some("Pass --topology or set sources.topology_file")
            }
            Self::Uninitialized("attach info fetcher") => {
                Some("Pass --attach-info or set sources.attach_info_file")
            }
            Self::Uninitialized("info cache sources") => {
                Some("Pass --topology and/or --attach-info, or set them under [sources]")
            }
            Self::RefreshTimeout { .. } => Some("Raise agent.refresh_timeout_secs"),
            _ => None,
        }
    }
}
