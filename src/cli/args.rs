//! CLI argument definitions using clap derive

use crate::fabric::NetDevClass;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// infocache - agent-side attach info and fabric cache
///
/// Serves cached attach info and NUMA-aware fabric interface selection
/// from file-backed sources.
#[derive(Parser, Debug)]
#[command(name = "infocache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "INFOCACHE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub sources: SourceArgs,
}

/// Overrides for the `[sources]` config section
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Fabric topology file (TOML)
    #[arg(long, global = true, env = "INFOCACHE_TOPOLOGY")]
    pub topology: Option<PathBuf>,

    /// GetAttachInfo response file (JSON)
    #[arg(long, global = true, env = "INFOCACHE_ATTACH_INFO")]
    pub attach_info: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show or initialize configuration
    Config(ConfigArgs),

    /// List fabric interfaces grouped by NUMA node
    NetScan(NetScanArgs),

    /// Select the fabric interface a client should use
    Select(SelectArgs),

    /// Print attach info for a system
    AttachInfo(AttachInfoArgs),

    /// Keep the caches warm, refreshing on SIGHUP until interrupted
    Watch,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Arguments for the net-scan command
#[derive(Parser, Debug)]
pub struct NetScanArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the select command
#[derive(Parser, Debug)]
pub struct SelectArgs {
    /// NUMA node the client runs on
    #[arg(short, long, default_value_t = 0)]
    pub numa: u32,

    /// Network device class (ether, infiniband, loopback, any)
    #[arg(long, default_value = "any")]
    pub class: NetDevClass,

    /// Fabric provider the client will use
    #[arg(short, long)]
    pub provider: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the attach-info command
#[derive(Parser, Debug)]
pub struct AttachInfoArgs {
    /// System name (defaults to agent.system_name)
    #[arg(short, long)]
    pub system: Option<String>,
}
