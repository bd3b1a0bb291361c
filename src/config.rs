//! Simulation binary configuration

use clap::Parser;
use std::path::PathBuf;

/// Run one command request against an in-memory item registry
#[derive(Debug, Clone, Parser)]
#[command(name = "intent-bridge", version, about)]
pub struct BridgeConfig {
    /// JSON array of items seeding the registry
    #[arg(short, long, env = "INTENT_BRIDGE_ITEMS")]
    pub items: PathBuf,

    /// JSON command request to execute
    #[arg(short, long, env = "INTENT_BRIDGE_REQUEST")]
    pub request: PathBuf,

    /// Leave item states untouched when commands arrive
    #[arg(long, env = "INTENT_BRIDGE_FROZEN")]
    pub frozen: bool,
}
