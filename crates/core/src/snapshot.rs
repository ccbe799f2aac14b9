//! Machine state capture for inspection and regression diffs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tickbed_config::StopReason;

pub const SNAPSHOT_SCHEMA: &str = "tickbed-board";

/// Point-in-time machine state. Device entries carry whatever each model
/// reports; devices with nothing to say are omitted.
#[derive(Debug, Serialize, Deserialize)]
pub struct MachineSnapshot {
    pub schema: String,
    pub cycles: u64,
    pub stop_reason: Option<StopReason>,
    pub devices: HashMap<String, serde_json::Value>,
}
