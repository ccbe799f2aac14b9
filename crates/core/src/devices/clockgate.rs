//! Clock-manager module gate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::json;

use crate::Device;

/// Single CLKCTRL register driving a shared enable flag.
///
/// MODULEMODE lives in the low two bits; `0x2` means enabled. The gated
/// device polls the flag through the `Arc`.
#[derive(Debug)]
pub struct ClockGate {
    enabled: Arc<AtomicBool>,
    reg: u32,
    raw: u32,
}

impl ClockGate {
    pub fn new(enabled: Arc<AtomicBool>, reg: u32) -> Self {
        Self {
            enabled,
            reg,
            raw: 0,
        }
    }
}

impl Device for ClockGate {
    fn read(&mut self, offset: u32) -> u32 {
        if offset == self.reg {
            self.raw
        } else {
            0
        }
    }

    fn write(&mut self, offset: u32, value: u32) {
        if offset == self.reg {
            self.raw = value;
            self.enabled.store(value & 0x3 == 0x2, Ordering::Relaxed);
        }
    }

    fn snapshot(&self) -> serde_json::Value {
        json!({ "enabled": self.enabled.load(Ordering::Relaxed) })
    }
}
