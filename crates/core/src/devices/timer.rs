//! Up-counting overflow timer modeled on the DMTIMER block.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bitflags::bitflags;
use serde_json::json;
use tickbed_rt::memmap;

use crate::Device;

bitflags! {
    /// Control register bits the model honors.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Tclr: u32 {
        const ST = 1 << 0;
        const AR = 1 << 1;
    }
}

/// Overflow timer with auto-reload.
///
/// The counter increments on every second crystal cycle, matching the fixed
/// /2 divider between the crystal and the timer's functional clock. On wrap
/// it raises the overflow bit in TISR and reloads from TLDR when auto-reload
/// is set, so the period stays exact no matter how long the handler takes.
///
/// The whole block sits behind a module clock gate: while the gate is off,
/// reads return zero and writes are dropped.
#[derive(Debug)]
pub struct DmTimer {
    clock_on: Arc<AtomicBool>,
    tclr: Tclr,
    tisr: u32,
    tier: u32,
    tcrr: u32,
    tldr: u32,
    phase: bool,
    pub overflows: u64,
}

impl DmTimer {
    pub fn new(clock_on: Arc<AtomicBool>) -> Self {
        Self {
            clock_on,
            tclr: Tclr::empty(),
            tisr: 0,
            tier: 0,
            tcrr: 0,
            tldr: 0,
            phase: false,
            overflows: 0,
        }
    }

    fn gated_off(&self) -> bool {
        !self.clock_on.load(Ordering::Relaxed)
    }

    fn count_up(&mut self) {
        let (next, wrapped) = self.tcrr.overflowing_add(1);
        if !wrapped {
            self.tcrr = next;
            return;
        }
        self.overflows += 1;
        self.tisr |= memmap::TIMER_OVF;
        if self.tclr.contains(Tclr::AR) {
            self.tcrr = self.tldr;
        } else {
            self.tclr.remove(Tclr::ST);
            self.tcrr = 0;
        }
    }

    /// Interrupt line level: overflow pending, enabled, and clocked.
    fn level(&self) -> bool {
        !self.gated_off() && (self.tisr & self.tier & memmap::TIMER_OVF) != 0
    }
}

impl Device for DmTimer {
    fn read(&mut self, offset: u32) -> u32 {
        if self.gated_off() {
            return 0;
        }
        match offset {
            memmap::TIMER_TISR => self.tisr,
            memmap::TIMER_TIER => self.tier,
            memmap::TIMER_TCLR => self.tclr.bits(),
            memmap::TIMER_TCRR => self.tcrr,
            memmap::TIMER_TLDR => self.tldr,
            _ => 0,
        }
    }

    fn write(&mut self, offset: u32, value: u32) {
        if self.gated_off() {
            tracing::debug!(offset, value, "write to clock-gated timer dropped");
            return;
        }
        match offset {
            // W1C, only the three event bits
            memmap::TIMER_TISR => self.tisr &= !(value & 0x7),
            memmap::TIMER_TIER => self.tier = value & 0x7,
            memmap::TIMER_TCLR => self.tclr = Tclr::from_bits_truncate(value),
            memmap::TIMER_TCRR => self.tcrr = value,
            memmap::TIMER_TLDR => self.tldr = value,
            _ => {}
        }
    }

    fn tick(&mut self) -> bool {
        if !self.gated_off() && self.tclr.contains(Tclr::ST) {
            self.phase = !self.phase;
            if !self.phase {
                self.count_up();
            }
        }
        self.level()
    }

    fn as_any(&self) -> Option<&dyn std::any::Any> {
        Some(self)
    }

    fn as_any_mut(&mut self) -> Option<&mut dyn std::any::Any> {
        Some(self)
    }

    fn snapshot(&self) -> serde_json::Value {
        json!({
            "tclr": self.tclr.bits(),
            "tisr": self.tisr,
            "tier": self.tier,
            "tcrr": self.tcrr,
            "tldr": self.tldr,
            "overflows": self.overflows,
        })
    }
}
