//! Interrupt controller model.
//!
//! Level-sensitive: devices report their line level every cycle and the
//! pending banks track it. A line reaches the core only while unmasked, and
//! a taken interrupt latches `in_service` until software writes the ack bit
//! to the control register. The latch is what makes the handler's ack step
//! observable: skip it and delivery stops after the first interrupt.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use serde_json::json;
use tickbed_rt::memmap;

use crate::Device;

const BANKS: usize = 4;

/// Controller state shared between the bus-facing device and the machine's
/// dispatch loop.
#[derive(Debug)]
pub struct IntcState {
    pending: [AtomicU32; BANKS],
    mask: [AtomicU32; BANKS],
    in_service: AtomicBool,
    acks: AtomicU32,
}

impl Default for IntcState {
    fn default() -> Self {
        Self {
            pending: Default::default(),
            // all lines masked out of reset
            mask: [
                AtomicU32::new(!0),
                AtomicU32::new(!0),
                AtomicU32::new(!0),
                AtomicU32::new(!0),
            ],
            in_service: AtomicBool::new(false),
            acks: AtomicU32::new(0),
        }
    }
}

impl IntcState {
    pub fn set_line(&self, line: u32, level: bool) {
        let bank = (line / 32) as usize;
        if bank >= BANKS {
            return;
        }
        let bit = 1 << (line % 32);
        if level {
            self.pending[bank].fetch_or(bit, Ordering::Relaxed);
        } else {
            self.pending[bank].fetch_and(!bit, Ordering::Relaxed);
        }
    }

    /// True when an unmasked line is pending and no interrupt is in service.
    pub fn asserted(&self) -> bool {
        if self.in_service.load(Ordering::Relaxed) {
            return false;
        }
        self.pending
            .iter()
            .zip(&self.mask)
            .any(|(p, m)| p.load(Ordering::Relaxed) & !m.load(Ordering::Relaxed) != 0)
    }

    pub fn begin_service(&self) {
        self.in_service.store(true, Ordering::Relaxed);
    }

    fn unmask(&self, bank: usize, bits: u32) {
        if bank < BANKS {
            self.mask[bank].fetch_and(!bits, Ordering::Relaxed);
        }
    }

    fn acknowledge(&self) {
        self.acks.fetch_add(1, Ordering::Relaxed);
        self.in_service.store(false, Ordering::Relaxed);
    }

    /// Number of ack writes the controller has seen.
    pub fn acks(&self) -> u32 {
        self.acks.load(Ordering::Relaxed)
    }
}

/// Register interface over [`IntcState`].
#[derive(Debug)]
pub struct Intc {
    state: Arc<IntcState>,
    ilr_timer: u32,
}

impl Intc {
    pub fn new(state: Arc<IntcState>) -> Self {
        Self {
            state,
            ilr_timer: 0,
        }
    }
}

impl Device for Intc {
    fn read(&mut self, offset: u32) -> u32 {
        match offset {
            memmap::INTC_ILR_TIMER => self.ilr_timer,
            _ => 0,
        }
    }

    fn write(&mut self, offset: u32, value: u32) {
        match offset {
            memmap::INTC_CONTROL => {
                if value & 0x1 != 0 {
                    self.state.acknowledge();
                }
            }
            // MIR_CLEARn, one per bank of 32 lines
            0x88 | 0xA8 | 0xC8 | 0xE8 => {
                let bank = ((offset - 0x88) / 0x20) as usize;
                self.state.unmask(bank, value);
            }
            memmap::INTC_ILR_TIMER => self.ilr_timer = value,
            _ => {}
        }
    }

    fn snapshot(&self) -> serde_json::Value {
        let bank = memmap::TIMER_IRQ as usize / 32;
        json!({
            "pending2": self.state.pending[bank].load(Ordering::Relaxed),
            "mask2": self.state.mask[bank].load(Ordering::Relaxed),
            "in_service": self.state.in_service.load(Ordering::Relaxed),
            "acks": self.state.acks(),
        })
    }
}
