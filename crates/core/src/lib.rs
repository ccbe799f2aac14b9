//! TickBed simulation core.
//!
//! Hosts the reference runtime from `tickbed-rt` on a software model of its
//! board: a PL011-style console UART, a DMTIMER-style overflow timer behind a
//! clock gate, and an interrupt controller with per-bank mask registers. The
//! [`machine::Machine`] owns the board, counts crystal cycles, and delivers
//! one interrupt at a time between register accesses, which is exactly where
//! a real core would take them.

use std::any::Any;

pub mod board;
pub mod devices;
pub mod machine;
pub mod program;
pub mod snapshot;


/// Errors surfaced by the simulation core.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("bus fault: no device at {0:#010x}")]
    BusFault(u32),
}

pub type SimResult<T> = Result<T, SimError>;

/// A memory-mapped device on the simulated board.
///
/// Offsets are relative to the device's base address. `tick` advances the
/// device by one crystal cycle and reports its interrupt line level; devices
/// without a line keep the default.
pub trait Device: std::fmt::Debug + Send {
    fn read(&mut self, offset: u32) -> u32;

    fn write(&mut self, offset: u32, value: u32);

    fn tick(&mut self) -> bool {
        false
    }

    fn as_any(&self) -> Option<&dyn Any> {
        None
    }

    fn as_any_mut(&mut self) -> Option<&mut dyn Any> {
        None
    }

    /// Device state for snapshots. `Null` means the device has nothing
    /// worth recording.
    fn snapshot(&self) -> serde_json::Value {
        serde_json::Value::Null
    }
}
