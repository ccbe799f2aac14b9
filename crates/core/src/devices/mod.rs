//! Device models for the reference board.

pub mod clockgate;
pub mod intc;
pub mod timer;
pub mod uart;

pub use clockgate::ClockGate;
pub use intc::{Intc, IntcState};
pub use timer::DmTimer;
pub use uart::ConsoleUart;
