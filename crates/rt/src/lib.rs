//! The bare-metal runtime core: polled UART console, periodic interrupt
//! timer, and formatted I/O, all written against an abstract register bus so
//! the same driver code runs on the target and on the simulated board.

#![cfg_attr(not(test), no_std)]

pub mod bus;
pub mod console;
pub mod fmt;
pub mod isr;
pub mod memmap;
pub mod num;
pub mod poll;
pub mod rand;
pub mod timer;
pub mod uart;

#[cfg(test)]
pub(crate) mod testbus;

pub use bus::{PhysBus, RegisterBus};
pub use console::{Console, Ring, RING_DEPTH};
pub use isr::{IrqHandler, TickIsr, TickStats};
pub use timer::{Timer, TimerMap};
pub use uart::{Uart, UartMap};
