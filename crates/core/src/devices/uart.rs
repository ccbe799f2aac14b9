//! Console UART model with a PL011-style DR/FR register pair.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::json;
use tickbed_rt::memmap;

use crate::Device;

/// One transmitted byte, stamped with the cycle the DR write landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TxEvent {
    pub cycle: u64,
    pub byte: u8,
}

/// Polled console UART.
///
/// TX is never lost: every DR write is journaled with its cycle stamp, and
/// the flag register holds TXFF for `tx_cost` cycles afterwards so the
/// runtime's busy-wait actually waits. RX pops from a scripted queue and
/// reads as empty once the script runs out.
///
/// `fail_open` flips both flags permanently ready and makes an empty DR read
/// return `'\n'`; the machine sets it once a run has stopped so blocked polls
/// unwind instead of spinning forever.
#[derive(Debug)]
pub struct ConsoleUart {
    clock: Arc<AtomicU64>,
    tx: Vec<TxEvent>,
    rx: VecDeque<u8>,
    tx_cost: u32,
    tx_busy: u32,
    fail_open: bool,
}

impl ConsoleUart {
    pub fn new(clock: Arc<AtomicU64>) -> Self {
        Self {
            clock,
            tx: Vec::new(),
            rx: VecDeque::new(),
            tx_cost: 0,
            tx_busy: 0,
            fail_open: false,
        }
    }

    /// Cycles the transmitter stays busy after each DR write.
    pub fn set_tx_cost(&mut self, cycles: u32) {
        self.tx_cost = cycles;
    }

    pub fn push_input(&mut self, text: &str) {
        self.rx.extend(text.bytes());
    }

    pub fn fail_open(&mut self) {
        self.fail_open = true;
    }

    pub fn tx_events(&self) -> &[TxEvent] {
        &self.tx
    }

    pub fn tx_bytes(&self) -> Vec<u8> {
        self.tx.iter().map(|e| e.byte).collect()
    }

    pub fn tx_string(&self) -> String {
        String::from_utf8_lossy(&self.tx_bytes()).into_owned()
    }
}

impl Device for ConsoleUart {
    fn read(&mut self, offset: u32) -> u32 {
        match offset {
            memmap::UART_DR => match self.rx.pop_front() {
                Some(b) => u32::from(b),
                None if self.fail_open => u32::from(b'\n'),
                None => 0,
            },
            memmap::UART_FR => {
                if self.fail_open {
                    return 0;
                }
                let mut fr = 0;
                if self.tx_busy > 0 {
                    fr |= memmap::UART_FR_TXFF;
                }
                if self.rx.is_empty() {
                    fr |= memmap::UART_FR_RXFE;
                }
                fr
            }
            _ => 0,
        }
    }

    fn write(&mut self, offset: u32, value: u32) {
        if offset == memmap::UART_DR {
            self.tx.push(TxEvent {
                cycle: self.clock.load(Ordering::Relaxed),
                byte: (value & 0xFF) as u8,
            });
            self.tx_busy = self.tx_cost;
        }
    }

    fn tick(&mut self) -> bool {
        if self.tx_busy > 0 {
            self.tx_busy -= 1;
        }
        false
    }

    fn as_any(&self) -> Option<&dyn std::any::Any> {
        Some(self)
    }

    fn as_any_mut(&mut self) -> Option<&mut dyn std::any::Any> {
        Some(self)
    }

    fn snapshot(&self) -> serde_json::Value {
        json!({
            "tx_len": self.tx.len(),
            "rx_pending": self.rx.len(),
            "fail_open": self.fail_open,
        })
    }
}
