//! Polled console UART driver.

use crate::bus::RegisterBus;
use crate::memmap;
use crate::poll;

/// Addresses of the two console registers.
#[derive(Clone, Copy, Debug)]
pub struct UartMap {
    pub dr: u32,
    pub fr: u32,
}

impl UartMap {
    /// PL011-compatible block at `base`.
    pub const fn pl011(base: u32) -> Self {
        Self {
            dr: base + memmap::UART_DR,
            fr: base + memmap::UART_FR,
        }
    }

    /// The board's console UART.
    pub const fn board() -> Self {
        Self::pl011(memmap::UART0_BASE)
    }
}

/// The console driver. Holds only its register map; every operation borrows
/// the bus, so one instance serves the real device and the simulated one
/// alike. No operation can fail: absent hardware blocks forever instead.
#[derive(Clone, Copy, Debug)]
pub struct Uart {
    map: UartMap,
}

impl Uart {
    pub const fn new(map: UartMap) -> Self {
        Self { map }
    }

    /// Block until the transmit FIFO has room, then send the byte.
    pub fn put_byte<B: RegisterBus + ?Sized>(&self, bus: &mut B, b: u8) {
        let fr = self.map.fr;
        poll::spin_while(bus, |bus| bus.load(fr) & memmap::UART_FR_TXFF != 0);
        bus.store(self.map.dr, b as u32);
    }

    /// Block until a byte arrives, then take it.
    pub fn get_byte<B: RegisterBus + ?Sized>(&self, bus: &mut B) -> u8 {
        let fr = self.map.fr;
        poll::spin_while(bus, |bus| bus.load(fr) & memmap::UART_FR_RXFE != 0);
        (bus.load(self.map.dr) & 0xFF) as u8
    }

    /// Send every byte of `s`. No terminator is appended.
    pub fn put_str<B: RegisterBus + ?Sized>(&self, bus: &mut B, s: &str) {
        for b in s.bytes() {
            self.put_byte(bus, b);
        }
    }

    /// Read one line, echoing as it goes.
    ///
    /// `\n` or `\r` ends the line; it is echoed as `\n` and not stored.
    /// Collection stops unconditionally once `buf.len() - 1` bytes are in,
    /// and whatever was typed past that stays in the receive FIFO for the
    /// next call. Returns the count stored; the tail of `buf` is untouched.
    pub fn read_line<B: RegisterBus + ?Sized>(&self, bus: &mut B, buf: &mut [u8]) -> usize {
        let mut n = 0;
        while n + 1 < buf.len() {
            let b = self.get_byte(bus);
            if b == b'\n' || b == b'\r' {
                self.put_byte(bus, b'\n');
                return n;
            }
            self.put_byte(bus, b);
            buf[n] = b;
            n += 1;
        }
        n
    }
}
