//! Main-context console: the UART plus the drain side of the handler ring.

use heapless::spsc::{Consumer, Producer, Queue};

use crate::bus::RegisterBus;
use crate::fmt::{LineSource, Sink};
use crate::uart::Uart;

/// Depth of the handler-to-console ring. Power of two; the usable capacity
/// is one byte less than the depth.
pub const RING_DEPTH: usize = 256;

pub type Ring = Queue<u8, RING_DEPTH>;
pub type RingProducer<'a> = Producer<'a, u8, RING_DEPTH>;
pub type RingConsumer<'a> = Consumer<'a, u8, RING_DEPTH>;

/// All main-loop console traffic goes through here.
///
/// `write_str` and [`Console::io`] drain the ring before the caller's own
/// bytes, so a line the handler queued earlier lands on the wire first and
/// neither stream is ever split mid-line. An interrupt arriving mid-write
/// only appends to the ring; its text waits for the next drain point.
///
/// The alternative mitigation, handler-owned UART writes bracketed by
/// interrupt masking in the main context, trades the ring's memory for
/// added interrupt latency; this runtime does not use it.
pub struct Console<'q> {
    uart: Uart,
    ring: RingConsumer<'q>,
}

impl<'q> Console<'q> {
    pub fn new(uart: Uart, ring: RingConsumer<'q>) -> Self {
        Self { uart, ring }
    }

    /// Push every queued handler byte out the UART.
    pub fn pump<B: RegisterBus + ?Sized>(&mut self, bus: &mut B) {
        while let Some(b) = self.ring.dequeue() {
            self.uart.put_byte(bus, b);
        }
    }

    /// Drain the ring, then send `s` contiguously.
    pub fn write_str<B: RegisterBus + ?Sized>(&mut self, bus: &mut B, s: &str) {
        self.pump(bus);
        self.uart.put_str(bus, s);
    }

    /// Line input with echo; see [`Uart::read_line`].
    pub fn read_line<B: RegisterBus + ?Sized>(&mut self, bus: &mut B, buf: &mut [u8]) -> usize {
        self.uart.read_line(bus, buf)
    }

    /// Borrow the console and a bus together as a formatting target and
    /// line source. Creating the adapter is one drain point: queued handler
    /// text goes out first, then everything written through the adapter,
    /// unsplit.
    pub fn io<'a, B: RegisterBus + ?Sized>(&'a mut self, bus: &'a mut B) -> ConsoleIo<'a, 'q, B> {
        self.pump(bus);
        ConsoleIo { console: self, bus }
    }
}

/// A console plus the bus it talks through, usable with [`crate::fmt`].
pub struct ConsoleIo<'a, 'q, B: RegisterBus + ?Sized> {
    console: &'a mut Console<'q>,
    bus: &'a mut B,
}

impl<B: RegisterBus + ?Sized> Sink for ConsoleIo<'_, '_, B> {
    fn put_byte(&mut self, b: u8) {
        self.console.uart.put_byte(self.bus, b);
    }
}

impl<B: RegisterBus + ?Sized> LineSource for ConsoleIo<'_, '_, B> {
    fn read_line(&mut self, buf: &mut [u8]) -> usize {
        self.console.uart.read_line(self.bus, buf)
    }
}
