//! The timer interrupt handler.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::bus::RegisterBus;
use crate::console::RingProducer;
use crate::timer::Timer;

/// What the platform's interrupt glue calls when a line fires. The handler
/// owns the full contract: clear the source, acknowledge the controller,
/// then do its payload. It runs to completion; nothing on this core
/// preempts it.
pub trait IrqHandler {
    fn service(&mut self, bus: &mut dyn RegisterBus);
}

/// Counters the handler publishes for the main context to read.
#[derive(Debug, Default)]
pub struct TickStats {
    ticks: AtomicU32,
    dropped: AtomicU32,
}

impl TickStats {
    pub const fn new() -> Self {
        Self {
            ticks: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Periods serviced since boot.
    pub fn ticks(&self) -> u32 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Ring bytes lost because the main loop fell behind draining.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// The diagnostic line emitted once per period.
pub const TICK_LINE: &str = "Tick\n";

/// The timer tick handler.
///
/// It never touches the UART. The payload goes into the ring and the main
/// loop's console drains it between its own lines, which is what keeps both
/// byte streams contiguous on the wire.
pub struct TickIsr<'q> {
    timer: Timer,
    ring: RingProducer<'q>,
    stats: &'q TickStats,
}

impl<'q> TickIsr<'q> {
    pub fn new(timer: Timer, ring: RingProducer<'q>, stats: &'q TickStats) -> Self {
        Self { timer, ring, stats }
    }
}

impl IrqHandler for TickIsr<'_> {
    fn service(&mut self, bus: &mut dyn RegisterBus) {
        self.timer.service(bus);
        for b in TICK_LINE.bytes() {
            if self.ring.enqueue(b).is_err() {
                // Full ring: drop the byte, never block in the handler.
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.stats.ticks.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::Ring;
    use crate::memmap;
    use crate::testbus::ScriptBus;
    use crate::timer::TimerMap;

    #[test]
    fn service_touches_hardware_then_queues_the_line() {
        let mut ring = Ring::new();
        let stats = TickStats::new();
        let (producer, mut consumer) = ring.split();
        let m = TimerMap::board();
        let mut isr = TickIsr::new(Timer::new(m), producer, &stats);

        let mut bus = ScriptBus::new();
        isr.service(&mut bus);

        // Source cleared before the controller acknowledge.
        assert_eq!(
            bus.stores,
            vec![(m.tisr, memmap::TIMER_OVF), (m.intc_control, 0x1)]
        );
        let mut queued = Vec::new();
        while let Some(b) = consumer.dequeue() {
            queued.push(b);
        }
        assert_eq!(queued, TICK_LINE.as_bytes());
        assert_eq!(stats.ticks(), 1);
        assert_eq!(stats.dropped(), 0);
    }

    #[test]
    fn full_ring_drops_instead_of_blocking() {
        let mut ring = Ring::new();
        let stats = TickStats::new();
        let (producer, _consumer) = ring.split();
        let mut isr = TickIsr::new(Timer::new(TimerMap::board()), producer, &stats);
        let mut bus = ScriptBus::new();

        // 51 services fill the 255 usable slots exactly; the 52nd loses
        // its whole line.
        for _ in 0..52 {
            isr.service(&mut bus);
        }
        assert_eq!(stats.ticks(), 52);
        assert_eq!(stats.dropped(), TICK_LINE.len() as u32);
    }
}
