//! The periodic interrupt timer.
//!
//! `init` owns the whole bring-up: module clock, controller unmask and
//! routing, then the timer block itself. `service` is the hardware half of
//! the interrupt handler. Period math lives here too, as plain functions.

use crate::bus::RegisterBus;
use crate::memmap;

/// Every register the timer subsystem touches: the timer block plus the
/// controller and clock-gate registers its bring-up owns.
#[derive(Clone, Copy, Debug)]
pub struct TimerMap {
    pub clkctrl: u32,
    pub mir_clear: u32,
    pub irq_bit: u32,
    pub ilr: u32,
    pub intc_control: u32,
    pub tclr: u32,
    pub tisr: u32,
    pub tier: u32,
    pub tldr: u32,
    pub tcrr: u32,
}

impl TimerMap {
    /// The board's periodic timer on interrupt line 68.
    pub const fn board() -> Self {
        Self {
            clkctrl: memmap::CM_BASE + memmap::CM_TIMER_CLKCTRL,
            mir_clear: memmap::INTC_BASE + memmap::INTC_MIR_CLEAR2,
            irq_bit: memmap::TIMER_IRQ_BIT,
            ilr: memmap::INTC_BASE + memmap::INTC_ILR_TIMER,
            intc_control: memmap::INTC_BASE + memmap::INTC_CONTROL,
            tclr: memmap::TIMER_BASE + memmap::TIMER_TCLR,
            tisr: memmap::TIMER_BASE + memmap::TIMER_TISR,
            tier: memmap::TIMER_BASE + memmap::TIMER_TIER,
            tldr: memmap::TIMER_BASE + memmap::TIMER_TLDR,
            tcrr: memmap::TIMER_BASE + memmap::TIMER_TCRR,
        }
    }
}

/// Counter increments for a period of `secs` seconds at `hz` functional
/// ticks per second. Truncates to the counter width; callers pick values
/// that fit.
pub const fn period_ticks(hz: u32, secs: u32) -> u32 {
    hz.wrapping_mul(secs)
}

/// Register value that makes the up-counter overflow after `period` ticks.
pub const fn reload_for_period(period: u32) -> u32 {
    0u32.wrapping_sub(period)
}

/// Reload value for a period of `secs` seconds at `hz` functional ticks
/// per second.
pub const fn reload_for(hz: u32, secs: u32) -> u32 {
    reload_for_period(period_ticks(hz, secs))
}

/// The periodic timer. Two states: unconfigured, then running after
/// [`Timer::init`]. There is no stop.
#[derive(Clone, Copy, Debug)]
pub struct Timer {
    map: TimerMap,
}

impl Timer {
    pub const fn new(map: TimerMap) -> Self {
        Self { map }
    }

    /// Bring the timer up and start it.
    ///
    /// The order is load-bearing: the module clock comes first because a
    /// gated block drops register writes; the counter is programmed while
    /// stopped; stale pending bits are cleared before the interrupt enable;
    /// and the start bit goes last so no step runs against a live counter.
    pub fn init<B: RegisterBus + ?Sized>(&self, bus: &mut B, reload: u32) {
        let m = &self.map;
        bus.store(m.clkctrl, 0x2); // module clock on
        bus.store(m.mir_clear, m.irq_bit); // unmask the line
        bus.store(m.ilr, 0x0); // highest priority, routed as IRQ
        bus.store(m.tclr, 0); // stop while configuring
        bus.store(m.tisr, 0x7); // drop stale pending bits
        bus.store(m.tldr, reload);
        bus.store(m.tcrr, reload);
        bus.store(m.tier, memmap::TIMER_OVF); // overflow interrupt on
        bus.store(m.tclr, 0x3); // start + auto-reload, last
    }

    /// The hardware half of the interrupt handler: clear the peripheral's
    /// pending bit, then tell the controller the interrupt is handled.
    /// Acknowledging first would re-raise the line the moment delivery
    /// re-enables; skipping the acknowledge stalls delivery for good.
    pub fn service<B: RegisterBus + ?Sized>(&self, bus: &mut B) {
        bus.store(self.map.tisr, memmap::TIMER_OVF);
        bus.store(self.map.intc_control, 0x1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testbus::ScriptBus;

    #[test]
    fn period_math_matches_the_board_numbers() {
        // 24 MHz crystal, divide-by-2 functional clock, 2 s period.
        let hz = memmap::CRYSTAL_HZ / memmap::TIMER_CLOCK_DIV;
        assert_eq!(period_ticks(hz, 2), 24_000_000);
        assert_eq!(reload_for(hz, 2), 0xFE91_CA00);
    }

    #[test]
    fn reload_is_counter_complement() {
        assert_eq!(reload_for_period(1), 0xFFFF_FFFF);
        assert_eq!(reload_for_period(0x1_0000), 0xFFFF_0000);
    }

    #[test]
    fn init_write_sequence_is_exact() {
        let mut bus = ScriptBus::new();
        let m = TimerMap::board();
        Timer::new(m).init(&mut bus, 0xFE91_CA00);
        assert_eq!(
            bus.stores,
            vec![
                (m.clkctrl, 0x2),
                (m.mir_clear, m.irq_bit),
                (m.ilr, 0x0),
                (m.tclr, 0),
                (m.tisr, 0x7),
                (m.tldr, 0xFE91_CA00),
                (m.tcrr, 0xFE91_CA00),
                (m.tier, memmap::TIMER_OVF),
                (m.tclr, 0x3),
            ]
        );
    }

    #[test]
    fn service_clears_source_then_acknowledges() {
        let mut bus = ScriptBus::new();
        let m = TimerMap::board();
        Timer::new(m).service(&mut bus);
        assert_eq!(
            bus.stores,
            vec![(m.tisr, memmap::TIMER_OVF), (m.intc_control, 0x1)]
        );
    }
}
