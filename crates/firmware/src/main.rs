#![no_main]
#![no_std]

use core::cell::RefCell;

use cortex_m::interrupt::{self, Mutex};
use cortex_m_rt::entry;
use panic_halt as _;

use tickbed_rt::console::{Console, Ring};
use tickbed_rt::fmt::{self, Arg};
use tickbed_rt::isr::{IrqHandler, TickIsr, TickStats};
use tickbed_rt::memmap;
use tickbed_rt::rand::Lcg;
use tickbed_rt::timer::{self, Timer, TimerMap};
use tickbed_rt::uart::{Uart, UartMap};
use tickbed_rt::PhysBus;

static STATS: TickStats = TickStats::new();

// The timer handler lives here between interrupts. Only the ISR takes it,
// and only inside a critical section.
static TICK_ISR: Mutex<RefCell<Option<TickIsr<'static>>>> = Mutex::new(RefCell::new(None));

const DELAY_SPINS: u32 = 1_000_000;

#[no_mangle]
extern "C" fn timer_irq_handler() {
    interrupt::free(|cs| {
        if let Some(isr) = TICK_ISR.borrow(cs).borrow_mut().as_mut() {
            isr.service(&mut PhysBus);
        }
    });
}

#[entry]
fn main() -> ! {
    let mut bus = PhysBus;

    let ring = cortex_m::singleton!(RING: Ring = Ring::new()).unwrap();
    let (producer, consumer) = ring.split();

    let uart = Uart::new(UartMap::board());
    let mut console = Console::new(uart, consumer);
    console.write_str(&mut bus, "tickbed: runtime up\n");

    let timer = Timer::new(TimerMap::board());
    timer.init(
        &mut bus,
        timer::reload_for(memmap::CRYSTAL_HZ / memmap::TIMER_CLOCK_DIV, 2),
    );
    interrupt::free(|cs| {
        TICK_ISR
            .borrow(cs)
            .replace(Some(TickIsr::new(timer, producer, &STATS)));
    });
    unsafe { interrupt::enable() };
    console.write_str(&mut bus, "interrupts enabled\n");

    let mut lcg = Lcg::default();
    loop {
        let value = (lcg.next() % 1000) as i32;
        fmt::format(&mut console.io(&mut bus), "%d\n", &[Arg::Int(value)]);
        console.pump(&mut bus);
        delay(DELAY_SPINS);
    }
}

fn delay(spins: u32) {
    for _ in 0..spins {
        core::hint::spin_loop();
    }
}
