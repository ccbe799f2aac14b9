//! Hosted run of the reference runtime.
//!
//! Drives the exact bring-up the firmware image performs, but against the
//! simulated board: boot banner, nine-store timer init, handler attach, IRQ
//! enable, then the main loop printing pseudo-random numbers with the tick
//! ring drained between lines.

use tickbed_config::StopReason;
use tickbed_rt::console::{Console, Ring};
use tickbed_rt::fmt::{self, Arg, Out};
use tickbed_rt::isr::{TickIsr, TickStats};
use tickbed_rt::memmap;
use tickbed_rt::rand::Lcg;
use tickbed_rt::timer::{self, Timer, TimerMap};
use tickbed_rt::uart::{Uart, UartMap};

use crate::board::Board;
use crate::machine::Machine;
use crate::snapshot::MachineSnapshot;

pub const BOOT_BANNER: &str = "tickbed: runtime up\n";
pub const IRQ_BANNER: &str = "interrupts enabled\n";

/// Knobs for one hosted run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub crystal_hz: u32,
    pub period_secs: u32,
    pub seed: u32,
    /// Main-loop lines to print before stopping, `None` to run until the
    /// cycle budget.
    pub iterations: Option<u64>,
    pub max_cycles: u64,
    /// Scripted console input. When set, the run opens with the two-number
    /// adder exchange before entering the main loop.
    pub input: Option<String>,
    /// Idle cycles between main-loop lines, standing in for the firmware's
    /// busy-wait delay.
    pub delay_cycles: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            crystal_hz: memmap::CRYSTAL_HZ,
            period_secs: 2,
            seed: Lcg::DEFAULT_SEED,
            iterations: None,
            max_cycles: 500_000_000,
            input: None,
            delay_cycles: 100_000,
        }
    }
}

/// What a run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub stop_reason: StopReason,
    pub ticks: u32,
    pub dropped: u32,
    pub cycles: u64,
    pub uart_tx: Vec<u8>,
    pub snapshot: MachineSnapshot,
}

impl RunOutcome {
    pub fn uart_string(&self) -> String {
        String::from_utf8_lossy(&self.uart_tx).into_owned()
    }
}

pub fn run(cfg: &RunConfig) -> RunOutcome {
    run_on(Board::reference(), cfg)
}

pub fn run_on(board: Board, cfg: &RunConfig) -> RunOutcome {
    // Ring and stats outlive the machine that borrows them.
    let mut ring: Ring = Ring::new();
    let stats = TickStats::new();

    let mut machine = Machine::new(board, cfg.max_cycles);
    if let Some(input) = &cfg.input {
        machine.board.console_input(input);
    }

    let (producer, consumer) = ring.split();
    let timer = Timer::new(TimerMap::board());
    let mut console = Console::new(Uart::new(UartMap::board()), consumer);

    console.write_str(&mut machine, BOOT_BANNER);

    let functional_hz = cfg.crystal_hz / memmap::TIMER_CLOCK_DIV;
    timer.init(&mut machine, timer::reload_for(functional_hz, cfg.period_secs));
    machine.attach_handler(Box::new(TickIsr::new(timer, producer, &stats)));
    machine.enable_irq();
    console.write_str(&mut machine, IRQ_BANNER);

    if cfg.input.is_some() {
        adder_exchange(&mut machine, &mut console);
    }

    let mut lcg = Lcg::new(cfg.seed);
    let mut printed = 0u64;
    while machine.stop_reason().is_none() {
        if let Some(limit) = cfg.iterations {
            if printed >= limit {
                machine.finish(StopReason::MainDone);
                break;
            }
        }
        let value = (lcg.next() % 1000) as i32;
        fmt::format(&mut console.io(&mut machine), "%d\n", &[Arg::Int(value)]);
        console.pump(&mut machine);
        machine.advance(cfg.delay_cycles);
        printed += 1;
    }
    console.pump(&mut machine);

    let snapshot = machine.snapshot();
    RunOutcome {
        stop_reason: machine.stop_reason().unwrap_or(StopReason::MainDone),
        ticks: stats.ticks(),
        dropped: stats.dropped(),
        cycles: machine.board.cycles(),
        uart_tx: machine.board.console_tx(),
        snapshot,
    }
}

/// Prompts for two integers and prints their sum. Echo comes back over the
/// same UART, so a scripted "3\n4\n" leaves "a: 3\nb: 4\nsum = 7\n" in the
/// transmit log.
fn adder_exchange(machine: &mut Machine<'_>, console: &mut Console<'_>) {
    let mut a = 0i32;
    let mut b = 0i32;
    console.write_str(machine, "a: ");
    fmt::parse(&mut console.io(machine), "%d", &mut [Out::Int(&mut a)]);
    console.write_str(machine, "b: ");
    fmt::parse(&mut console.io(machine), "%d", &mut [Out::Int(&mut b)]);
    fmt::format(
        &mut console.io(machine),
        "sum = %d\n",
        &[Arg::Int(a.wrapping_add(b))],
    );
}
