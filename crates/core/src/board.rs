//! Board assembly: devices, address routing, and the cycle counter.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{bail, Result};
use tickbed_config::BoardDescriptor;
use tickbed_rt::memmap;

use crate::devices::{ClockGate, ConsoleUart, DmTimer, Intc, IntcState};
use crate::{Device, SimError, SimResult};

/// One mapped device and its slot in the address space.
#[derive(Debug)]
pub struct DeviceEntry {
    pub name: String,
    pub base: u32,
    pub size: u32,
    pub irq: Option<u32>,
    pub dev: Box<dyn Device>,
}

/// A store recorded by the write journal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JournalEntry {
    pub cycle: u64,
    pub addr: u32,
    pub value: u32,
}

/// The simulated board: a flat list of mapped devices plus the shared
/// crystal-cycle counter and interrupt-controller state.
#[derive(Debug)]
pub struct Board {
    pub devices: Vec<DeviceEntry>,
    cycles: Arc<AtomicU64>,
    intc: Arc<IntcState>,
    journal: Option<Vec<JournalEntry>>,
}

impl Board {
    /// The board the reference runtime is written against: console UART,
    /// clock-gated overflow timer on line 68, interrupt controller, and the
    /// clock manager that gates the timer.
    pub fn reference() -> Self {
        let cycles = Arc::new(AtomicU64::new(0));
        let intc = Arc::new(IntcState::default());
        let timer_clock = Arc::new(AtomicBool::new(false));

        let devices = vec![
            DeviceEntry {
                name: "uart0".into(),
                base: memmap::UART0_BASE,
                size: 0x1000,
                irq: None,
                dev: Box::new(ConsoleUart::new(cycles.clone())),
            },
            DeviceEntry {
                name: "timer".into(),
                base: memmap::TIMER_BASE,
                size: 0x100,
                irq: Some(memmap::TIMER_IRQ),
                dev: Box::new(DmTimer::new(timer_clock.clone())),
            },
            DeviceEntry {
                name: "intc".into(),
                base: memmap::INTC_BASE,
                size: 0x200,
                irq: None,
                dev: Box::new(Intc::new(intc.clone())),
            },
            DeviceEntry {
                name: "cm".into(),
                base: memmap::CM_BASE,
                size: 0x100,
                irq: None,
                dev: Box::new(ClockGate::new(timer_clock, memmap::CM_TIMER_CLKCTRL)),
            },
        ];

        Self {
            devices,
            cycles,
            intc,
            journal: None,
        }
    }

    /// Builds a board from a YAML descriptor. Peripheral types map onto the
    /// built-in models; anything else is rejected.
    pub fn from_descriptor(desc: &BoardDescriptor) -> Result<Self> {
        desc.validate()?;

        let cycles = Arc::new(AtomicU64::new(0));
        let intc = Arc::new(IntcState::default());
        let timer_clock = Arc::new(AtomicBool::new(false));

        let mut devices = Vec::with_capacity(desc.peripherals.len());
        for p in &desc.peripherals {
            let (dev, default_size): (Box<dyn Device>, u32) = match p.r#type.as_str() {
                "uart" => (Box::new(ConsoleUart::new(cycles.clone())), 0x1000),
                "timer" => (Box::new(DmTimer::new(timer_clock.clone())), 0x100),
                "intc" => (Box::new(Intc::new(intc.clone())), 0x200),
                "clock" => (
                    Box::new(ClockGate::new(
                        timer_clock.clone(),
                        memmap::CM_TIMER_CLKCTRL,
                    )),
                    0x100,
                ),
                other => bail!("board '{}': unknown peripheral type '{other}'", desc.name),
            };
            devices.push(DeviceEntry {
                name: p.id.clone(),
                base: p.base_address,
                size: p.size.unwrap_or(default_size),
                irq: p.irq,
                dev,
            });
        }

        Ok(Self {
            devices,
            cycles,
            intc,
            journal: None,
        })
    }

    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    pub fn intc_state(&self) -> Arc<IntcState> {
        self.intc.clone()
    }

    /// Advances every device by one crystal cycle and refreshes the
    /// interrupt lines from the levels they report.
    pub fn tick_cycle(&mut self) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        for entry in &mut self.devices {
            let level = entry.dev.tick();
            if let Some(line) = entry.irq {
                self.intc.set_line(line, level);
            }
        }
    }

    pub fn load(&mut self, addr: u32) -> SimResult<u32> {
        for entry in &mut self.devices {
            if addr >= entry.base && addr - entry.base < entry.size {
                return Ok(entry.dev.read(addr - entry.base));
            }
        }
        Err(SimError::BusFault(addr))
    }

    pub fn store(&mut self, addr: u32, value: u32) -> SimResult<()> {
        let cycle = self.cycles.load(Ordering::Relaxed);
        for entry in &mut self.devices {
            if addr >= entry.base && addr - entry.base < entry.size {
                entry.dev.write(addr - entry.base, value);
                if let Some(journal) = self.journal.as_mut() {
                    journal.push(JournalEntry { cycle, addr, value });
                }
                return Ok(());
            }
        }
        Err(SimError::BusFault(addr))
    }

    /// Starts recording every store with its cycle stamp.
    pub fn enable_journal(&mut self) {
        self.journal.get_or_insert_with(Vec::new);
    }

    pub fn journal(&self) -> &[JournalEntry] {
        self.journal.as_deref().unwrap_or(&[])
    }

    /// Looks up a device by name and downcasts it.
    pub fn device_mut<T: 'static>(&mut self, name: &str) -> Option<&mut T> {
        self.devices
            .iter_mut()
            .find(|e| e.name == name)?
            .dev
            .as_any_mut()?
            .downcast_mut::<T>()
    }

    fn console(&self) -> Option<&ConsoleUart> {
        self.devices
            .iter()
            .find_map(|e| e.dev.as_any()?.downcast_ref::<ConsoleUart>())
    }

    fn console_mut(&mut self) -> Option<&mut ConsoleUart> {
        self.devices
            .iter_mut()
            .find_map(|e| e.dev.as_any_mut()?.downcast_mut::<ConsoleUart>())
    }

    /// Queues script text on the console's receive side.
    pub fn console_input(&mut self, text: &str) {
        if let Some(uart) = self.console_mut() {
            uart.push_input(text);
        }
    }

    /// Everything written to the console so far.
    pub fn console_tx(&self) -> Vec<u8> {
        self.console().map(ConsoleUart::tx_bytes).unwrap_or_default()
    }

    /// Makes console polls always succeed so a stopped run can unwind.
    pub fn fail_open_console(&mut self) {
        if let Some(uart) = self.console_mut() {
            uart.fail_open();
        }
    }
}
