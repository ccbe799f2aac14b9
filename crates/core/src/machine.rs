//! Execution model: cycle accounting and interrupt dispatch.
//!
//! There is no instruction-level CPU here. The runtime under test runs
//! natively and talks to the board through [`RegisterBus`]; the machine
//! charges one crystal cycle per register access and checks for a pending
//! interrupt right after each one. That puts handler preemption exactly at
//! register-access boundaries, which is where interleaving bugs on real
//! hardware show up.

use std::collections::HashMap;
use std::sync::Arc;

use tickbed_config::StopReason;
use tickbed_rt::isr::IrqHandler;
use tickbed_rt::RegisterBus;

use crate::board::Board;
use crate::devices::IntcState;
use crate::snapshot::{MachineSnapshot, SNAPSHOT_SCHEMA};
use crate::SimError;

/// Consecutive dispatches with no main-context progress before the run is
/// declared an interrupt storm.
const STORM_LIMIT: u32 = 32;

pub struct Machine<'h> {
    pub board: Board,
    intc: Arc<IntcState>,
    handler: Option<Box<dyn IrqHandler + 'h>>,
    irq_enabled: bool,
    in_handler: bool,
    cycle_limit: u64,
    stop: Option<StopReason>,
    fault: Option<SimError>,
    storm_run: u32,
}

impl<'h> Machine<'h> {
    pub fn new(board: Board, cycle_limit: u64) -> Self {
        let intc = board.intc_state();
        Self {
            board,
            intc,
            handler: None,
            irq_enabled: false,
            in_handler: false,
            cycle_limit,
            stop: None,
            fault: None,
            storm_run: 0,
        }
    }

    pub fn attach_handler(&mut self, handler: Box<dyn IrqHandler + 'h>) {
        self.handler = Some(handler);
    }

    pub fn enable_irq(&mut self) {
        self.irq_enabled = true;
    }

    pub fn disable_irq(&mut self) {
        self.irq_enabled = false;
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop.clone()
    }

    pub fn fault(&self) -> Option<&SimError> {
        self.fault.as_ref()
    }

    /// Records a stop reason unless one is already set.
    pub fn finish(&mut self, reason: StopReason) {
        self.stop.get_or_insert(reason);
    }

    /// Lets simulated time pass without register traffic. Each cycle can
    /// still deliver an interrupt.
    pub fn advance(&mut self, cycles: u64) {
        for _ in 0..cycles {
            if self.stop.is_some() {
                break;
            }
            self.step_clock();
            self.dispatch_pending();
        }
    }

    pub fn snapshot(&self) -> MachineSnapshot {
        let mut devices = HashMap::new();
        for entry in &self.board.devices {
            let state = entry.dev.snapshot();
            if !state.is_null() {
                devices.insert(entry.name.clone(), state);
            }
        }
        MachineSnapshot {
            schema: SNAPSHOT_SCHEMA.to_string(),
            cycles: self.board.cycles(),
            stop_reason: self.stop.clone(),
            devices,
        }
    }

    fn step_clock(&mut self) {
        self.board.tick_cycle();
        if self.stop.is_none() && self.board.cycles() >= self.cycle_limit {
            tracing::info!(cycles = self.board.cycles(), "cycle budget exhausted");
            self.stop = Some(StopReason::MaxCycles);
            self.board.fail_open_console();
        }
    }

    fn latch_fault(&mut self, err: SimError) {
        if self.stop.is_none() {
            tracing::error!("{err}");
            self.fault = Some(err);
            self.stop = Some(StopReason::BusFault);
            self.board.fail_open_console();
        }
    }

    /// Delivers at most one interrupt. Never reentrant: a handler's own
    /// register accesses land here with `in_handler` set and fall through.
    fn dispatch_pending(&mut self) {
        if self.in_handler || !self.irq_enabled || self.stop.is_some() {
            return;
        }
        if !self.intc.asserted() {
            self.storm_run = 0;
            return;
        }
        let Some(mut handler) = self.handler.take() else {
            return;
        };
        self.storm_run += 1;
        if self.storm_run > STORM_LIMIT {
            tracing::warn!(
                dispatches = self.storm_run,
                "interrupt storm: source never goes quiet"
            );
            self.stop = Some(StopReason::IrqStorm);
            self.board.fail_open_console();
            self.handler = Some(handler);
            return;
        }
        self.intc.begin_service();
        tracing::debug!(cycle = self.board.cycles(), "irq dispatch");
        self.in_handler = true;
        handler.service(self);
        self.in_handler = false;
        self.handler = Some(handler);
    }
}

impl RegisterBus for Machine<'_> {
    fn load(&mut self, addr: u32) -> u32 {
        self.step_clock();
        let value = match self.board.load(addr) {
            Ok(v) => v,
            Err(err) => {
                self.latch_fault(err);
                0
            }
        };
        self.dispatch_pending();
        value
    }

    fn store(&mut self, addr: u32, value: u32) {
        self.step_clock();
        if let Err(err) = self.board.store(addr, value) {
            self.latch_fault(err);
        }
        self.dispatch_pending();
    }
}
