//! Scriptable register bus for driver tests: queued load values per address
//! plus a journal of every store.

use std::collections::{HashMap, VecDeque};

use crate::bus::RegisterBus;

pub(crate) struct ScriptBus {
    mem: HashMap<u32, u32>,
    script: HashMap<u32, VecDeque<u32>>,
    pub stores: Vec<(u32, u32)>,
}

impl ScriptBus {
    pub fn new() -> Self {
        Self {
            mem: HashMap::new(),
            script: HashMap::new(),
            stores: Vec::new(),
        }
    }

    /// Queue successive load results for `addr`. Once the queue drains,
    /// loads fall back to the last stored value, then to zero.
    pub fn queue_loads(&mut self, addr: u32, values: &[u32]) {
        self.script.entry(addr).or_default().extend(values);
    }

    pub fn queued(&self, addr: u32) -> usize {
        self.script.get(&addr).map_or(0, |q| q.len())
    }

    pub fn stores_to(&self, addr: u32) -> Vec<u32> {
        self.stores
            .iter()
            .filter(|(a, _)| *a == addr)
            .map(|(_, v)| *v)
            .collect()
    }
}

impl RegisterBus for ScriptBus {
    fn load(&mut self, addr: u32) -> u32 {
        if let Some(q) = self.script.get_mut(&addr) {
            if let Some(v) = q.pop_front() {
                return v;
            }
        }
        self.mem.get(&addr).copied().unwrap_or(0)
    }

    fn store(&mut self, addr: u32, value: u32) {
        self.stores.push((addr, value));
        self.mem.insert(addr, value);
    }
}
