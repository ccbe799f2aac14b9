//! Word access to memory-mapped registers.

/// Absolute-address word load/store.
///
/// Drivers are written against this trait so the same code runs on the real
/// device (`PhysBus`) and on the simulated board. Loads take `&mut self`
/// because a simulated bus advances time on every access.
pub trait RegisterBus {
    fn load(&mut self, addr: u32) -> u32;
    fn store(&mut self, addr: u32, value: u32);
}

impl<B: RegisterBus + ?Sized> RegisterBus for &mut B {
    fn load(&mut self, addr: u32) -> u32 {
        (**self).load(addr)
    }

    fn store(&mut self, addr: u32, value: u32) {
        (**self).store(addr, value)
    }
}

/// Direct MMIO, one volatile 32-bit access per call.
///
/// Only meaningful on the target: every address handed to it must be a
/// device register the platform maps at that physical address.
#[derive(Clone, Copy, Debug, Default)]
pub struct PhysBus;

impl RegisterBus for PhysBus {
    #[inline]
    fn load(&mut self, addr: u32) -> u32 {
        unsafe { core::ptr::read_volatile(addr as usize as *const u32) }
    }

    #[inline]
    fn store(&mut self, addr: u32, value: u32) {
        unsafe { core::ptr::write_volatile(addr as usize as *mut u32, value) }
    }
}
