//! Busy-wait helpers.
//!
//! Polling is the only blocking primitive in this runtime, and the loops
//! carry no timeout: if a flag never clears, the caller never returns. That
//! is the documented failure mode for absent or wedged hardware.

use crate::bus::RegisterBus;

/// Spin until `pred` goes false.
#[inline]
pub fn spin_while<B, F>(bus: &mut B, mut pred: F)
where
    B: RegisterBus + ?Sized,
    F: FnMut(&mut B) -> bool,
{
    while pred(bus) {
        core::hint::spin_loop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testbus::ScriptBus;

    #[test]
    fn spins_until_predicate_clears() {
        let mut bus = ScriptBus::new();
        let mut polls = 0;
        spin_while(&mut bus, |_| {
            polls += 1;
            polls < 4
        });
        assert_eq!(polls, 4);
    }

    #[test]
    fn returns_immediately_when_already_clear() {
        let mut bus = ScriptBus::new();
        let mut polls = 0;
        spin_while(&mut bus, |_| {
            polls += 1;
            false
        });
        assert_eq!(polls, 1);
    }
}
