//! Pseudo-random numbers for the demo loop.

/// Linear congruential generator with 31-bit output. Owned state, so a run
/// can be replayed by handing the same seed back in.
#[derive(Clone, Debug)]
pub struct Lcg {
    seed: u32,
}

impl Lcg {
    pub const DEFAULT_SEED: u32 = 12345;

    pub const fn new(seed: u32) -> Self {
        Self { seed }
    }

    /// Next value in `[0, 2^31)`.
    pub fn next(&mut self) -> u32 {
        self.seed = self
            .seed
            .wrapping_mul(1_103_515_245)
            .wrapping_add(12345)
            & 0x7fff_ffff;
        self.seed
    }
}

impl Default for Lcg {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_sequence_from_default_seed() {
        let mut lcg = Lcg::default();
        assert_eq!(lcg.next(), 1_406_932_606);
        assert_eq!(lcg.next(), 654_583_775);
    }

    #[test]
    fn same_seed_same_stream() {
        let mut a = Lcg::new(99);
        let mut b = Lcg::new(99);
        for _ in 0..16 {
            assert_eq!(a.next(), b.next());
        }
    }

    #[test]
    fn output_stays_in_31_bits() {
        let mut lcg = Lcg::new(u32::MAX);
        for _ in 0..64 {
            assert!(lcg.next() < 1 << 31);
        }
    }
}
