use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Decides who moves first when the second participant joins.
pub trait CoinFlip: Send {
    /// `true` seats the joiner in slot 0.
    fn joiner_goes_first(&mut self) -> bool;
}

/// A fair coin backed by `StdRng`.
pub struct RandomCoin {
    rng: StdRng,
}

impl RandomCoin {
    pub fn new() -> Self {
        RandomCoin {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        RandomCoin {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomCoin {
    fn default() -> Self {
        Self::new()
    }
}

impl CoinFlip for RandomCoin {
    fn joiner_goes_first(&mut self) -> bool {
        self.rng.random_bool(0.5)
    }
}

/// Always lands the same way.
#[derive(Debug, Clone, Copy)]
pub struct FixedCoin(pub bool);

impl CoinFlip for FixedCoin {
    fn joiner_goes_first(&mut self) -> bool {
        self.0
    }
}
