use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

/// Complete state of an [`RngHandle`]: the key, the stream and the position within it.
///
/// Restoring a handle from its state continues the exact sequence the original would
/// have produced next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: [u8; 32],
    pub stream: u64,
    /// ChaCha block counter.
    pub block: u64,
    /// Next word within the current block.
    pub index: u8,
}

/// The random generator owned by every stochastic perturbation.
///
/// Serializes as its [`RngState`], so a stored perturbation resumes where it left off
/// instead of restarting from its seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RngState", into = "RngState")]
pub struct RngHandle {
    rng: ChaCha20Rng,
}

impl RngHandle {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha20Rng::from_entropy(),
        }
    }

    /// Seeded handle when `seed` is given, entropy-seeded otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::from_seed)
    }

    pub fn state(&self) -> RngState {
        let word_pos = self.rng.get_word_pos();
        RngState {
            seed: self.rng.get_seed(),
            stream: self.rng.get_stream(),
            block: (word_pos >> 4) as u64,
            index: (word_pos & 0xf) as u8,
        }
    }

    pub fn set_state(&mut self, state: RngState) {
        let mut rng = ChaCha20Rng::from_seed(state.seed);
        rng.set_stream(state.stream);
        rng.set_word_pos(((state.block as u128) << 4) | (state.index & 0xf) as u128);
        self.rng = rng;
    }

    /// Uniform sample in `[0, 1)`.
    pub fn uniform(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }

    /// Uniform sample in `[low, high)`; returns `low` for an empty interval.
    pub fn uniform_in(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.uniform()
    }

    /// `+1.0` or `-1.0` with equal probability.
    pub fn sign(&mut self) -> f64 {
        if self.rng.r#gen::<bool>() { 1.0 } else { -1.0 }
    }

    /// Standard normal sample (Box-Muller).
    pub fn gaussian(&mut self) -> f64 {
        let u1 = 1.0 - self.uniform();
        let u2 = self.uniform();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }
}

impl Default for RngHandle {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl From<RngState> for RngHandle {
    fn from(state: RngState) -> Self {
        let mut handle = Self::from_seed(0);
        handle.set_state(state);
        handle
    }
}

impl From<RngHandle> for RngState {
    fn from(handle: RngHandle) -> Self {
        handle.state()
    }
}

impl RngCore for RngHandle {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}
