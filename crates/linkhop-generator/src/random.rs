use crate::alphabet::Alphabet;
use crate::CodeGenerator;
use linkhop_core::ShortCode;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Draws every character uniformly and independently from an [`Alphabet`].
///
/// The RNG is seeded once, when the generator is built, and shared by all
/// callers behind a mutex, so a single instance can be handed to every
/// request task. Output is hard to enumerate but not cryptographically
/// unpredictable.
#[derive(Debug)]
pub struct RandomGenerator {
    alphabet: Alphabet,
    rng: Mutex<StdRng>,
}

impl RandomGenerator {
    /// Creates a generator over the default alphabet, seeded from the OS.
    pub fn new() -> Self {
        Self::with_alphabet(Alphabet::default())
    }

    pub fn with_alphabet(alphabet: Alphabet) -> Self {
        Self {
            alphabet,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Creates a generator with a fixed seed, producing a reproducible
    /// sequence.
    pub fn with_seed(alphabet: Alphabet, seed: u64) -> Self {
        Self {
            alphabet,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGenerator for RandomGenerator {
    fn generate(&self, length: usize) -> ShortCode {
        let size = self.alphabet.len();
        let mut rng = self.rng.lock();
        let code: String = (0..length)
            .map(|_| self.alphabet.symbol(rng.random_range(0..size)))
            .collect();
        ShortCode::new_unchecked(code)
    }
}
