pub mod alphabet;
pub mod random;

pub use alphabet::{Alphabet, AlphabetError};
pub use random::RandomGenerator;

use linkhop_core::ShortCode;

/// Trait for generating candidate short codes.
///
/// Implementations are pure generators that don't interact with storage;
/// collisions are detected by the caller through the store's conditional
/// insert and resolved by asking for another candidate.
pub trait CodeGenerator: Send + Sync + 'static {
    /// Produces a code of exactly `length` characters.
    fn generate(&self, length: usize) -> ShortCode;
}
