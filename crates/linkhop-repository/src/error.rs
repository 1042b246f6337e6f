use linkhop_core::ValidationError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RepositoryError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// No mapping for the code. Also returned when the store is unreachable
    /// during a lookup.
    #[error("short code not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Every candidate collided; the code length is too short for the
    /// current occupancy.
    #[error("no free short code after {attempts} attempts")]
    GenerationExhausted { attempts: usize },
    #[error("store connection error: {0}")]
    Connection(String),
    #[error("invalid repository configuration: {0}")]
    Config(String),
}
