use thiserror::Error;

/// Client input that does not have the expected surface shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid long url: {0}")]
    InvalidLongUrl(String),
    #[error("invalid short code: {0}")]
    InvalidShortCode(String),
}

/// Errors returned by a persistent store adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The code has no record in the store.
    #[error("short code not found: {0}")]
    NotFound(String),
    /// The conditional insert lost against an existing record.
    #[error("short code already exists: {0}")]
    AlreadyExists(String),
    /// The store could not be reached, or the operation timed out.
    #[error("store connection error: {0}")]
    Connection(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}
