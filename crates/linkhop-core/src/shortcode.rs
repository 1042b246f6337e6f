use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Shortest code accepted from clients.
pub const MIN_LENGTH: usize = 4;
/// Longest code accepted from clients.
pub const MAX_LENGTH: usize = 10;

/// The key identifying a stored long URL.
///
/// Codes coming from clients go through [`ShortCode::parse`], which checks
/// the surface shape (4-10 ASCII alphanumerics). Codes produced by the
/// generator or read back from the store are trusted and built with
/// [`ShortCode::new_unchecked`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortCode(String);

impl ShortCode {
    /// Validates a client-supplied code.
    pub fn parse(code: impl Into<String>) -> Result<Self, ValidationError> {
        let code = code.into();
        Self::validate(&code)?;
        Ok(Self(code))
    }

    /// Creates a `ShortCode` without validation.
    ///
    /// Use this only for codes produced by trusted internal sources.
    pub fn new_unchecked(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Renders the public short link, e.g. `http://127.0.0.1:8080/abc12`.
    pub fn to_url(&self, scheme: &str, host: &str) -> String {
        format!("{}://{}/{}", scheme, host.trim_end_matches('/'), self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn validate(code: &str) -> Result<(), ValidationError> {
        if code.len() < MIN_LENGTH || code.len() > MAX_LENGTH {
            return Err(ValidationError::InvalidShortCode(format!(
                "length must be between {} and {}, got {}",
                MIN_LENGTH,
                MAX_LENGTH,
                code.len()
            )));
        }

        if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ValidationError::InvalidShortCode(format!(
                "must contain only alphanumeric characters: '{}'",
                code
            )));
        }

        Ok(())
    }
}

impl Display for ShortCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ShortCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
