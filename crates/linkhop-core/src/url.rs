use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Inputs of this length or shorter are rejected.
const MAX_REJECTED_LENGTH: usize = 3;
const SCHEME_PREFIX: &str = "http";
const DEFAULT_SCHEME: &str = "http://";

/// The target of a short link.
///
/// Only the basic shape is checked: surrounding whitespace is trimmed,
/// anything of 3 bytes or less is rejected, and `http://` is prepended when
/// the value does not already start with `http`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LongUrl(String);

impl LongUrl {
    pub fn normalize(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();

        if trimmed.len() <= MAX_REJECTED_LENGTH {
            return Err(ValidationError::InvalidLongUrl(format!(
                "must be longer than {} characters, got '{}'",
                MAX_REJECTED_LENGTH, trimmed
            )));
        }

        if trimmed.starts_with(SCHEME_PREFIX) {
            Ok(Self(trimmed.to_string()))
        } else {
            Ok(Self(format!("{DEFAULT_SCHEME}{trimmed}")))
        }
    }

    /// Wraps a value read back from the store.
    pub fn new_unchecked(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for LongUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_prefixes_scheme() {
        let url = LongUrl::normalize(" example.com ").unwrap();
        assert_eq!(url.as_str(), "http://example.com");
    }

    #[test]
    fn keeps_existing_scheme() {
        let url = LongUrl::normalize("https://example.com/a?b=c").unwrap();
        assert_eq!(url.as_str(), "https://example.com/a?b=c");
    }

    #[test]
    fn rejects_short_input() {
        assert!(LongUrl::normalize("ab").is_err());
        assert!(LongUrl::normalize("abc").is_err());
        assert!(LongUrl::normalize("   abc   ").is_err());
        assert!(LongUrl::normalize("").is_err());
    }

    #[test]
    fn four_characters_is_enough() {
        assert_eq!(LongUrl::normalize("a.io").unwrap().as_str(), "http://a.io");
    }
}
