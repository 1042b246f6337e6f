use std::collections::HashSet;
use thiserror::Error;

/// Digits and ASCII letters without the easily confused `0`, `o` and `O`.
pub const DEFAULT_ALPHABET: &str =
    "123456789abcdefghijklmnpqrstuvwxyzABCDEFGHIJKLMNPQRSTUVWXYZ";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlphabetError {
    #[error("alphabet must not be empty")]
    Empty,
    #[error("alphabet must be ASCII alphanumeric, found '{0}'")]
    InvalidCharacter(char),
    #[error("alphabet contains '{0}' more than once")]
    Duplicate(char),
}

/// The set of characters short codes are drawn from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<u8>,
}

impl Alphabet {
    pub fn new(symbols: &str) -> Result<Self, AlphabetError> {
        if symbols.is_empty() {
            return Err(AlphabetError::Empty);
        }

        let mut seen = HashSet::new();
        for c in symbols.chars() {
            if !c.is_ascii_alphanumeric() {
                return Err(AlphabetError::InvalidCharacter(c));
            }
            if !seen.insert(c) {
                return Err(AlphabetError::Duplicate(c));
            }
        }

        Ok(Self {
            symbols: symbols.as_bytes().to_vec(),
        })
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn contains(&self, c: char) -> bool {
        c.is_ascii() && self.symbols.contains(&(c as u8))
    }

    pub(crate) fn symbol(&self, index: usize) -> char {
        self.symbols[index] as char
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_ALPHABET.as_bytes().to_vec(),
        }
    }
}
