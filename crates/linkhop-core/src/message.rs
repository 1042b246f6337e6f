use crate::shortcode::ShortCode;
use std::fmt::Display;

const SEPARATOR: char = '@';
pub const DELETE_KIND: &str = "delete";

/// A cross-instance notification carried on the broadcast channel.
///
/// The wire form is `<kind>@<payload>`, e.g. `delete@abc12`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationMessage {
    /// The mapping for this code was removed from the store.
    Delete(ShortCode),
    /// A message kind this build does not understand.
    Unknown { kind: String, payload: String },
}

impl InvalidationMessage {
    pub fn delete(code: ShortCode) -> Self {
        Self::Delete(code)
    }

    /// Parses a raw channel payload. Never fails: anything that is not a
    /// well formed delete becomes [`InvalidationMessage::Unknown`].
    pub fn parse(raw: &str) -> Self {
        let (kind, payload) = raw.split_once(SEPARATOR).unwrap_or((raw, ""));

        match kind {
            DELETE_KIND if !payload.is_empty() => {
                Self::Delete(ShortCode::new_unchecked(payload))
            }
            _ => Self::Unknown {
                kind: kind.to_string(),
                payload: payload.to_string(),
            },
        }
    }

    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl Display for InvalidationMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Delete(code) => write!(f, "{DELETE_KIND}{SEPARATOR}{code}"),
            Self::Unknown { kind, payload } => write!(f, "{kind}{SEPARATOR}{payload}"),
        }
    }
}
