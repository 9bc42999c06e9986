//! HMR message kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::HmrError;

/// A single HMR notification.
///
/// Messages carry no payload: the kind is the whole message. On the wire
/// each kind is its lowercase name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Message {
    /// Discard client state and reload the document.
    Reload,
    /// Nothing to do.
    Noop,
    /// The change detector reported a failure.
    Error,
}

impl Message {
    /// All recognized kinds.
    pub const ALL: [Self; 3] = [Self::Reload, Self::Noop, Self::Error];

    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reload => "reload",
            Self::Noop => "noop",
            Self::Error => "error",
        }
    }

    /// Interpret a received payload.
    ///
    /// Never fails: anything that is not exactly `reload` or `error`
    /// (comparison is case-sensitive) is a [`Message::Noop`].
    #[must_use]
    pub fn from_payload(payload: &str) -> Self {
        match payload {
            "reload" => Self::Reload,
            "error" => Self::Error,
            _ => Self::Noop,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parse used on the publishing side.
impl FromStr for Message {
    type Err = HmrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| HmrError::UnknownMessage(s.to_owned()))
    }
}
