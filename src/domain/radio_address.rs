//! Radio addressing and client session handles.
//!
//! [`RadioAddress`] is what the user types after `--radio`; [`ClientHandle`]
//! is the identifier a radio assigns to a connected client and stamps on
//! every status message that client causes.

use std::fmt;
use std::str::FromStr;

/// Sentinel accepted on the command line to request auto-discovery.
pub const DISCOVER_SENTINEL: &str = ":discover:";

/// Target radio selected on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum RadioAddress {
    /// Connect to the first radio found by discovery.
    #[default]
    Discover,
    /// Connect to the radio with this name or address.
    Named(String),
}

impl RadioAddress {
    /// Returns `true` if this address requests auto-discovery.
    #[must_use]
    pub const fn is_discover(&self) -> bool {
        matches!(self, Self::Discover)
    }
}

impl FromStr for RadioAddress {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == DISCOVER_SENTINEL {
            Ok(Self::Discover)
        } else {
            Ok(Self::Named(s.to_string()))
        }
    }
}

impl fmt::Display for RadioAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discover => f.write_str(DISCOVER_SENTINEL),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// Session handle assigned to a client by the radio.
///
/// Displayed as `0x` followed by eight upper-case hex digits, which is
/// also how it appears as the sender of state updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientHandle(u32);

impl ClientHandle {
    /// Wraps a raw handle value.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Derives a fresh handle from a random UUID v4.
    #[must_use]
    pub fn random() -> Self {
        let bytes = uuid::Uuid::new_v4().into_bytes();
        let [a, b, c, d, ..] = bytes;
        Self(u32::from_be_bytes([a, b, c, d]))
    }
}

impl fmt::Display for ClientHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}
