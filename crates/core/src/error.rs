//! Error of chord_core

use crate::dht::Did;

/// A wrap `Result` contains custom errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors collections in chord-core.
///
/// Lookups never fail: a ring that only contains the asking node answers with that
/// node itself. The only protocol failure surfaced to callers is
/// [Error::InvalidJoinTarget]; the remaining variants cover construction and
/// local-only storage access.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("Join requires an existing ring member, the node stays standalone")]
    InvalidJoinTarget,

    #[error("Key {key} is not owned by node {did}")]
    KeyNotOwned { key: String, did: Did },

    #[error("Did {0} is already taken by another ring member")]
    DidCollision(Did),

    #[error("Ring width must be within 1..=64 bits, got {0}")]
    InvalidRingWidth(u8),

    #[error("Did {0} is outside of the identifier space")]
    DidOutOfRange(Did),

    #[error("Cannot parse did from {0}")]
    BadDid(String),

    #[error("Cannot find ring member {0} in swarm")]
    MissingPeer(Did),
}

impl Error {
    /// Stale routing information produces errors that go away once the ring has
    /// stabilized. Callers may retry those.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::KeyNotOwned { .. } | Error::MissingPeer(_))
    }
}
