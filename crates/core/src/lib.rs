//! Chord: routing and membership core of a structured p2p ring.
//! --------------
//! - [IdSpace](crate::dht::IdSpace) places identities and keys on a ring of `2^m` positions.
//! - [PeerRing](crate::dht::PeerRing) is one ring member: successor, predecessor, finger table and owned keys.
//! - [Swarm](crate::swarm::Swarm) holds the members of one process and implements the
//!   [Chord](crate::dht::Chord) and [ChordStorage](crate::dht::ChordStorage) protocols over them.
//! - [Stabilizer](crate::dht::Stabilizer) drives the periodic stabilize and fix-fingers steps of a member.
//!
//! # Join Ring
//!
//! 1. The first member joins through itself and stays a singleton ring.
//! 2. A new member asks an existing one for the successor of its own did, takes over the
//!    predecessor of that successor and splices itself between them.
//! 3. Keys of the successor that now fall into the new member's range move over.
//! 4. The new member builds its finger table with lookups routed through the existing member.
//!
//! Links of other members are only partially updated by a join. Repeated stabilize and
//! notify rounds make every successor and predecessor converge, fix-fingers does the same
//! for finger tables.
//!
//! # Lookup
//!
//! A lookup walks closest preceding fingers and locks one member at a time, so it may see
//! a mix of old and new links while the ring converges. It never fails: a member alone in
//! its ring answers with itself.
pub mod consts;
pub mod dht;
pub mod error;
pub mod inspect;
pub mod prelude;
pub mod storage;
pub mod swarm;
#[cfg(test)]
mod tests;
