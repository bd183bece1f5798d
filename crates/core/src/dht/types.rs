//! DHT types about `Chord` and `ChordStorage`.
#![warn(missing_docs)]

use super::chord::PeerRing;
use super::did::Did;
use crate::error::Result;

/// Chord is a distributed hash table (DHT) algorithm that is designed to efficiently
/// distribute data across peer-to-peer network nodes. You may want to browse its
/// [wiki](https://en.wikipedia.org/wiki/Chord_(peer-to-peer)) before you read this.
///
/// Every member keeps a successor, a predecessor and a finger table of `m` entries.
/// Lookups walk closest preceding fingers and take O(log n) hops; membership steps
/// keep those pointers converging while nodes join.
///
/// The methods take the acting member explicitly. The implementor is whatever can
/// reach the other members by [Did]: in this crate the in-process
/// [Swarm](crate::swarm::Swarm), in a networked deployment an RPC shim.
pub trait Chord {
    /// Join the ring containing `existing`.
    ///
    /// `None` fails with [InvalidJoinTarget](crate::error::Error::InvalidJoinTarget)
    /// and the node stays standalone. Joining through itself keeps the node
    /// standalone, which is how the first member of a ring starts.
    fn join(&self, node: &PeerRing, existing: Option<&PeerRing>) -> Result<()>;

    /// Ask DHT for the member owning `did`.
    fn find_successor(&self, node: &PeerRing, did: Did) -> Did;

    /// Ask DHT for the member immediately preceding `did`.
    fn find_predecessor(&self, node: &PeerRing, did: Did) -> Did;

    /// Closest finger of `node` strictly preceding `did`, or `node` itself.
    fn closest_preceding_finger(&self, node: &PeerRing, did: Did) -> Did;

    /// Verify the successor of `node` and notify it.
    /// According to the paper, this method should be called periodically.
    /// Returns whether any successor or predecessor link changed.
    fn stabilize(&self, node: &PeerRing) -> Result<bool>;

    /// Tell `node` that `candidate` may be its predecessor.
    /// Returns the predecessor after updating.
    fn notify(&self, node: &PeerRing, candidate: Did) -> Did;

    /// Recompute every finger of `node`.
    /// Returns how many entries changed.
    fn fix_fingers(&self, node: &PeerRing) -> usize;

    /// Recompute the finger under the rotating cursor of `node`, then advance it.
    /// Calling it `m` times refreshes the whole table.
    /// Returns how many entries changed.
    fn fix_next_finger(&self, node: &PeerRing) -> usize;
}

/// ChordStorage is a key/value protocol based on Chord algorithm.
///
/// A key is placed on the ring by the hash of its name and lives on the member
/// owning that position, found through [Chord::find_successor].
pub trait ChordStorage: Chord {
    /// Store `value` under `key` on its owner, returning the owner's did.
    fn put(&self, node: &PeerRing, key: &str, value: &str) -> Result<Did>;

    /// Read `key` from its owner.
    fn get(&self, node: &PeerRing, key: &str) -> Result<Option<String>>;
}
