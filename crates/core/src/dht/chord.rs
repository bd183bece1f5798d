//! Chord ring member.
#![warn(missing_docs)]
use std::sync::PoisonError;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;

use serde::Deserialize;
use serde::Serialize;

use super::FingerTable;
use crate::dht::Did;
use crate::dht::IdSpace;
use crate::error::Error;
use crate::error::Result;
use crate::storage::KvStorageInterface;
use crate::storage::MemStorage;

/// `KeyStorage` is the type accepted by `PeerRing::new_with_storage`.
/// It holds the key/value pairs owned by a member.
pub type KeyStorage = Box<dyn KvStorageInterface<String> + Send + Sync>;

/// Membership state of a node.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    /// Singleton ring, never attached to other members.
    #[default]
    Standalone,
    /// Attached to a ring, links may be stale.
    Joined,
    /// A stabilization round completed since the last link change made by a peer.
    Stable,
}

/// Information about successor and predecessor
#[derive(Debug, PartialEq, Eq, Deserialize, Serialize, Clone)]
pub struct TopoInfo {
    /// Successor
    pub successor: Did,
    /// Predecessor
    pub predecessor: Option<Did>,
}

/// Mutable part of a [PeerRing], guarded by one lock.
pub struct RingState {
    /// The next node on the ring. It is always mirrored by finger entry 0.
    pub successor: Did,
    /// The previous node on the ring, `None` until established.
    pub predecessor: Option<Did>,
    /// [FingerTable] help node to find successor quickly.
    pub finger: FingerTable,
    /// Membership state.
    pub status: NodeStatus,
    /// Key/value pairs owned by this node.
    pub storage: KeyStorage,
}

impl RingState {
    fn set_successor(&mut self, did: Did) -> bool {
        if self.successor == did {
            return false;
        }
        self.successor = did;
        self.finger.set(0, did);
        true
    }
}

/// One step of a lookup walk evaluated on a single node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Hop {
    /// The node is the predecessor of the target, the payload is its successor.
    Arrived(Did),
    /// Continue the walk on the given closer node.
    Forward(Did),
}

/// PeerRing is one member of the ring.
/// All members form a clockwise ring in the order of Did.
///
/// A member only knows other members by [Did]. Reaching them is the job of the
/// [Swarm](crate::swarm::Swarm) that owns it.
pub struct PeerRing {
    /// The did of current node.
    pub did: Did,
    /// Opaque label the did was derived from, usually a network address.
    pub identity: String,
    space: IdSpace,
    state: RwLock<RingState>,
}

impl std::fmt::Debug for PeerRing {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("PeerRing")
            .field("did", &self.did)
            .field("identity", &self.identity)
            .finish()
    }
}

impl PeerRing {
    /// Create a standalone node, placed on the ring by the hash of its identity.
    pub fn new(space: IdSpace, identity: &str) -> Self {
        Self::new_with_did(space, space.hash(identity), identity)
    }

    /// Create a standalone node at a given position.
    pub fn new_with_did(space: IdSpace, did: Did, identity: &str) -> Self {
        Self::new_with_storage(space, did, identity, Box::new(MemStorage::new()))
    }

    /// Same as new_with_did, but with a given storage.
    pub fn new_with_storage(space: IdSpace, did: Did, identity: &str, storage: KeyStorage) -> Self {
        let did = space.did(did.into());
        Self {
            did,
            identity: identity.to_string(),
            space,
            state: RwLock::new(RingState {
                successor: did,
                predecessor: Some(did),
                finger: FingerTable::new(did, space.bits()),
                status: NodeStatus::Standalone,
                storage,
            }),
        }
    }

    /// Identifier space this node lives in.
    pub fn space(&self) -> IdSpace {
        self.space
    }

    /// Shared access to the node state.
    /// A panic in another holder does not leave the links half written, so a
    /// poisoned lock is still readable.
    pub fn lock_state(&self) -> RwLockReadGuard<RingState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Exclusive access to the node state.
    pub fn lock_state_mut(&self) -> RwLockWriteGuard<RingState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current successor.
    pub fn successor(&self) -> Did {
        self.lock_state().successor
    }

    /// Current predecessor.
    pub fn predecessor(&self) -> Option<Did> {
        self.lock_state().predecessor
    }

    /// Current membership state.
    pub fn status(&self) -> NodeStatus {
        self.lock_state().status
    }

    /// Snapshot of the finger table.
    pub fn finger(&self) -> FingerTable {
        self.lock_state().finger.clone()
    }

    /// A helper function to get the topological info about the chord.
    pub fn topo_info(&self) -> TopoInfo {
        let state = self.lock_state();
        TopoInfo {
            successor: state.successor,
            predecessor: state.predecessor,
        }
    }

    /// Evaluate one lookup step for `did` on this node.
    ///
    /// Arrives when `did` lies in `(self, successor]` or the node is its own
    /// successor. Otherwise forwards to the closest preceding finger, or arrives
    /// anyway when no finger improves on this node.
    pub fn next_hop(&self, did: Did) -> Hop {
        let state = self.lock_state();
        if state.successor == self.did || self.space.in_half_open(did, self.did, state.successor) {
            return Hop::Arrived(state.successor);
        }
        let closest = state.finger.closest_preceding(&self.space, did);
        if closest == self.did {
            Hop::Arrived(state.successor)
        } else {
            Hop::Forward(closest)
        }
    }

    /// Get closest preceding finger of `did` from the local finger table.
    pub fn closest_preceding_finger(&self, did: Did) -> Did {
        self.lock_state()
            .finger
            .closest_preceding(&self.space, did)
    }

    /// Handle notification from a node that thinks it is the predecessor of current node.
    /// If that node is closer to current node or current node has no predecessor, set it.
    /// This method will return current predecessor after setting.
    pub fn notify(&self, candidate: Did) -> Did {
        self.rectify(candidate).0
    }

    /// Same as [PeerRing::notify], also reporting whether the predecessor changed.
    pub(crate) fn rectify(&self, candidate: Did) -> (Did, bool) {
        let mut state = self.lock_state_mut();
        match state.predecessor {
            Some(pre) if !self.space.in_open(candidate, pre, self.did) => (pre, false),
            previous => {
                tracing::info!(
                    "node {} adopts predecessor {} (was {:?})",
                    self.did,
                    candidate,
                    previous
                );
                state.predecessor = Some(candidate);
                if state.status == NodeStatus::Stable {
                    state.status = NodeStatus::Joined;
                }
                (candidate, true)
            }
        }
    }

    /// Replace the predecessor with a joining node, returning the previous one.
    pub(crate) fn admit_predecessor(&self, did: Did) -> Option<Did> {
        let mut state = self.lock_state_mut();
        let previous = state.predecessor.replace(did);
        state.status = NodeStatus::Joined;
        previous
    }

    /// Point the successor to a joining node if it lies between this node and the
    /// current successor. Returns whether the successor changed.
    pub(crate) fn splice_successor(&self, did: Did) -> bool {
        let mut state = self.lock_state_mut();
        if !self.space.in_open(did, self.did, state.successor) {
            return false;
        }
        state.status = NodeStatus::Joined;
        state.set_successor(did)
    }

    /// Adopt a successor improved by stabilization, unless the successor moved
    /// since `expected` was read.
    pub(crate) fn adopt_successor(&self, expected: Did, did: Did) -> bool {
        let mut state = self.lock_state_mut();
        if state.successor != expected {
            return false;
        }
        tracing::info!("node {} adopts successor {} (was {})", self.did, did, expected);
        state.set_successor(did)
    }

    /// Install the links found by a join.
    /// A link already moved closer by a concurrent join is kept.
    pub(crate) fn attach(&self, successor: Did, predecessor: Option<Did>) {
        let mut state = self.lock_state_mut();
        if state.successor == self.did || !self.space.in_open(state.successor, self.did, successor) {
            state.set_successor(successor);
        }
        let keep = match (state.predecessor, predecessor) {
            (Some(current), Some(found)) => {
                current != self.did && self.space.in_open(current, found, self.did)
            }
            _ => false,
        };
        if !keep {
            state.predecessor = predecessor;
        }
        state.status = NodeStatus::Joined;
    }

    /// Mark the end of a stabilization round.
    pub(crate) fn mark_stable(&self) {
        let mut state = self.lock_state_mut();
        if state.status != NodeStatus::Standalone {
            state.status = NodeStatus::Stable;
        }
    }

    /// Overwrite finger entries, returning how many changed.
    pub(crate) fn update_fingers(&self, entries: impl IntoIterator<Item = (usize, Did)>) -> usize {
        let mut state = self.lock_state_mut();
        let mut changed = 0;
        for (index, did) in entries {
            if index == 0 && did != state.successor {
                // Entry 0 mirrors the successor, which only stabilization moves.
                continue;
            }
            if state.finger.set(index, did) {
                changed += 1;
            }
        }
        changed
    }

    /// Advance the rotating fix cursor.
    pub(crate) fn next_fix_index(&self) -> usize {
        self.lock_state_mut().finger.next_fix_index()
    }

    /// Check whether a position on the ring falls into `(predecessor, self]`.
    /// A node without predecessor, or its own predecessor, owns the whole ring.
    pub fn owns(&self, did: Did) -> bool {
        let state = self.lock_state();
        match state.predecessor {
            Some(pre) if pre != self.did => self.space.in_half_open(did, pre, self.did),
            _ => true,
        }
    }

    fn check_owner(&self, key: &str) -> Result<()> {
        if self.owns(self.space.hash(key)) {
            Ok(())
        } else {
            Err(Error::KeyNotOwned {
                key: key.to_string(),
                did: self.did,
            })
        }
    }

    /// Store a key on this node, which must own it.
    pub fn put_local(&self, key: &str, value: String) -> Result<Option<String>> {
        self.check_owner(key)?;
        Ok(self.store_key(key, value))
    }

    /// Read a key from this node, which must own it.
    pub fn get_local(&self, key: &str) -> Result<Option<String>> {
        self.check_owner(key)?;
        Ok(self.read_key(key))
    }

    /// Write straight to the store of this node. A join in flight hands the key
    /// over later.
    pub(crate) fn store_key(&self, key: &str, value: String) -> Option<String> {
        self.lock_state_mut().storage.put(key, value)
    }

    pub(crate) fn read_key(&self, key: &str) -> Option<String> {
        self.lock_state().storage.get(key)
    }

    /// Remove a key from this node, which must own it.
    pub fn remove_local(&self, key: &str) -> Result<Option<String>> {
        self.check_owner(key)?;
        Ok(self.lock_state_mut().storage.remove(key))
    }

    /// All key/value pairs held by this node, sorted by key.
    pub fn keys(&self) -> Vec<(String, String)> {
        self.lock_state().storage.get_all()
    }

    /// Remove and return every key whose hash is outside `(lo, hi]`.
    pub(crate) fn take_keys_outside(&self, lo: Did, hi: Did) -> Vec<(String, String)> {
        let space = self.space;
        self.lock_state_mut()
            .storage
            .take_where(&|key: &str| !space.in_half_open(space.hash(key), lo, hi))
    }

    /// Insert keys handed over by another node.
    pub(crate) fn insert_keys(&self, items: Vec<(String, String)>) {
        let state = self.lock_state_mut();
        for (key, value) in items {
            state.storage.put(&key, value);
        }
    }
}
