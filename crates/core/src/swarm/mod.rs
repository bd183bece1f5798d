#![warn(missing_docs)]
//! Ring membership directory

/// Implementations of [Chord](crate::dht::Chord) and
/// [ChordStorage](crate::dht::ChordStorage) for swarm
pub mod impls;

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::dht::Did;
use crate::dht::Hop;
use crate::dht::IdSpace;
use crate::dht::PeerRing;
use crate::error::Error;
use crate::error::Result;

/// The set of ring members living in this process.
///
/// Members link to each other by [Did] only, the swarm resolves those links. It is
/// the in-process stand-in for the transport a networked deployment would use.
pub struct Swarm {
    space: IdSpace,
    nodes: DashMap<Did, Arc<PeerRing>>,
}

/// Members visited by a lookup, in order. The last hop is the predecessor of the
/// target and `successor` is the member owning it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    /// Dids of visited members, starting with the asking member.
    pub hops: Vec<Did>,
    /// Owner of the looked up did.
    pub successor: Did,
}

impl Route {
    /// Member immediately preceding the looked up did.
    pub fn predecessor(&self) -> Did {
        // A route always contains the asking member.
        self.hops[self.hops.len() - 1]
    }
}

impl Swarm {
    /// Create an empty swarm for the given identifier space.
    pub fn new(space: IdSpace) -> Self {
        Self {
            space,
            nodes: DashMap::new(),
        }
    }

    /// Identifier space of the ring.
    pub fn space(&self) -> IdSpace {
        self.space
    }

    /// Create a standalone member placed by the hash of `identity`, and register it.
    pub fn create_node(&self, identity: &str) -> Result<Arc<PeerRing>> {
        self.register(PeerRing::new(self.space, identity))
    }

    /// Create a standalone member at a given position, and register it.
    pub fn create_node_with_did(&self, did: Did, identity: &str) -> Result<Arc<PeerRing>> {
        if !self.space.contains(did) {
            return Err(Error::DidOutOfRange(did));
        }
        self.register(PeerRing::new_with_did(self.space, did, identity))
    }

    /// Register a member. Two members cannot share a did.
    pub fn register(&self, node: PeerRing) -> Result<Arc<PeerRing>> {
        if node.space() != self.space {
            return Err(Error::InvalidRingWidth(node.space().bits()));
        }
        match self.nodes.entry(node.did) {
            Entry::Occupied(_) => {
                tracing::warn!(
                    "identity {} collides with an existing member at {}",
                    node.identity,
                    node.did
                );
                Err(Error::DidCollision(node.did))
            }
            Entry::Vacant(entry) => {
                let node = Arc::new(node);
                tracing::debug!("register node {} ({})", node.did, node.identity);
                entry.insert(node.clone());
                Ok(node)
            }
        }
    }

    /// Get a member by did.
    pub fn get_node(&self, did: Did) -> Option<Arc<PeerRing>> {
        self.nodes.get(&did).map(|n| n.value().clone())
    }

    /// All members ordered by did.
    pub fn nodes(&self) -> Vec<Arc<PeerRing>> {
        let mut nodes: Vec<Arc<PeerRing>> = self.nodes.iter().map(|n| n.value().clone()).collect();
        nodes.sort_by_key(|n| n.did);
        nodes
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no member is registered.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Run `f` on the member identified by `did`. `node` answers for itself even
    /// when it is not registered.
    pub(crate) fn with_peer<R>(
        &self,
        node: &PeerRing,
        did: Did,
        f: impl FnOnce(&PeerRing) -> R,
    ) -> Option<R> {
        if did == node.did {
            return Some(f(node));
        }
        match self.get_node(did) {
            Some(peer) => Some(f(&peer)),
            None => {
                tracing::warn!("cannot resolve member {} linked from {}", did, node.did);
                None
            }
        }
    }

    /// Walk from `node` towards the predecessor of `did`.
    ///
    /// Each hop reads one member and releases it before moving on. Every forward
    /// hop lands strictly between the current member and `did`, so the clockwise
    /// distance to `did` shrinks and the walk ends.
    pub fn route(&self, node: &PeerRing, did: Did) -> Route {
        let mut hops = vec![node.did];
        let mut hop = node.next_hop(did);
        loop {
            match hop {
                Hop::Arrived(successor) => return Route { hops, successor },
                Hop::Forward(next) => match self.with_peer(node, next, |peer| peer.next_hop(did)) {
                    Some(h) => {
                        tracing::debug!("route {} from {}: hop to {}", did, node.did, next);
                        hops.push(next);
                        hop = h;
                    }
                    None => {
                        // Stop at the last member we could read.
                        let last = hops[hops.len() - 1];
                        let successor = self
                            .with_peer(node, last, |peer| peer.successor())
                            .unwrap_or(last);
                        return Route { hops, successor };
                    }
                },
            }
        }
    }

    /// Follow successor links from `node` until they come back to it, or until a
    /// member repeats or cannot be resolved. Returns the visited dids, starting with
    /// `node`.
    pub fn successor_walk(&self, node: &PeerRing) -> Vec<Did> {
        self.walk(node, |peer| Some(peer.successor()))
    }

    /// Same as [Swarm::successor_walk], following predecessor links.
    pub fn predecessor_walk(&self, node: &PeerRing) -> Vec<Did> {
        self.walk(node, |peer| peer.predecessor())
    }

    fn walk(&self, node: &PeerRing, next: impl Fn(&PeerRing) -> Option<Did>) -> Vec<Did> {
        let mut visited = vec![node.did];
        let mut current = node.did;
        while let Some(Some(n)) = self.with_peer(node, current, &next) {
            if n == node.did || visited.contains(&n) {
                break;
            }
            visited.push(n);
            current = n;
        }
        visited
    }
}
