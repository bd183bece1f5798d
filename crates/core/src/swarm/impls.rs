use crate::dht::Chord;
use crate::dht::ChordStorage;
use crate::dht::Did;
use crate::dht::PeerRing;
use crate::error::Error;
use crate::error::Result;
use crate::swarm::Swarm;

impl Swarm {
    fn peer_or_missing<R>(
        &self,
        node: &PeerRing,
        did: Did,
        f: impl FnOnce(&PeerRing) -> R,
    ) -> Result<R> {
        self.with_peer(node, did, f).ok_or(Error::MissingPeer(did))
    }

    /// Move the keys the joining `node` now owns out of its successor.
    fn transfer_keys(&self, node: &PeerRing, successor: Did) -> Result<usize> {
        if successor == node.did {
            return Ok(0);
        }
        let moved =
            self.peer_or_missing(node, successor, |s| s.take_keys_outside(node.did, successor))?;
        let count = moved.len();
        if count > 0 {
            tracing::info!("move {} keys from {} to {}", count, successor, node.did);
            node.insert_keys(moved);
        }
        Ok(count)
    }

    /// Initial finger build of a joining node, routed through `existing`.
    fn build_fingers(&self, node: &PeerRing, existing: &PeerRing, predecessor: Option<Did>) {
        let space = node.space();
        let entries: Vec<(usize, Did)> = (0..space.bits())
            .map(|i| {
                let start = space.finger_start(node.did, i);
                let target = match predecessor {
                    Some(pre) if space.in_half_open(start, pre, node.did) => node.did,
                    _ => self.find_successor(existing, start),
                };
                (i as usize, target)
            })
            .collect();
        let changed = node.update_fingers(entries);
        tracing::debug!("node {} built {} finger entries", node.did, changed);
    }
}

impl Chord for Swarm {
    fn join(&self, node: &PeerRing, existing: Option<&PeerRing>) -> Result<()> {
        let Some(existing) = existing else {
            tracing::warn!("node {} asked to join without an existing member", node.did);
            return Err(Error::InvalidJoinTarget);
        };
        if existing.did == node.did {
            tracing::debug!("node {} starts a new ring", node.did);
            return Ok(());
        }
        if self.get_node(existing.did).is_none() {
            tracing::warn!(
                "node {} asked to join through unknown member {}",
                node.did,
                existing.did
            );
            return Err(Error::InvalidJoinTarget);
        }
        if self.get_node(node.did).is_none() {
            return Err(Error::MissingPeer(node.did));
        }

        let successor = self.find_successor(existing, node.did);
        if successor == node.did {
            tracing::debug!("node {} is already reachable in the ring", node.did);
            return Ok(());
        }
        let predecessor = self.peer_or_missing(node, successor, |s| s.admit_predecessor(node.did))?;
        if let Some(pre) = predecessor {
            if pre != node.did {
                // A vanished predecessor is left to stabilization.
                self.with_peer(node, pre, |p| p.splice_successor(node.did));
            }
        }
        node.attach(successor, predecessor);
        tracing::info!(
            "node {} joined between {:?} and {}",
            node.did,
            predecessor,
            successor
        );

        self.transfer_keys(node, successor)?;
        self.build_fingers(node, existing, predecessor);
        Ok(())
    }

    fn find_successor(&self, node: &PeerRing, did: Did) -> Did {
        self.route(node, did).successor
    }

    fn find_predecessor(&self, node: &PeerRing, did: Did) -> Did {
        self.route(node, did).predecessor()
    }

    fn closest_preceding_finger(&self, node: &PeerRing, did: Did) -> Did {
        node.closest_preceding_finger(did)
    }

    fn stabilize(&self, node: &PeerRing) -> Result<bool> {
        let successor = node.successor();
        let x = self.peer_or_missing(node, successor, |s| s.predecessor())?;

        let mut changed = false;
        if let Some(x) = x {
            if node.space().in_open(x, node.did, successor) && self.get_node(x).is_some() {
                changed |= node.adopt_successor(successor, x);
            }
        }

        let successor = node.successor();
        let (_, rectified) = self.peer_or_missing(node, successor, |s| s.rectify(node.did))?;
        changed |= rectified;

        node.mark_stable();
        Ok(changed)
    }

    fn notify(&self, node: &PeerRing, candidate: Did) -> Did {
        node.notify(candidate)
    }

    fn fix_fingers(&self, node: &PeerRing) -> usize {
        let space = node.space();
        // Lookups run unlocked, the table is written once at the end.
        let entries: Vec<(usize, Did)> = (0..space.bits())
            .map(|i| {
                let start = space.finger_start(node.did, i);
                (i as usize, self.find_successor(node, start))
            })
            .collect();
        node.update_fingers(entries)
    }

    fn fix_next_finger(&self, node: &PeerRing) -> usize {
        let index = node.next_fix_index();
        let start = node.space().finger_start(node.did, index as u8);
        let target = self.find_successor(node, start);
        tracing::debug!("fix finger {} of {}: {}", index, node.did, target);
        node.update_fingers([(index, target)])
    }
}

impl ChordStorage for Swarm {
    fn put(&self, node: &PeerRing, key: &str, value: &str) -> Result<Did> {
        let owner = self.find_successor(node, node.space().hash(key));
        self.peer_or_missing(node, owner, |o| o.store_key(key, value.to_string()))?;
        tracing::debug!("put {} on {}", key, owner);
        Ok(owner)
    }

    fn get(&self, node: &PeerRing, key: &str) -> Result<Option<String>> {
        let owner = self.find_successor(node, node.space().hash(key));
        self.peer_or_missing(node, owner, |o| o.read_key(key))
    }
}
