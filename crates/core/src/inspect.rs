//! Read-only snapshots of ring members, for rendering the ring topology.
use serde::Deserialize;
use serde::Serialize;

use crate::dht::Did;
use crate::dht::NodeStatus;
use crate::dht::PeerRing;
use crate::swarm::Swarm;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwarmInspect {
    pub bits: u8,
    pub nodes: Vec<DHTInspect>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DHTInspect {
    pub did: Did,
    pub identity: String,
    pub successor: Did,
    #[serde(default)]
    pub predecessor: Option<Did>,
    pub status: NodeStatus,
    pub finger_table: Vec<FingerInspect>,
    pub keys: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerInspect {
    pub index: u8,
    pub start: Did,
    pub did: Did,
}

impl SwarmInspect {
    pub fn inspect(swarm: &Swarm) -> Self {
        Self {
            bits: swarm.space().bits(),
            nodes: swarm.nodes().iter().map(|n| DHTInspect::inspect(n)).collect(),
        }
    }
}

impl DHTInspect {
    /// The links, fingers and keys are read under one lock acquisition.
    pub fn inspect(dht: &PeerRing) -> Self {
        let space = dht.space();
        let state = dht.lock_state();
        let finger_table = state
            .finger
            .list()
            .iter()
            .enumerate()
            .map(|(i, did)| FingerInspect {
                index: i as u8,
                start: space.finger_start(dht.did, i as u8),
                did: *did,
            })
            .collect();

        Self {
            did: dht.did,
            identity: dht.identity.clone(),
            successor: state.successor,
            predecessor: state.predecessor,
            status: state.status,
            finger_table,
            keys: state.storage.get_all(),
        }
    }

    /// Finger entries folded into `(did, first index, last index)` runs.
    /// Wide rings point most of their entries to a few members.
    pub fn finger_runs(&self) -> Vec<(Did, u8, u8)> {
        compress_iter(self.finger_table.iter().map(|f| f.did))
    }
}

/// Fold consecutive equal items into `(item, first index, last index)`.
pub fn compress_iter<T>(iter: impl Iterator<Item = T>) -> Vec<(T, u8, u8)>
where T: PartialEq {
    let mut runs: Vec<(T, u8, u8)> = vec![];
    for (i, x) in iter.enumerate() {
        let i = i as u8;
        match runs.last_mut() {
            Some((item, _, last)) if *item == x => *last = i,
            _ => runs.push((x, i, i)),
        }
    }
    runs
}
