#![warn(missing_docs)]
use std::ops::Index;

use serde::Deserialize;
use serde::Serialize;

use crate::dht::Did;
use crate::dht::IdSpace;

/// How finger tables are refreshed by the periodic fix-fingers step.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixFingersMode {
    /// Recompute all `m` entries on every tick.
    #[default]
    All,
    /// Recompute one entry per tick with a rotating cursor.
    /// A full rotation completes within `m` ticks.
    Rotating,
}

/// Finger table of Chord DHT.
///
/// Entry `i` points to the member owning `did + 2^i`. A fresh table points every
/// entry to its own node, which is the routing table of a singleton ring.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FingerTable {
    did: Did,
    finger: Vec<Did>,
    #[serde(skip)]
    fix_finger_index: u8,
}

impl FingerTable {
    /// builder
    pub fn new(did: Did, size: u8) -> Self {
        Self {
            did,
            finger: vec![did; size as usize],
            fix_finger_index: 0,
        }
    }

    /// getter
    pub fn get(&self, index: usize) -> Option<Did> {
        self.finger.get(index).copied()
    }

    /// setter, returns whether the entry changed.
    pub fn set(&mut self, index: usize, did: Did) -> bool {
        let Some(entry) = self.finger.get_mut(index) else {
            tracing::error!("set finger index out of range, index: {}", index);
            return false;
        };
        if *entry == did {
            return false;
        }
        tracing::debug!("set finger table of {} index: {} did: {}", self.did, index, did);
        *entry = did;
        true
    }

    /// Number of entries, which is the ring width.
    pub fn size(&self) -> usize {
        self.finger.len()
    }

    /// get finger list
    pub fn list(&self) -> &Vec<Did> {
        &self.finger
    }

    /// Check finger is contains some node
    pub fn contains(&self, did: Did) -> bool {
        self.finger.contains(&did)
    }

    /// Index of the entry the next rotating fix should refresh.
    /// The cursor advances by one and wraps after the last entry.
    pub fn next_fix_index(&mut self) -> usize {
        let index = self.fix_finger_index as usize;
        self.fix_finger_index = ((index + 1) % self.finger.len().max(1)) as u8;
        index
    }

    /// Get the closest preceding finger of `did`.
    ///
    /// Scan from the largest stride down and return the first entry lying strictly
    /// between this node and `did`. Falls back to this node itself.
    pub fn closest_preceding(&self, space: &IdSpace, did: Did) -> Did {
        self.finger
            .iter()
            .rev()
            .find(|f| space.in_open(**f, self.did, did))
            .copied()
            .unwrap_or(self.did)
    }
}

impl Index<usize> for FingerTable {
    type Output = Did;
    fn index(&self, index: usize) -> &Self::Output {
        &self.finger[index]
    }
}
