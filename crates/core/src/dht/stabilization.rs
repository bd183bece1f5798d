//! Stabilization run daemons to maintain dht.

use std::sync::Arc;

use crate::dht::Chord;
use crate::dht::FixFingersMode;
use crate::dht::PeerRing;
use crate::error::Result;
use crate::swarm::Swarm;

/// The stabilization runner of one ring member.
#[derive(Clone)]
pub struct Stabilizer {
    swarm: Arc<Swarm>,
    dht: Arc<PeerRing>,
    mode: FixFingersMode,
}

impl Stabilizer {
    /// Create a new stabilization runner refreshing the whole finger table.
    pub fn new(swarm: Arc<Swarm>, dht: Arc<PeerRing>) -> Self {
        Self::with_mode(swarm, dht, FixFingersMode::default())
    }

    /// Create a new stabilization runner with a finger refresh policy.
    pub fn with_mode(swarm: Arc<Swarm>, dht: Arc<PeerRing>, mode: FixFingersMode) -> Self {
        Self { swarm, dht, mode }
    }

    /// The member this runner maintains.
    pub fn dht(&self) -> Arc<PeerRing> {
        self.dht.clone()
    }

    /// Run stabilization once, returns whether a link changed.
    pub fn stabilize(&self) -> Result<bool> {
        tracing::debug!("STABILIZATION stabilize start {}", self.dht.did);
        let changed = self.swarm.stabilize(&self.dht).map_err(|e| {
            tracing::error!("[stabilize] Failed on {}: {:?}", self.dht.did, e);
            e
        })?;
        tracing::debug!("STABILIZATION stabilize end, changed: {}", changed);
        Ok(changed)
    }

    /// Fix fingers following the refresh policy, returns how many entries changed.
    pub fn fix_fingers(&self) -> usize {
        tracing::debug!("STABILIZATION fix_fingers start {}", self.dht.did);
        let changed = match self.mode {
            FixFingersMode::All => self.swarm.fix_fingers(&self.dht),
            FixFingersMode::Rotating => self.swarm.fix_next_finger(&self.dht),
        };
        tracing::debug!("STABILIZATION fix_fingers end, changed: {}", changed);
        changed
    }
}

mod stabilizer {
    use std::sync::Arc;
    use std::time::Duration;

    use futures::future::FutureExt;
    use futures::pin_mut;
    use futures::select;
    use futures_timer::Delay;

    use super::*;

    impl Stabilizer {
        /// Run stabilization in a loop.
        pub async fn wait(self: Arc<Self>, interval: Duration) {
            loop {
                let timeout = Delay::new(interval).fuse();
                pin_mut!(timeout);
                select! {
                    _ = timeout => {
                        // Errors are logged by stabilize, the next tick retries.
                        let _ = self.stabilize();
                    }
                }
            }
        }

        /// Run finger fixing in a loop.
        pub async fn wait_fix_fingers(self: Arc<Self>, interval: Duration) {
            loop {
                let timeout = Delay::new(interval).fuse();
                pin_mut!(timeout);
                select! {
                    _ = timeout => {
                        self.fix_fingers();
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::dht::Did;
    use crate::dht::IdSpace;
    use crate::dht::NodeStatus;

    fn ring() -> Result<(Arc<Swarm>, Vec<Arc<PeerRing>>)> {
        let swarm = Arc::new(Swarm::new(IdSpace::new(3)?));
        let nodes = vec![
            swarm.create_node_with_did(Did::from(1u64), "n1")?,
            swarm.create_node_with_did(Did::from(3u64), "n3")?,
            swarm.create_node_with_did(Did::from(6u64), "n6")?,
        ];
        swarm.join(&nodes[1], Some(&nodes[0]))?;
        swarm.join(&nodes[2], Some(&nodes[0]))?;
        Ok((swarm, nodes))
    }

    #[test]
    fn test_rotating_mode_refreshes_one_entry_per_tick() -> Result<()> {
        let (swarm, nodes) = ring()?;
        let stabilizers: Vec<Stabilizer> = nodes
            .iter()
            .map(|n| Stabilizer::with_mode(swarm.clone(), n.clone(), FixFingersMode::Rotating))
            .collect();
        for _ in 0..3 {
            for s in &stabilizers {
                s.stabilize()?;
            }
        }
        // Three ticks cover every entry of a 3 bit ring.
        for _ in 0..3 {
            for s in &stabilizers {
                s.fix_fingers();
            }
        }
        for n in &nodes {
            for i in 0..3u8 {
                let start = swarm.space().finger_start(n.did, i);
                assert_eq!(n.finger()[i as usize], swarm.find_successor(n, start));
            }
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_wait_converges_ring() -> Result<()> {
        let (swarm, nodes) = ring()?;
        let mut handles = vec![];
        for n in &nodes {
            let stabilizer = Arc::new(Stabilizer::new(swarm.clone(), n.clone()));
            handles.push(tokio::spawn(
                stabilizer.clone().wait(Duration::from_millis(5)),
            ));
            handles.push(tokio::spawn(
                stabilizer.wait_fix_fingers(Duration::from_millis(5)),
            ));
        }
        tokio::time::sleep(Duration::from_millis(300)).await;
        for h in handles {
            h.abort();
        }

        assert_eq!(nodes[0].successor(), nodes[1].did);
        assert_eq!(nodes[1].successor(), nodes[2].did);
        assert_eq!(nodes[2].successor(), nodes[0].did);
        for n in &nodes {
            assert_eq!(n.status(), NodeStatus::Stable);
        }
        Ok(())
    }
}
