use std::sync::Arc;

use crate::dht::Chord;
use crate::dht::Did;
use crate::dht::IdSpace;
use crate::dht::PeerRing;
use crate::error::Result;
use crate::swarm::Swarm;

mod test_convergence;
mod test_ownership;

pub fn setup_tracing() {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .finish();

    // Several tests may ask for it, the first one wins.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

pub fn did(x: u64) -> Did {
    Did::from(x)
}

/// Members at fixed positions, all standalone.
pub fn prepare_nodes(bits: u8, dids: &[u64]) -> Result<(Arc<Swarm>, Vec<Arc<PeerRing>>)> {
    let swarm = Arc::new(Swarm::new(IdSpace::new(bits)?));
    let nodes = dids
        .iter()
        .map(|x| swarm.create_node_with_did(did(*x), &format!("node-{x}")))
        .collect::<Result<Vec<_>>>()?;
    Ok((swarm, nodes))
}

/// Members at fixed positions, each joined through the first one.
pub fn prepare_ring(bits: u8, dids: &[u64]) -> Result<(Arc<Swarm>, Vec<Arc<PeerRing>>)> {
    let (swarm, nodes) = prepare_nodes(bits, dids)?;
    swarm.join(&nodes[0], Some(&nodes[0]))?;
    for n in &nodes[1..] {
        swarm.join(n, Some(&nodes[0]))?;
    }
    Ok((swarm, nodes))
}

/// Run stabilize on every member until a whole round changes nothing.
/// Returns the number of rounds run.
pub fn stabilize_all(swarm: &Swarm, max_rounds: usize) -> Result<usize> {
    for round in 1..=max_rounds {
        let mut changed = false;
        for n in swarm.nodes() {
            changed |= swarm.stabilize(&n)?;
        }
        if !changed {
            return Ok(round);
        }
    }
    Ok(max_rounds)
}

pub fn fix_all(swarm: &Swarm) -> usize {
    swarm.nodes().iter().map(|n| swarm.fix_fingers(n)).sum()
}

/// Dids of all members in ring order.
pub fn sorted_dids(nodes: &[Arc<PeerRing>]) -> Vec<Did> {
    let mut dids: Vec<Did> = nodes.iter().map(|n| n.did).collect();
    dids.sort();
    dids
}

/// The member owning `x`, computed from the membership alone.
pub fn true_successor(dids: &[Did], x: Did) -> Did {
    dids.iter().copied().find(|d| *d >= x).unwrap_or(dids[0])
}

pub fn assert_ring_closure(swarm: &Swarm, nodes: &[Arc<PeerRing>]) {
    let dids = sorted_dids(nodes);
    for n in nodes {
        let start = dids.iter().position(|d| *d == n.did).unwrap();
        let clockwise: Vec<Did> = (0..dids.len())
            .map(|i| dids[(start + i) % dids.len()])
            .collect();
        assert_eq!(swarm.successor_walk(n), clockwise, "successor walk from {}", n.did);

        let counter_clockwise: Vec<Did> = (0..dids.len())
            .map(|i| dids[(start + dids.len() - i) % dids.len()])
            .collect();
        assert_eq!(
            swarm.predecessor_walk(n),
            counter_clockwise,
            "predecessor walk from {}",
            n.did
        );
    }
}

pub fn assert_fingers_converged(swarm: &Swarm, nodes: &[Arc<PeerRing>]) {
    let dids = sorted_dids(nodes);
    let space = swarm.space();
    for n in nodes {
        let finger = n.finger();
        for i in 0..space.bits() {
            let start = space.finger_start(n.did, i);
            assert_eq!(
                finger[i as usize],
                true_successor(&dids, start),
                "finger {} of {}",
                i,
                n.did
            );
        }
    }
}
