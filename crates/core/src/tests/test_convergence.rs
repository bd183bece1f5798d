use std::sync::Arc;
use std::thread;

use crate::dht::Chord;
use crate::dht::NodeStatus;
use crate::dht::TopoInfo;
use crate::error::Result;
use crate::tests::assert_fingers_converged;
use crate::tests::assert_ring_closure;
use crate::tests::did;
use crate::tests::fix_all;
use crate::tests::prepare_nodes;
use crate::tests::prepare_ring;
use crate::tests::setup_tracing;
use crate::tests::stabilize_all;

#[test]
fn test_ring_closure_after_sequential_joins() -> Result<()> {
    let (swarm, nodes) = prepare_ring(8, &[179, 66, 29, 156, 184, 43, 13, 192, 150])?;
    stabilize_all(&swarm, 20)?;
    assert_ring_closure(&swarm, &nodes);
    Ok(())
}

#[test]
fn test_join_through_any_member() -> Result<()> {
    let (swarm, nodes) = prepare_nodes(8, &[100, 20, 220, 60, 140])?;
    swarm.join(&nodes[0], Some(&nodes[0]))?;
    // Every node joins through the one that joined just before it.
    for pair in nodes.windows(2) {
        swarm.join(&pair[1], Some(&pair[0]))?;
    }
    stabilize_all(&swarm, 20)?;
    fix_all(&swarm);
    assert_ring_closure(&swarm, &nodes);
    assert_fingers_converged(&swarm, &nodes);
    Ok(())
}

#[test]
fn test_stabilize_is_idempotent_on_stable_ring() -> Result<()> {
    let (swarm, nodes) = prepare_ring(8, &[10, 70, 130, 190])?;
    stabilize_all(&swarm, 20)?;
    fix_all(&swarm);

    let before: Vec<TopoInfo> = nodes.iter().map(|n| n.topo_info()).collect();
    let fingers: Vec<_> = nodes.iter().map(|n| n.finger().list().clone()).collect();
    for n in &nodes {
        assert_eq!(n.status(), NodeStatus::Stable);
        assert!(!swarm.stabilize(n)?);
        assert_eq!(n.status(), NodeStatus::Stable);
    }
    assert_eq!(fix_all(&swarm), 0);

    let after: Vec<TopoInfo> = nodes.iter().map(|n| n.topo_info()).collect();
    let fingers_after: Vec<_> = nodes.iter().map(|n| n.finger().list().clone()).collect();
    assert_eq!(before, after);
    assert_eq!(fingers, fingers_after);
    Ok(())
}

#[test]
fn test_notify_moves_stable_node_back_to_joined() -> Result<()> {
    let (swarm, nodes) = prepare_ring(3, &[1, 6])?;
    stabilize_all(&swarm, 10)?;
    let n6 = &nodes[1];
    assert_eq!(n6.status(), NodeStatus::Stable);

    // 3 lies in (1, 6), 0 does not.
    assert_eq!(swarm.notify(n6, did(0)), did(1));
    assert_eq!(n6.status(), NodeStatus::Stable);
    assert_eq!(swarm.notify(n6, did(3)), did(3));
    assert_eq!(n6.status(), NodeStatus::Joined);
    Ok(())
}

#[test]
fn test_stabilize_discovers_new_successor() -> Result<()> {
    let (swarm, nodes) = prepare_ring(3, &[1, 6])?;
    stabilize_all(&swarm, 10)?;
    let n3 = swarm.create_node_with_did(did(3), "node-3")?;
    swarm.join(&n3, Some(&nodes[1]))?;

    // The join already told both neighbours.
    assert_eq!(nodes[0].successor(), did(3));
    assert_eq!(nodes[1].predecessor(), Some(did(3)));

    // A member only reached from one side is picked up by stabilization.
    let n2 = swarm.create_node_with_did(did(2), "node-2")?;
    n2.lock_state_mut().successor = did(3);
    n2.lock_state_mut().predecessor = None;
    assert!(swarm.stabilize(&n2)?);
    assert_eq!(nodes[0].successor(), did(3));
    assert_eq!(n3.predecessor(), Some(did(2)));
    assert!(swarm.stabilize(&nodes[0])?);
    assert_eq!(nodes[0].successor(), did(2));
    assert_eq!(n2.predecessor(), Some(did(1)));
    assert!(!swarm.stabilize(&nodes[0])?);
    Ok(())
}

#[test]
fn test_concurrent_joins_converge() -> Result<()> {
    setup_tracing();
    let dids: [u64; 12] = [
        401, 9000, 9001, 15000, 23000, 31000, 40000, 41000, 47000, 52000, 60001, 65000,
    ];
    let (swarm, nodes) = prepare_nodes(16, &dids)?;
    let seed = nodes[0].clone();
    swarm.join(&seed, Some(&seed))?;

    thread::scope(|s| {
        for n in &nodes[1..] {
            let swarm = Arc::clone(&swarm);
            let seed = seed.clone();
            let n = n.clone();
            s.spawn(move || swarm.join(&n, Some(&seed)));
        }
    });
    for n in &nodes {
        assert_ne!(n.status(), NodeStatus::Standalone);
    }

    // Lookups keep running while the ring converges.
    thread::scope(|s| {
        for n in &nodes {
            let swarm = Arc::clone(&swarm);
            let n = n.clone();
            s.spawn(move || {
                for _ in 0..20 {
                    let _ = swarm.stabilize(&n);
                    swarm.fix_fingers(&n);
                    swarm.find_successor(&n, did(12345));
                }
            });
        }
    });

    stabilize_all(&swarm, 100)?;
    fix_all(&swarm);
    assert_ring_closure(&swarm, &nodes);
    assert_fingers_converged(&swarm, &nodes);
    Ok(())
}
