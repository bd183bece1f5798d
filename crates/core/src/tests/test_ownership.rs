use std::sync::Arc;

use crate::dht::Chord;
use crate::dht::ChordStorage;
use crate::dht::Did;
use crate::dht::IdSpace;
use crate::dht::PeerRing;
use crate::error::Error;
use crate::error::Result;
use crate::swarm::Swarm;
use crate::tests::did;
use crate::tests::prepare_nodes;
use crate::tests::sorted_dids;
use crate::tests::stabilize_all;
use crate::tests::true_successor;

fn holders(nodes: &[Arc<PeerRing>], key: &str) -> Vec<Did> {
    nodes
        .iter()
        .filter(|n| n.keys().iter().any(|(k, _)| k == key))
        .map(|n| n.did)
        .collect()
}

#[test]
fn test_key_moves_to_joining_node() -> Result<()> {
    let swarm = Swarm::new(IdSpace::new(3)?);
    let n1 = swarm.create_node("10.0.0.5:7000")?;
    swarm.join(&n1, Some(&n1))?;
    // "banana" hashes to 5.
    assert_eq!(swarm.put(&n1, "banana", "yellow")?, did(1));
    assert_eq!(n1.keys(), vec![("banana".to_string(), "yellow".to_string())]);

    let n6 = swarm.create_node("addr11")?;
    swarm.join(&n6, Some(&n1))?;
    assert!(n1.keys().is_empty());
    assert_eq!(n6.keys(), vec![("banana".to_string(), "yellow".to_string())]);

    // 5 is still inside (3, 6] once 3 joins.
    let n3 = swarm.create_node("addr1")?;
    swarm.join(&n3, Some(&n1))?;
    assert!(n3.keys().is_empty());
    assert_eq!(holders(&[n1.clone(), n3.clone(), n6.clone()], "banana"), vec![n6.did]);
    assert_eq!(swarm.get(&n3, "banana")?, Some("yellow".to_string()));
    Ok(())
}

#[test]
fn test_key_wraps_around_zero() -> Result<()> {
    let swarm = Swarm::new(IdSpace::new(3)?);
    let n3 = swarm.create_node("addr1")?;
    // "k" hashes to 7 and "apple" to 0, both owned by 1 once it joins.
    swarm.put(&n3, "k", "v1")?;
    swarm.put(&n3, "apple", "v2")?;
    swarm.put(&n3, "key", "v3")?;

    let n1 = swarm.create_node("10.0.0.5:7000")?;
    swarm.join(&n1, Some(&n3))?;
    assert_eq!(
        n1.keys(),
        vec![
            ("apple".to_string(), "v2".to_string()),
            ("k".to_string(), "v1".to_string()),
        ]
    );
    assert_eq!(n3.keys(), vec![("key".to_string(), "v3".to_string())]);
    Ok(())
}

#[test]
fn test_every_key_has_exactly_one_owner() -> Result<()> {
    let dids = [250, 12, 99, 180, 40, 141, 220, 75, 3, 199];
    let (swarm, nodes) = prepare_nodes(8, &dids)?;
    let keys: Vec<String> = (0..60).map(|i| format!("key-{i}")).collect();

    swarm.join(&nodes[0], Some(&nodes[0]))?;
    for key in &keys {
        swarm.put(&nodes[0], key, &key.to_uppercase())?;
    }

    for i in 1..nodes.len() {
        swarm.join(&nodes[i], Some(&nodes[0]))?;
        let joined = &nodes[..=i];
        let members = sorted_dids(joined);
        for key in &keys {
            let owner = true_successor(&members, swarm.space().hash(key));
            assert_eq!(holders(joined, key), vec![owner], "{} after {} joins", key, i);
        }
    }

    stabilize_all(&swarm, 20)?;
    for n in &nodes {
        for key in &keys {
            assert_eq!(swarm.get(n, key)?, Some(key.to_uppercase()));
        }
    }
    let total: usize = nodes.iter().map(|n| n.keys().len()).sum();
    assert_eq!(total, keys.len());
    Ok(())
}

#[test]
fn test_put_overwrites_on_owner() -> Result<()> {
    let (swarm, nodes) = prepare_nodes(8, &[10, 130])?;
    swarm.join(&nodes[1], Some(&nodes[0]))?;
    let owner = swarm.put(&nodes[0], "fruit", "apple")?;
    assert_eq!(swarm.put(&nodes[1], "fruit", "pear")?, owner);
    assert_eq!(swarm.get(&nodes[0], "fruit")?, Some("pear".to_string()));
    Ok(())
}

#[test]
fn test_local_access_on_wrong_node_is_retryable() -> Result<()> {
    let (swarm, nodes) = prepare_nodes(3, &[1, 6])?;
    swarm.join(&nodes[1], Some(&nodes[0]))?;
    // "banana" hashes to 5, owned by 6.
    let err = nodes[0].put_local("banana", "yellow".to_string()).unwrap_err();
    assert_eq!(
        err,
        Error::KeyNotOwned {
            key: "banana".to_string(),
            did: did(1)
        }
    );
    assert!(err.is_retryable());
    assert!(!Error::InvalidJoinTarget.is_retryable());
    assert_eq!(swarm.get(&nodes[0], "banana")?, None);
    Ok(())
}
