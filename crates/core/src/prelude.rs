//! prelude

pub use dashmap;
pub use futures;

pub use crate::dht::Chord;
pub use crate::dht::ChordStorage;
pub use crate::dht::Did;
pub use crate::dht::FixFingersMode;
pub use crate::dht::IdSpace;
pub use crate::dht::NodeStatus;
pub use crate::dht::PeerRing;
pub use crate::dht::Stabilizer;
pub use crate::inspect::DHTInspect;
pub use crate::inspect::SwarmInspect;
pub use crate::swarm::Route;
pub use crate::swarm::Swarm;
