//! A prelude is provided which imports all the important data types and traits of the chord node.
/// Use this when you want to quickly bootstrap a new project.
pub use chord_core;

pub use self::chord_core::dht::Chord;
pub use self::chord_core::dht::ChordStorage;
pub use self::chord_core::dht::Did;
pub use self::chord_core::dht::FixFingersMode;
pub use self::chord_core::dht::IdSpace;
pub use self::chord_core::dht::PeerRing;
pub use self::chord_core::dht::Stabilizer;
pub use self::chord_core::inspect::SwarmInspect;
pub use self::chord_core::swarm::Swarm;
