#![warn(missing_docs)]
//! Implementation of the ring's DHT
//! which is based on CHORD, ref: <https://pdos.csail.mit.edu/papers/ton:chord/paper-ton.pdf>
//! With high probability, the number of nodes that must be contacted to find a successor in an N-node network is O(log N).

mod chord;
pub mod did;
/// Finger table of a ring member
pub mod finger;
mod stabilization;
pub mod types;

pub use chord::Hop;
pub use chord::KeyStorage;
pub use chord::NodeStatus;
pub use chord::PeerRing;
pub use chord::RingState;
pub use chord::TopoInfo;
pub use did::Did;
pub use did::IdSpace;
pub use finger::FingerTable;
pub use finger::FixFingersMode;
pub use stabilization::Stabilizer;
pub use types::Chord;
pub use types::ChordStorage;
