#![warn(missing_docs)]

//! Identifier space of the ring.
//!
//! A ring of width `m` is the cyclic group Z/2^m. Every member and every key is
//! placed on it by [IdSpace::hash], and every routing decision is expressed with
//! [IdSpace::between], so the wrap-around rule lives in exactly one place.
//!
//! Positions are compared the same way the ring is walked: clockwise distance from
//! a reference point. `x` is strictly between `lo` and `hi` when walking clockwise
//! from `lo` reaches `x` before `hi`.

use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;

use crate::consts::MAX_RING_BITS;
use crate::error::Error;
use crate::error::Result;

/// Did is the position of a member or a key on the ring, in `[0, 2^m)`.
#[derive(Copy, Clone, Eq, Ord, PartialEq, PartialOrd, Debug, Serialize, Deserialize, Hash)]
pub struct Did(u64);

impl std::fmt::Display for Did {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Did {
    fn from(id: u64) -> Did {
        Did(id)
    }
}

impl From<u32> for Did {
    fn from(id: u32) -> Did {
        Did(id.into())
    }
}

impl From<Did> for u64 {
    fn from(did: Did) -> u64 {
        did.0
    }
}

impl FromStr for Did {
    type Err = Error;
    /// Accepts decimal, or hexadecimal with a `0x` prefix.
    fn from_str(s: &str) -> Result<Self> {
        let parsed = match s.strip_prefix("0x") {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => s.parse::<u64>(),
        };
        parsed.map(Did).map_err(|_| Error::BadDid(s.to_string()))
    }
}

/// The identifier space of one ring instance.
///
/// The width is runtime configuration, so rings of different widths can live in
/// the same process.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize, Hash)]
pub struct IdSpace {
    bits: u8,
}

impl IdSpace {
    /// Create a space of `2^bits` identifiers, `bits` must be within `1..=64`.
    pub fn new(bits: u8) -> Result<Self> {
        if bits == 0 || bits > MAX_RING_BITS {
            return Err(Error::InvalidRingWidth(bits));
        }
        Ok(Self { bits })
    }

    /// Width `m` of the ring. It is also the length of every finger table.
    pub fn bits(&self) -> u8 {
        self.bits
    }

    /// Number of identifiers on the ring.
    pub fn size(&self) -> u128 {
        1u128 << self.bits
    }

    fn mask(&self) -> u64 {
        if self.bits == MAX_RING_BITS {
            u64::MAX
        } else {
            (1u64 << self.bits) - 1
        }
    }

    /// Reduce a raw integer onto the ring.
    pub fn did(&self, raw: u64) -> Did {
        Did(raw & self.mask())
    }

    /// Check that a did is a valid position of this ring.
    pub fn contains(&self, did: Did) -> bool {
        did.0 & !self.mask() == 0
    }

    /// Place an identity (a network address, a key) on the ring.
    ///
    /// The SHA-256 digest is XOR-folded from four big-endian 64 bits words into
    /// one, then reduced modulo `2^m`.
    pub fn hash(&self, identity: impl AsRef<[u8]>) -> Did {
        let digest = Sha256::digest(identity.as_ref());
        let folded = digest.chunks_exact(8).fold(0u64, |acc, word| {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(word);
            acc ^ u64::from_be_bytes(buf)
        });
        self.did(folded)
    }

    /// `did + offset mod 2^m`.
    pub fn add(&self, did: Did, offset: u64) -> Did {
        self.did(did.0.wrapping_add(offset))
    }

    /// Clockwise distance from `from` to `to`.
    pub fn distance(&self, from: Did, to: Did) -> u64 {
        to.0.wrapping_sub(from.0) & self.mask()
    }

    /// Start of the `index`-th finger interval of `did`, which is `did + 2^index`.
    pub fn finger_start(&self, did: Did, index: u8) -> Did {
        debug_assert!(index < self.bits, "finger index out of range");
        self.add(did, 1u64 << index)
    }

    /// Cyclic interval test.
    ///
    /// With both ends exclusive, `x` is between `lo` and `hi` when `lo < x < hi`
    /// for `lo < hi`, and when `x > lo || x < hi` for `lo >= hi`. In particular
    /// `(a, a)` is the whole ring except `a`. The flags additionally admit
    /// `x == lo` and `x == hi`.
    pub fn between(&self, x: Did, lo: Did, hi: Did, inclusive_lo: bool, inclusive_hi: bool) -> bool {
        if (inclusive_lo && x == lo) || (inclusive_hi && x == hi) {
            return true;
        }
        if lo == hi {
            return x != lo;
        }
        let dx = self.distance(lo, x);
        dx > 0 && dx < self.distance(lo, hi)
    }

    /// Test x <- (lo, hi)
    pub fn in_open(&self, x: Did, lo: Did, hi: Did) -> bool {
        self.between(x, lo, hi, false, false)
    }

    /// Test x <- (lo, hi]
    pub fn in_half_open(&self, x: Did, lo: Did, hi: Did) -> bool {
        self.between(x, lo, hi, false, true)
    }
}
