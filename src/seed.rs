//! Secret seed material and its derivation.
//!
//! All secret values of a key pair descend from one master [`Seed`]: fresh entropy comes from
//! the operating system, every child is `H(parent || index)` with a big-endian 64-bit index.
//! Derivation is a pure function, so no generator state has to be carried between calls.

use crate::hash::{hash_parts, Digest};
use crate::params::SEED_BYTES;
use crate::utils::u64_to_bytes;
use crate::{Error, Result};
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// A secret seed. Wiped from memory on drop and redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Seed([u8; SEED_BYTES]);

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed(..)")
    }
}

impl AsRef<[u8]> for Seed {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; SEED_BYTES]> for Seed {
    fn from(value: [u8; SEED_BYTES]) -> Self {
        Self(value)
    }
}

impl TryFrom<&[u8]> for Seed {
    type Error = Error;
    fn try_from(data: &[u8]) -> Result<Seed> {
        if data.len() != SEED_BYTES {
            Err(Error::BadLength(SEED_BYTES, data.len()))
        } else {
            let mut array = [0u8; SEED_BYTES];
            array.copy_from_slice(data);
            Ok(Seed(array))
        }
    }
}

impl Seed {
    /// Draws a new seed from the operating system's entropy source.
    pub fn fresh() -> Self {
        let mut bytes = [0u8; SEED_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Derives the `index`-th child seed.
    pub fn derive(&self, index: u64) -> Seed {
        Seed(hash_parts(&[self.0.as_ref(), u64_to_bytes(index).as_ref()]))
    }

    /// Uses this seed directly as a hash-domain value, e.g. as the start of a chain.
    pub(crate) fn to_digest(&self) -> Digest {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_is_deterministic_and_distinct() {
        let parent = Seed::from([0u8; SEED_BYTES]);
        assert_eq!(parent.derive(0), parent.derive(0));
        assert_ne!(parent.derive(0), parent.derive(1));
        assert_ne!(parent.derive(0), parent);
        assert_ne!(parent.derive(0).derive(1), parent.derive(1).derive(0));
    }

    #[test]
    fn test_fresh_seeds_differ() {
        assert_ne!(Seed::fresh(), Seed::fresh());
    }

    #[test]
    fn test_debug_is_redacted() {
        let seed = Seed::from([0xab; SEED_BYTES]);
        assert_eq!(format!("{:?}", seed), "Seed(..)");
    }

    #[test]
    fn test_try_from_checks_length() {
        assert_eq!(
            Seed::try_from([0u8; 5].as_ref()),
            Err(Error::BadLength(SEED_BYTES, 5))
        );
        assert!(Seed::try_from([0u8; SEED_BYTES].as_ref()).is_ok());
    }
}
