//! Parameters of the scheme.
//!
//! The hash width and the Winternitz parameter are fixed constants. The shape of the
//! hypertree and of the few-time forest is carried at runtime by [`Params`], which is
//! validated once and then shared by every component.

use crate::{Error, Result};

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// Hash output length in bytes.
pub const HASH_N: usize = 32;

/// Seed length in bytes.
pub const SEED_BYTES: usize = HASH_N;

/// Winternitz parameter.
pub const WOTS_W: usize = 16;

/// Bits per base-w digit.
pub const WOTS_LOGW: usize = 4;

/// Number of message digits.
pub const WOTS_LEN1: usize = 8 * HASH_N / WOTS_LOGW;

/// Number of chains: the message digits plus a single checksum digit.
pub const WOTS_LEN: usize = WOTS_LEN1 + 1;

/// Largest value of the checksum digit, which is also the length of the checksum chain.
pub const WOTS_CHECKSUM_MAX: usize = WOTS_LEN1 * (WOTS_W - 1);

/// WOTS signature byte size.
pub const WOTS_BYTES: usize = WOTS_LEN * HASH_N;

/// Byte size of the signing index in the wire encodings.
pub const INDEX_BYTES: usize = 8;

/// Secret-key byte size: seed material followed by the signing index.
pub const SK_BYTES: usize = SEED_BYTES + INDEX_BYTES;

/// Public-key byte size.
pub const PK_BYTES: usize = HASH_N;

const MAX_TREE_HEIGHT: usize = 20;
const MAX_INDEX_BITS: usize = 63;

/// Shape of the hypertree and the few-time forest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Params {
    layers: usize,
    tree_height: usize,
    subtree_height: usize,
    fors_trees: usize,
    fors_height: usize,
}

impl Default for Params {
    /// Four layers of height-6 trees (2^24 signatures), built from height-3 subtrees, and a
    /// forest of 32 trees of height 8 consuming the whole digest.
    fn default() -> Self {
        Self {
            layers: 4,
            tree_height: 6,
            subtree_height: 3,
            fors_trees: 32,
            fors_height: 8,
        }
    }
}

impl Params {
    /// Builds and validates a parameter set.
    ///
    /// * `layers` - number of hypertree layers (`d`).
    /// * `tree_height` - height of each layer tree (`h`).
    /// * `subtree_height` - height of the subtrees a layer tree is computed from.
    /// * `fors_trees` - number of forest trees (`k`).
    /// * `fors_height` - height of each forest tree (`a`).
    pub fn new(
        layers: usize,
        tree_height: usize,
        subtree_height: usize,
        fors_trees: usize,
        fors_height: usize,
    ) -> Result<Self> {
        let params = Self {
            layers,
            tree_height,
            subtree_height,
            fors_trees,
            fors_height,
        };
        params.validate()?;
        Ok(params)
    }

    /// Checks every structural constraint. Deserialized parameters must pass through here
    /// before use.
    pub fn validate(&self) -> Result<()> {
        if self.layers == 0 {
            return Err(Error::InvalidParams("at least one layer is required".into()));
        }
        if self.tree_height == 0 || self.tree_height > MAX_TREE_HEIGHT {
            return Err(Error::InvalidParams(format!(
                "tree height must be within 1..={}, got {}",
                MAX_TREE_HEIGHT, self.tree_height
            )));
        }
        if self.subtree_height == 0 || self.subtree_height > self.tree_height {
            return Err(Error::InvalidParams(format!(
                "subtree height must be within 1..={}, got {}",
                self.tree_height, self.subtree_height
            )));
        }
        match self.layers.checked_mul(self.tree_height) {
            Some(bits) if bits <= MAX_INDEX_BITS => {},
            _ => {
                return Err(Error::InvalidParams(format!(
                    "layers * tree height must not exceed {} bits",
                    MAX_INDEX_BITS
                )))
            },
        }
        if self.fors_trees == 0 {
            return Err(Error::InvalidParams("at least one forest tree is required".into()));
        }
        if self.fors_height == 0 || self.fors_height > MAX_TREE_HEIGHT {
            return Err(Error::InvalidParams(format!(
                "forest tree height must be within 1..={}, got {}",
                MAX_TREE_HEIGHT, self.fors_height
            )));
        }
        match self.fors_trees.checked_mul(self.fors_height) {
            Some(bits) if bits <= 8 * HASH_N => {},
            _ => {
                return Err(Error::InvalidParams(format!(
                    "forest of {} trees of height {} consumes more than the {} digest bits",
                    self.fors_trees,
                    self.fors_height,
                    8 * HASH_N
                )))
            },
        }
        Ok(())
    }

    pub fn layers(&self) -> usize {
        self.layers
    }

    pub fn tree_height(&self) -> usize {
        self.tree_height
    }

    pub fn subtree_height(&self) -> usize {
        self.subtree_height
    }

    pub fn fors_trees(&self) -> usize {
        self.fors_trees
    }

    pub fn fors_height(&self) -> usize {
        self.fors_height
    }

    /// Total number of index bits, i.e. `layers * tree_height`.
    pub fn index_bits(&self) -> usize {
        self.layers * self.tree_height
    }

    /// Number of signatures a key can produce; the signing index must stay below it.
    pub fn max_signatures(&self) -> u64 {
        1u64 << self.index_bits()
    }

    /// Byte size of a forest signature.
    pub fn fors_bytes(&self) -> usize {
        self.fors_trees * (self.fors_height + 1) * HASH_N
    }

    /// Byte size of a hypertree signature, including the leading signing index.
    pub fn hypertree_bytes(&self) -> usize {
        INDEX_BYTES + self.layers * (WOTS_BYTES + self.tree_height * HASH_N)
    }

    /// Byte size of a full signature.
    pub fn signature_bytes(&self) -> usize {
        self.fors_bytes() + self.hypertree_bytes()
    }
}
