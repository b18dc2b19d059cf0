//! # Hypertree
//!
//! `d` layers of Merkle trees whose leaves are WOTS public digests. The signing index is read
//! as `d` groups of `h` bits, least significant group first: group `j` selects the leaf at
//! layer `j`, and the bits above it address which tree of layer `j` is used. Layer 0 signs the
//! forest root, every higher layer signs the root of the tree below it, and the single tree of
//! layer `d-1` carries the public key as its root.
//!
//! Tree `(j, address)` is generated from `seed.derive(j).derive(address)` and leaf `i` of it
//! from one more `derive(i)`. Because signing indices never repeat, every WOTS keypair in
//! the structure signs at most one distinct value.

use crate::hash::Digest;
use crate::merkle::{treehash, AuthPath, MerkleTree};
use crate::params::{Params, WOTS_LEN};
use crate::seed::Seed;
use crate::utils::{ct_eq, u64_to_bytes, ByteReader};
use crate::wots::{Wots, WotsSignature};
use crate::{Error, Result, VerificationError};
use rayon::prelude::*;
use tracing::trace;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// One layer's contribution: the WOTS signature over the value below, and the path
/// authenticating the signing leaf in this layer's tree.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct LayerSignature {
    pub wots_sig: WotsSignature,
    pub auth_path: AuthPath,
    pub leaf_index: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct HypertreeSignature {
    /// The signing index the layer leaves were selected from.
    pub index: u64,
    /// Layer 0 first.
    pub layers: Vec<LayerSignature>,
}

impl HypertreeSignature {
    /// Appends the wire encoding: the index, then per layer the chain values followed by the
    /// siblings. Leaf indices are implied by the index.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&u64_to_bytes(self.index));
        for layer in &self.layers {
            for value in layer.wots_sig.as_ref() {
                out.extend_from_slice(value);
            }
            for sibling in &layer.auth_path {
                out.extend_from_slice(sibling);
            }
        }
    }

    pub(crate) fn read_from(reader: &mut ByteReader<'_>, params: &Params) -> Result<Self> {
        let hypertree = Hypertree::new(params);
        let index = reader.u64()?;
        let layers = (0..params.layers())
            .map(|layer| {
                Ok(LayerSignature {
                    wots_sig: WotsSignature(reader.digests(WOTS_LEN)?),
                    auth_path: reader.digests(params.tree_height())?,
                    leaf_index: hypertree.leaf_index(index, layer),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { index, layers })
    }
}

/// The hypertree operations for a fixed shape `(d, h)`.
#[derive(Clone, Copy, Debug)]
pub struct Hypertree {
    layers: usize,
    height: usize,
    subtree_height: usize,
}

impl Hypertree {
    pub fn new(params: &Params) -> Self {
        Self {
            layers: params.layers(),
            height: params.tree_height(),
            subtree_height: params.subtree_height(),
        }
    }

    /// Exclusive bound on signing indices.
    pub fn max_index(&self) -> u64 {
        1u64 << (self.layers * self.height)
    }

    /// Leaf selected at `layer` by `index`.
    pub fn leaf_index(&self, index: u64, layer: usize) -> u32 {
        ((index >> (layer * self.height)) & ((1u64 << self.height) - 1)) as u32
    }

    /// Address of the tree used at `layer` by `index`.
    pub fn tree_address(&self, index: u64, layer: usize) -> u64 {
        let shift = (layer + 1) * self.height;
        if shift >= 64 {
            0
        } else {
            index >> shift
        }
    }

    /// Builds the tree `(layer, tree_address)`; its leaves are computed in parallel.
    pub fn layer_tree(&self, seed: &Seed, layer: usize, tree_address: u64) -> Result<MerkleTree> {
        self.tree_from_seed(&Self::tree_seed(seed, layer, tree_address))
    }

    fn tree_seed(seed: &Seed, layer: usize, tree_address: u64) -> Seed {
        seed.derive(layer as u64).derive(tree_address)
    }

    fn tree_from_seed(&self, tree_seed: &Seed) -> Result<MerkleTree> {
        MerkleTree::from_leaf_fn(self.height, self.subtree_height, |leaf| {
            Wots::public_digest(&tree_seed.derive(leaf as u64))
        })
    }

    /// Returns the public root: the root of the only tree in the top layer.
    pub fn keygen(&self, seed: &Seed) -> Result<Digest> {
        Ok(*self.layer_tree(seed, self.layers - 1, 0)?.root())
    }

    /// Signs `root` at signing index `index`.
    pub fn sign(&self, root: &Digest, index: u64, seed: &Seed) -> Result<HypertreeSignature> {
        if index >= self.max_index() {
            return Err(Error::IndexExhausted {
                index,
                bound: self.max_index(),
            });
        }

        // The trees on the signing path are independent of each other.
        let trees = (0..self.layers)
            .into_par_iter()
            .map(|layer| {
                let tree_seed = Self::tree_seed(seed, layer, self.tree_address(index, layer));
                let tree = self.tree_from_seed(&tree_seed)?;
                Ok((tree_seed, tree))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut current = *root;
        let mut layers = Vec::with_capacity(self.layers);
        for (layer, (tree_seed, tree)) in trees.iter().enumerate() {
            let leaf_index = self.leaf_index(index, layer);
            let wots_sk = Wots::secret_key(&tree_seed.derive(leaf_index as u64));
            layers.push(LayerSignature {
                wots_sig: Wots::sign(&current, wots_sk),
                auth_path: tree.auth_path(leaf_index as usize)?,
                leaf_index,
            });
            trace!(layer, leaf_index, "signed hypertree layer");
            current = *tree.root();
        }
        Ok(HypertreeSignature { index, layers })
    }

    /// Replays the layers upward from `root` and returns the recomputed top root.
    pub fn pk_from_sig(&self, signature: &HypertreeSignature, root: &Digest) -> Result<Digest> {
        if signature.index >= self.max_index() {
            return Err(VerificationError::IndexOutOfRange {
                index: signature.index,
                bound: self.max_index(),
            }
            .into());
        }
        if signature.layers.len() != self.layers {
            return Err(Error::SignatureMalformed(format!(
                "hypertree signature has {} layers, expected {}",
                signature.layers.len(),
                self.layers
            )));
        }

        let mut current = *root;
        for (layer, layer_sig) in signature.layers.iter().enumerate() {
            if layer_sig.leaf_index != self.leaf_index(signature.index, layer) {
                return Err(Error::SignatureMalformed(format!(
                    "layer {} leaf index {} does not match signing index {}",
                    layer, layer_sig.leaf_index, signature.index
                )));
            }
            if layer_sig.auth_path.len() != self.height {
                return Err(Error::SignatureMalformed(format!(
                    "layer {} authentication path has {} nodes, expected {}",
                    layer,
                    layer_sig.auth_path.len(),
                    self.height
                )));
            }
            let leaf = Wots::pk_from_sig(&current, &layer_sig.wots_sig)?;
            current = treehash(&leaf, layer_sig.leaf_index as u64, &layer_sig.auth_path);
        }
        Ok(current)
    }

    pub fn verify(&self, signature: &HypertreeSignature, root: &Digest, pk: &Digest) -> bool {
        match self.pk_from_sig(signature, root) {
            Ok(calculated) => ct_eq(&calculated, pk),
            Err(_) => false,
        }
    }
}
