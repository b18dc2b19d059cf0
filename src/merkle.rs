//! # Merkle Authentication Trees
//!
//! A binary hash tree over `2^height` leaves, stored as one flat arena: level 0 (the leaves)
//! first, then each parent level, ending with the root. The node at `(level, i)` lives at
//! `offset(level) + i`, where `offset(level) = 2^(height+1) - 2^(height+1-level)`.
//!
//! Trees can be built directly or by subtree decomposition: the leaves are cut into
//! `2^(height - subtree_height)` subtrees, each built independently (and in parallel), and an
//! upper tree is built over their roots. Both paths fill the same arena, so decomposition
//! never changes a single node, only how the work is scheduled.

use crate::hash::{hash_pair, Digest};
use crate::{Error, Result};
use rayon::prelude::*;

/// Sibling digests from the leaf level up to (excluding) the root.
pub type AuthPath = Vec<Digest>;

/// Below this many parents a level is hashed sequentially.
const PAR_LEVEL_THRESHOLD: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleTree {
    height: usize,
    nodes: Vec<Digest>,
}

impl MerkleTree {
    /// Builds a tree bottom-up. The number of leaves must be a power of two.
    pub fn build(leaves: Vec<Digest>) -> Result<Self> {
        let height = Self::height_for(leaves.len())?;
        let mut nodes = leaves;
        nodes.reserve(nodes.len().saturating_sub(1));

        let mut start = 0;
        let mut width = 1usize << height;
        while width > 1 {
            let parents = Self::hash_level(&nodes[start..start + width]);
            start += width;
            width >>= 1;
            nodes.extend(parents);
        }
        Ok(Self { height, nodes })
    }

    /// Builds the same tree as [`MerkleTree::build`], computing subtrees of height
    /// `subtree_height` independently before joining them under an upper tree.
    pub fn build_decomposed(leaves: Vec<Digest>, subtree_height: usize) -> Result<Self> {
        let height = Self::height_for(leaves.len())?;
        if subtree_height == 0 {
            return Err(Error::InvalidInput("subtree height must be positive".into()));
        }
        if subtree_height >= height {
            return Self::build(leaves);
        }

        let subtrees = leaves
            .par_chunks(1 << subtree_height)
            .map(|chunk| Self::build(chunk.to_vec()))
            .collect::<Result<Vec<_>>>()?;
        let upper = Self::build(subtrees.iter().map(|t| *t.root()).collect())?;

        let mut nodes = Vec::with_capacity((2usize << height) - 1);
        for level in 0..=subtree_height {
            for subtree in &subtrees {
                nodes.extend_from_slice(subtree.level(level));
            }
        }
        for level in 1..=upper.height {
            nodes.extend_from_slice(upper.level(level));
        }
        Ok(Self { height, nodes })
    }

    /// Computes the leaves in parallel with `leaf_fn`, then builds the tree by subtree
    /// decomposition.
    pub fn from_leaf_fn<F>(height: usize, subtree_height: usize, leaf_fn: F) -> Result<Self>
    where
        F: Fn(usize) -> Digest + Sync + Send,
    {
        let leaves: Vec<Digest> = (0..1usize << height).into_par_iter().map(leaf_fn).collect();
        Self::build_decomposed(leaves, subtree_height)
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn root(&self) -> &Digest {
        &self.nodes[self.nodes.len() - 1]
    }

    pub fn leaf(&self, index: usize) -> Option<&Digest> {
        self.node(0, index)
    }

    /// The node at position `index` of `level` (0 = leaves).
    pub fn node(&self, level: usize, index: usize) -> Option<&Digest> {
        if level > self.height || index >= (1 << (self.height - level)) {
            return None;
        }
        Some(&self.nodes[Self::level_offset(self.height, level) + index])
    }

    /// Sibling digests for `leaf_index`, leaf level first.
    pub fn auth_path(&self, leaf_index: usize) -> Result<AuthPath> {
        if leaf_index >= (1 << self.height) {
            return Err(Error::InvalidInput(format!(
                "leaf index {} out of range for a tree of height {}",
                leaf_index, self.height
            )));
        }
        Ok((0..self.height)
            .map(|level| self.level(level)[(leaf_index >> level) ^ 1])
            .collect())
    }

    fn level(&self, level: usize) -> &[Digest] {
        let start = Self::level_offset(self.height, level);
        &self.nodes[start..start + (1 << (self.height - level))]
    }

    fn level_offset(height: usize, level: usize) -> usize {
        (2 << height) - (2 << (height - level))
    }

    fn hash_level(children: &[Digest]) -> Vec<Digest> {
        if children.len() / 2 >= PAR_LEVEL_THRESHOLD {
            children
                .par_chunks(2)
                .map(|pair| hash_pair(&pair[0], &pair[1]))
                .collect()
        } else {
            children
                .chunks(2)
                .map(|pair| hash_pair(&pair[0], &pair[1]))
                .collect()
        }
    }

    fn height_for(leaves: usize) -> Result<usize> {
        if !leaves.is_power_of_two() {
            return Err(Error::InvalidInput(format!(
                "a Merkle tree needs a power-of-two number of leaves, got {}",
                leaves
            )));
        }
        Ok(leaves.trailing_zeros() as usize)
    }
}

/// Recomputes a root from a leaf, its index and its authentication path.
///
/// At level `i` the accumulator is the left child when bit `i` of `leaf_index` is 0 and the
/// right child otherwise. Index bits above `siblings.len()` are ignored; callers check range.
pub fn treehash(leaf: &Digest, leaf_index: u64, siblings: &[Digest]) -> Digest {
    let mut node = *leaf;
    let mut index = leaf_index;
    for sibling in siblings {
        node = if index & 1 == 0 {
            hash_pair(&node, sibling)
        } else {
            hash_pair(sibling, &node)
        };
        index >>= 1;
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::hash;

    fn leaves(n: usize) -> Vec<Digest> {
        (0..n).map(|i| hash(&(i as u64).to_be_bytes())).collect()
    }

    #[test]
    fn test_build_small_tree_by_hand() {
        let l = leaves(4);
        let tree = MerkleTree::build(l.clone()).unwrap();
        let left = hash_pair(&l[0], &l[1]);
        let right = hash_pair(&l[2], &l[3]);
        assert_eq!(tree.height(), 2);
        assert_eq!(*tree.root(), hash_pair(&left, &right));
        assert_eq!(tree.node(1, 0), Some(&left));
        assert_eq!(tree.node(1, 1), Some(&right));
        assert_eq!(tree.node(1, 2), None);
        assert_eq!(tree.node(3, 0), None);
        assert_eq!(tree.leaf(3), Some(&l[3]));
    }

    #[test]
    fn test_single_leaf_tree() {
        let l = leaves(1);
        let tree = MerkleTree::build(l.clone()).unwrap();
        assert_eq!(tree.height(), 0);
        assert_eq!(*tree.root(), l[0]);
        assert!(tree.auth_path(0).unwrap().is_empty());
        assert_eq!(treehash(&l[0], 0, &[]), l[0]);
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        assert!(matches!(
            MerkleTree::build(leaves(6)),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            MerkleTree::build(Vec::new()),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_treehash_for_every_leaf() {
        let l = leaves(64);
        let tree = MerkleTree::build(l.clone()).unwrap();
        for (i, leaf) in l.iter().enumerate() {
            let path = tree.auth_path(i).unwrap();
            assert_eq!(path.len(), 6);
            assert_eq!(treehash(leaf, i as u64, &path), *tree.root());
        }
        assert!(tree.auth_path(64).is_err());
    }

    #[test]
    fn test_treehash_detects_wrong_index_or_sibling() {
        let l = leaves(16);
        let tree = MerkleTree::build(l.clone()).unwrap();
        let mut path = tree.auth_path(5).unwrap();
        assert_ne!(treehash(&l[5], 4, &path), *tree.root());
        path[2][0] ^= 1;
        assert_ne!(treehash(&l[5], 5, &path), *tree.root());
    }

    #[test]
    fn test_decomposed_matches_flat() {
        let l = leaves(256);
        let flat = MerkleTree::build(l.clone()).unwrap();
        for subtree_height in 1..=9 {
            let decomposed = MerkleTree::build_decomposed(l.clone(), subtree_height).unwrap();
            assert_eq!(decomposed, flat, "subtree height {}", subtree_height);
        }
        assert!(MerkleTree::build_decomposed(l, 0).is_err());
    }

    #[test]
    fn test_from_leaf_fn() {
        let l = leaves(32);
        let tree = MerkleTree::from_leaf_fn(5, 2, |i| l[i]).unwrap();
        assert_eq!(tree, MerkleTree::build(l).unwrap());
    }
}
