//! # Forest of Random Subsets (FORS)
//!
//! The few-time signature that signs message digests. A forest has `k` independent Merkle
//! trees of height `a`; leaf `t` of tree `j` is the hash of the secret `seed_j.derive(t)`.
//! The digest is cut into `k` non-overlapping `a`-bit chunks (most significant bit first) and
//! chunk `j` selects the leaf revealed from tree `j`.
//!
//! Verification is self-certifying: [`Fors::pk_from_sig`] rebuilds every root from the
//! revealed secrets and their authentication paths and compresses them into one digest, which
//! the hypertree then authenticates. Forging requires matching all `k` selected leaves at once.

use crate::hash::{hash, hash_digests, Digest};
use crate::merkle::{treehash, AuthPath, MerkleTree};
use crate::params::Params;
use crate::seed::Seed;
use crate::utils::{ct_eq, ByteReader};
use crate::{Error, Result};
use rayon::prelude::*;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// A forest keypair: the per-tree secret seeds and the built trees.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ForsKeypair {
    tree_seeds: Vec<Seed>,
    #[zeroize(skip)]
    trees: Vec<MerkleTree>,
}

impl ForsKeypair {
    /// The `k` tree roots.
    pub fn roots(&self) -> Vec<Digest> {
        self.trees.iter().map(|t| *t.root()).collect()
    }

    /// The compressed public key, `H(root_0 || .. || root_{k-1})`.
    pub fn public_digest(&self) -> Digest {
        hash_digests(&self.roots())
    }
}

/// The part of a forest signature contributed by one tree.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct ForsTreeSignature {
    /// Preimage of the selected leaf.
    pub secret: Digest,
    pub auth_path: AuthPath,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct ForsSignature {
    pub trees: Vec<ForsTreeSignature>,
}

impl ForsSignature {
    /// Appends the wire encoding: per tree, the secret followed by the siblings.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        for tree in &self.trees {
            out.extend_from_slice(&tree.secret);
            for sibling in &tree.auth_path {
                out.extend_from_slice(sibling);
            }
        }
    }

    pub(crate) fn read_from(reader: &mut ByteReader<'_>, params: &Params) -> Result<Self> {
        let trees = (0..params.fors_trees())
            .map(|_| {
                Ok(ForsTreeSignature {
                    secret: reader.digest()?,
                    auth_path: reader.digests(params.fors_height())?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { trees })
    }
}

/// The forest operations for a fixed shape `(k, a)`.
#[derive(Clone, Copy, Debug)]
pub struct Fors {
    trees: usize,
    height: usize,
}

impl Fors {
    pub fn new(params: &Params) -> Self {
        Self {
            trees: params.fors_trees(),
            height: params.fors_height(),
        }
    }

    /// Derives the `k` tree seeds from `seed` and builds every tree.
    pub fn keygen(&self, seed: &Seed) -> Result<ForsKeypair> {
        let tree_seeds: Vec<Seed> = (0..self.trees).map(|j| seed.derive(j as u64)).collect();
        let trees = tree_seeds
            .par_iter()
            .map(|tree_seed| {
                let leaves = (0..1u64 << self.height)
                    .map(|t| hash(tree_seed.derive(t).as_ref()))
                    .collect();
                MerkleTree::build(leaves)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ForsKeypair { tree_seeds, trees })
    }

    /// Reveals, for every tree, the leaf selected by the corresponding digest chunk.
    pub fn sign(&self, digest: &Digest, keypair: &ForsKeypair) -> Result<ForsSignature> {
        if keypair.trees.len() != self.trees {
            return Err(Error::InvalidInput(format!(
                "forest keypair has {} trees, expected {}",
                keypair.trees.len(),
                self.trees
            )));
        }
        let trees = self
            .indices(digest)
            .into_iter()
            .zip(keypair.tree_seeds.iter().zip(keypair.trees.iter()))
            .map(|(index, (tree_seed, tree))| {
                Ok(ForsTreeSignature {
                    secret: tree_seed.derive(index as u64).to_digest(),
                    auth_path: tree.auth_path(index)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ForsSignature { trees })
    }

    /// Rebuilds the compressed public key from a signature over `digest`.
    pub fn pk_from_sig(&self, signature: &ForsSignature, digest: &Digest) -> Result<Digest> {
        if signature.trees.len() != self.trees {
            return Err(Error::SignatureMalformed(format!(
                "forest signature has {} trees, expected {}",
                signature.trees.len(),
                self.trees
            )));
        }
        let mut roots = Vec::with_capacity(self.trees);
        for (index, tree) in self.indices(digest).into_iter().zip(&signature.trees) {
            if tree.auth_path.len() != self.height {
                return Err(Error::SignatureMalformed(format!(
                    "forest authentication path has {} nodes, expected {}",
                    tree.auth_path.len(),
                    self.height
                )));
            }
            roots.push(treehash(&hash(&tree.secret), index as u64, &tree.auth_path));
        }
        Ok(hash_digests(&roots))
    }

    pub fn verify(&self, signature: &ForsSignature, digest: &Digest, pk: &Digest) -> bool {
        match self.pk_from_sig(signature, digest) {
            Ok(calculated) => ct_eq(&calculated, pk),
            Err(_) => false,
        }
    }

    /// Splits the digest into `k` chunks of `a` bits, most significant bit first.
    fn indices(&self, digest: &Digest) -> Vec<usize> {
        (0..self.trees)
            .map(|j| {
                (j * self.height..(j + 1) * self.height).fold(0usize, |acc, bit| {
                    let byte = digest[bit / 8];
                    (acc << 1) | ((byte >> (7 - bit % 8)) & 1) as usize
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Fors {
        Fors::new(&Params::new(1, 1, 1, 8, 4).unwrap())
    }

    #[test]
    fn test_fors() {
        let fors = small();
        let keypair = fors.keygen(&Seed::fresh()).unwrap();
        let pk = keypair.public_digest();
        let digest = hash(b"forest message");

        let signature = fors.sign(&digest, &keypair).unwrap();
        assert_eq!(signature.trees.len(), 8);
        assert!(fors.verify(&signature, &digest, &pk));
        assert_eq!(fors.pk_from_sig(&signature, &digest).unwrap(), pk);

        let mut fake_signature = signature.clone();
        fake_signature.trees[3].auth_path[1][0] ^= 1;
        assert!(!fors.verify(&fake_signature, &digest, &pk));

        let mut fake_signature = signature.clone();
        fake_signature.trees[7].secret[31] ^= 1;
        assert!(!fors.verify(&fake_signature, &digest, &pk));

        let other = hash(b"another forest message");
        assert!(!fors.verify(&signature, &other, &pk));
    }

    #[test]
    fn test_indices_are_msb_first_chunks() {
        let fors = small();
        let mut digest = [0u8; 32];
        digest[0] = 0xa5;
        digest[1] = 0x3c;
        digest[31] = 0xff;
        assert_eq!(fors.indices(&digest), vec![0xa, 0x5, 0x3, 0xc, 0, 0, 0, 0]);

        let fors = Fors::new(&Params::new(1, 1, 1, 3, 5).unwrap());
        // 0xa5 0x3c = 10100 10100 11110 0...
        assert_eq!(fors.indices(&digest), vec![0b10100, 0b10100, 0b11110]);
    }

    #[test]
    fn test_keygen_is_deterministic() {
        let fors = small();
        let seed = Seed::from([5u8; 32]);
        let a = fors.keygen(&seed).unwrap();
        let b = fors.keygen(&seed).unwrap();
        assert_eq!(a.roots(), b.roots());
        assert_eq!(a.roots().len(), 8);
    }

    #[test]
    fn test_malformed_shapes() {
        let fors = small();
        let keypair = fors.keygen(&Seed::fresh()).unwrap();
        let digest = hash(b"shape");
        let signature = fors.sign(&digest, &keypair).unwrap();

        let mut missing_tree = signature.clone();
        missing_tree.trees.pop();
        assert!(matches!(
            fors.pk_from_sig(&missing_tree, &digest),
            Err(Error::SignatureMalformed(_))
        ));

        let mut short_path = signature;
        short_path.trees[0].auth_path.pop();
        assert!(matches!(
            fors.pk_from_sig(&short_path, &digest),
            Err(Error::SignatureMalformed(_))
        ));
        assert!(!fors.verify(&short_path, &digest, &keypair.public_digest()));
    }

    #[test]
    fn test_wire_encoding() {
        let params = Params::new(1, 1, 1, 8, 4).unwrap();
        let fors = Fors::new(&params);
        let keypair = fors.keygen(&Seed::fresh()).unwrap();
        let signature = fors.sign(&hash(b"wire"), &keypair).unwrap();

        let mut bytes = Vec::new();
        signature.write_to(&mut bytes);
        assert_eq!(bytes.len(), params.fors_bytes());

        let mut reader = ByteReader::new(&bytes);
        let decoded = ForsSignature::read_from(&mut reader, &params).unwrap();
        reader.finish().unwrap();
        assert_eq!(decoded, signature);
    }
}
