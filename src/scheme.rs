//! # HyperSig: A Stateful Hash-Based Signature Scheme
//!
//! This module composes the building blocks of the crate into a complete signature scheme with
//! a bounded number of signatures per key. Its security rests only on the preimage and second
//! preimage resistance of the underlying hash function (SHA-256 by default, SHAKE-256 with the
//! `hash_shake` feature).
//!
//! ## Building Blocks
//! - **WOTS** one-time signatures sign 32-byte digests using hash chains.
//! - **Merkle trees** authenticate `2^h` WOTS public keys under one root.
//! - The **hypertree** stacks `d` layers of such trees: each layer signs the root of the tree
//!   below it, and the root of the top tree is the public key.
//! - **FORS**, a few-time forest of `k` trees of height `a`, signs the message digest. Its
//!   compressed root is what the lowest hypertree layer signs.
//!
//! ## Keys and State
//! A [`SecretKey`] is a 32-byte master seed plus the signing index, the number of signatures
//! already produced. Every secret value is derived deterministically from the seed: the
//! forest used at index `i` from `derive(0).derive(i)`, the hypertree from `derive(1)`. The
//! index selects the forest instance and the hypertree leaves, so it must never repeat;
//! [`HyperSig::sign`] advances it after every signature and refuses to sign once it reaches
//! [`Params::max_signatures`].
//!
//! The index lives in memory. To survive restarts, or to be shared between several handles on
//! the same key, sign through [`HyperSig::sign_persisted`] with an [`IndexStore`].
//!
//! A [`PublicKey`] is the 32-byte root of the top hypertree tree.
//!
//! ## Example
//!
//! ```rust
//! use hypersig::{HyperSig, Params, Seed};
//!
//! let scheme = HyperSig::new(Params::new(2, 3, 2, 16, 6).unwrap()).unwrap();
//! let (mut sk, pk) = scheme.keygen(Seed::from([7u8; 32])).unwrap();
//!
//! let message = b"Hello HyperSig!";
//! let sig = scheme.sign(message, &mut sk).expect("Signing failed");
//! assert_eq!(sig.index(), 0);
//! assert_eq!(sk.index(), 1);
//!
//! scheme.verify(message, &sig, &pk).expect("Signature verification failed");
//! assert!(!scheme.is_valid(b"Hello HyperSig?", &sig, &pk));
//!
//! let bytes = sig.to_bytes();
//! scheme.verify_bytes(message, &bytes, &pk.to_bytes()).unwrap();
//! ```

use crate::db::IndexStore;
use crate::fors::{Fors, ForsSignature};
use crate::hash::{hash, Digest};
use crate::hypertree::{Hypertree, HypertreeSignature};
use crate::params::{Params, INDEX_BYTES, PK_BYTES, SEED_BYTES, SK_BYTES};
use crate::seed::Seed;
use crate::utils::{bytes_to_u64, ct_eq, u64_to_bytes, ByteReader};
use crate::{Error, Result, VerificationError};
use std::fmt;
use tracing::{debug, warn};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

const FORS_SEED_INDEX: u64 = 0;
const HYPERTREE_SEED_INDEX: u64 = 1;

/// The root of the top hypertree tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct PublicKey(Digest);

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl PublicKey {
    pub fn root(&self) -> &Digest {
        &self.0
    }

    pub fn to_bytes(&self) -> [u8; PK_BYTES] {
        self.0
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != PK_BYTES {
            return Err(Error::BadLength(PK_BYTES, bytes.len()));
        }
        let mut root = [0u8; PK_BYTES];
        root.copy_from_slice(bytes);
        Ok(Self(root))
    }
}

/// Master seed and signing index. Wiped from memory on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct SecretKey {
    seed: Seed,
    index: u64,
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("seed", &self.seed)
            .field("index", &self.index)
            .finish()
    }
}

impl SecretKey {
    /// Number of signatures produced so far, which is also the index of the next one.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Public identifier of this key in an [`IndexStore`]: `hash(seed)`.
    pub fn key_id(&self) -> Digest {
        hash(self.seed.as_ref())
    }

    /// `seed || index`, the index as big-endian u64.
    pub fn to_bytes(&self) -> Zeroizing<[u8; SK_BYTES]> {
        let mut bytes = Zeroizing::new([0u8; SK_BYTES]);
        bytes[..SEED_BYTES].copy_from_slice(self.seed.as_ref());
        bytes[SEED_BYTES..].copy_from_slice(&u64_to_bytes(self.index));
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SK_BYTES {
            return Err(Error::BadLength(SK_BYTES, bytes.len()));
        }
        Ok(Self {
            seed: Seed::try_from(&bytes[..SEED_BYTES])?,
            index: bytes_to_u64(&bytes[SEED_BYTES..SEED_BYTES + INDEX_BYTES])?,
        })
    }
}

/// A forest signature over the message digest followed by the hypertree signature over the
/// forest root.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Signature {
    pub fors: ForsSignature,
    pub hypertree: HypertreeSignature,
}

impl Signature {
    /// The signing index this signature was produced at.
    pub fn index(&self) -> u64 {
        self.hypertree.index
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.fors.write_to(&mut out);
        self.hypertree.write_to(&mut out);
        out
    }

    /// Decodes a signature for the shape given by `params`. Any length other than
    /// [`Params::signature_bytes`] is malformed.
    pub fn from_bytes(bytes: &[u8], params: &Params) -> Result<Self> {
        if bytes.len() != params.signature_bytes() {
            return Err(Error::SignatureMalformed(format!(
                "signature has {} bytes, expected {}",
                bytes.len(),
                params.signature_bytes()
            )));
        }
        let mut reader = ByteReader::new(bytes);
        let fors = ForsSignature::read_from(&mut reader, params)?;
        let hypertree = HypertreeSignature::read_from(&mut reader, params)?;
        reader.finish()?;
        Ok(Self { fors, hypertree })
    }
}

/// Encapsulates the scheme for one validated parameter set.
#[derive(Clone, Copy, Debug)]
pub struct HyperSig {
    params: Params,
    fors: Fors,
    hypertree: Hypertree,
}

impl HyperSig {
    pub fn new(params: Params) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            fors: Fors::new(&params),
            hypertree: Hypertree::new(&params),
        })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Derives the key pair of `seed`. Only the top hypertree tree is built; every other tree
    /// is rebuilt on demand when signing.
    pub fn keygen(&self, seed: Seed) -> Result<(SecretKey, PublicKey)> {
        let root = self.hypertree.keygen(&seed.derive(HYPERTREE_SEED_INDEX))?;
        debug!(
            layers = self.params.layers(),
            tree_height = self.params.tree_height(),
            "generated key pair"
        );
        Ok((SecretKey { seed, index: 0 }, PublicKey(root)))
    }

    /// Same as [`HyperSig::keygen`] with a seed from the operating system's entropy source.
    pub fn keygen_random(&self) -> Result<(SecretKey, PublicKey)> {
        self.keygen(Seed::fresh())
    }

    /// Signs `message` at the key's current index and advances the index.
    ///
    /// Fails with [`Error::IndexExhausted`] once every index is used; the key is left
    /// untouched by any failure.
    pub fn sign(&self, message: &[u8], sk: &mut SecretKey) -> Result<Signature> {
        let signature = self.sign_at(message, &sk.seed, sk.index)?;
        sk.index += 1;
        Ok(signature)
    }

    /// Signs `message` with the index recorded in `store`, or the key's own index if that is
    /// further ahead. The store is advanced with a compare-and-swap before the signature is
    /// released; if another signer advanced it in the meantime the signature is discarded and
    /// [`Error::IndexConflict`] is returned.
    pub fn sign_persisted<S: IndexStore>(
        &self,
        message: &[u8],
        sk: &mut SecretKey,
        store: &S,
    ) -> Result<Signature> {
        let key_id = sk.key_id();
        let stored = store.load(&key_id)?;
        let index = stored.map_or(sk.index, |stored| stored.max(sk.index));

        let signature = self.sign_at(message, &sk.seed, index)?;
        if let Err(e) = store.compare_and_swap(&key_id, stored, index + 1) {
            if let Error::IndexConflict { expected, found } = &e {
                warn!(?expected, ?found, "signing index advanced concurrently");
            }
            return Err(e);
        }
        sk.index = index + 1;
        Ok(signature)
    }

    fn sign_at(&self, message: &[u8], seed: &Seed, index: u64) -> Result<Signature> {
        let bound = self.params.max_signatures();
        if index >= bound {
            warn!(index, bound, "signing index exhausted");
            return Err(Error::IndexExhausted { index, bound });
        }

        let digest = hash(message);
        let fors_keypair = self
            .fors
            .keygen(&seed.derive(FORS_SEED_INDEX).derive(index))?;
        let fors = self.fors.sign(&digest, &fors_keypair)?;
        let fors_root = self.fors.pk_from_sig(&fors, &digest)?;
        let hypertree =
            self.hypertree
                .sign(&fors_root, index, &seed.derive(HYPERTREE_SEED_INDEX))?;

        debug!(index, "signed message");
        Ok(Signature { fors, hypertree })
    }

    /// Verifies `signature` on `message`. Structural problems yield
    /// [`Error::SignatureMalformed`], a well-formed signature that does not authenticate yields
    /// [`Error::VerificationFailed`].
    pub fn verify(&self, message: &[u8], signature: &Signature, pk: &PublicKey) -> Result<()> {
        let digest = hash(message);
        let fors_root = self.fors.pk_from_sig(&signature.fors, &digest)?;
        let root = self.hypertree.pk_from_sig(&signature.hypertree, &fors_root)?;
        if ct_eq(&root, &pk.0) {
            Ok(())
        } else {
            Err(VerificationError::RootMismatch.into())
        }
    }

    /// Verifies wire-encoded inputs.
    pub fn verify_bytes(&self, message: &[u8], signature: &[u8], pk: &[u8]) -> Result<()> {
        let pk = PublicKey::from_bytes(pk)?;
        let signature = Signature::from_bytes(signature, &self.params)?;
        self.verify(message, &signature, &pk)
    }

    pub fn is_valid(&self, message: &[u8], signature: &Signature, pk: &PublicKey) -> bool {
        self.verify(message, signature, pk).is_ok()
    }
}
