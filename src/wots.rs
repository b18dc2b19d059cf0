//! # Winternitz One-Time Signatures (WOTS)
//!
//! The chain primitive of the scheme. A keypair holds [`WOTS_LEN`] secret chain starts; the
//! public key is the top of every chain, compressed into one digest. Signing a digest reveals,
//! for every base-[`WOTS_W`] digit, the chain value that many steps above the start. A final
//! checksum digit `(L-1)(W-1) - Σd_i` rides on a chain of its own, [`WOTS_CHECKSUM_MAX`]
//! steps long: pushing any message digit up pulls the checksum down, which would require
//! walking its chain backwards.
//!
//! Digits are read from the digest most significant nibble first, so digit `2j` is the high
//! nibble of byte `j`. Signers and verifiers of other WOTS encodings that take the low nibble
//! first produce different chain lengths for the same digest and are not interoperable.
//!
//! ## Important Note
//!
//! A keypair must sign at most one digest. [`Wots::sign`] consumes the [`WotsSecretKey`] to
//! make a second signature with the same key impossible to express.

use crate::hash::{chain, hash_digests, Digest};
use crate::params::{WOTS_CHECKSUM_MAX, WOTS_LEN, WOTS_LEN1, WOTS_LOGW, WOTS_W};
use crate::seed::Seed;
use crate::utils::ct_eq;
use crate::{Error, Result};
use zeroize::{Zeroize, ZeroizeOnDrop};

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// The secret chain starts of one keypair.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct WotsSecretKey {
    chains: Vec<Seed>,
}

/// The public chain tops of one keypair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WotsPublicKey {
    tops: Vec<Digest>,
}

impl WotsPublicKey {
    pub fn tops(&self) -> &[Digest] {
        &self.tops
    }

    /// The compressed public key, `H(top_0 || .. || top_{L-1})`.
    pub fn digest(&self) -> Digest {
        hash_digests(&self.tops)
    }
}

/// One chain value per digit.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct WotsSignature(pub Vec<Digest>);

impl AsRef<[Digest]> for WotsSignature {
    fn as_ref(&self) -> &[Digest] {
        &self.0
    }
}

/// Encapsulates the WOTS operations.
pub struct Wots;

impl Wots {
    /// Generates a keypair whose `i`-th chain starts at `seed.derive(i)`.
    pub fn keygen(seed: &Seed) -> (WotsSecretKey, WotsPublicKey) {
        let sk = Self::secret_key(seed);
        let tops = sk
            .chains
            .iter()
            .enumerate()
            .map(|(i, start)| chain(&start.to_digest(), Self::chain_max(i)))
            .collect();
        (sk, WotsPublicKey { tops })
    }

    /// Derives only the secret chain starts, skipping the walk to the chain tops.
    pub fn secret_key(seed: &Seed) -> WotsSecretKey {
        WotsSecretKey {
            chains: (0..WOTS_LEN).map(|i| seed.derive(i as u64)).collect(),
        }
    }

    /// Computes only the compressed public key, which is all a Merkle leaf needs.
    pub fn public_digest(seed: &Seed) -> Digest {
        let (_, pk) = Self::keygen(seed);
        pk.digest()
    }

    /// Signs `digest`, consuming the secret key.
    pub fn sign(digest: &Digest, sk: WotsSecretKey) -> WotsSignature {
        let steps = Self::chain_lengths(digest);
        let values = sk
            .chains
            .iter()
            .zip(steps.iter())
            .map(|(start, &n)| chain(&start.to_digest(), n))
            .collect();
        WotsSignature(values)
    }

    /// Recomputes the compressed public key from a signature over `digest`.
    ///
    /// Fails with [`Error::SignatureMalformed`] if the signature does not carry exactly
    /// [`WOTS_LEN`] values.
    pub fn pk_from_sig(digest: &Digest, signature: &WotsSignature) -> Result<Digest> {
        if signature.0.len() != WOTS_LEN {
            return Err(Error::SignatureMalformed(format!(
                "WOTS signature has {} chain values, expected {}",
                signature.0.len(),
                WOTS_LEN
            )));
        }
        let steps = Self::chain_lengths(digest);
        let tops: Vec<Digest> = signature
            .0
            .iter()
            .enumerate()
            .map(|(i, value)| chain(value, Self::chain_max(i) - steps[i]))
            .collect();
        Ok(hash_digests(&tops))
    }

    /// Verifies a signature against a compressed public key.
    pub fn verify(digest: &Digest, signature: &WotsSignature, pk: &Digest) -> bool {
        match Self::pk_from_sig(digest, signature) {
            Ok(calculated) => ct_eq(&calculated, pk),
            Err(_) => false,
        }
    }

    /// Number of steps from the start to the top of chain `i`.
    fn chain_max(i: usize) -> usize {
        if i < WOTS_LEN1 {
            WOTS_W - 1
        } else {
            WOTS_CHECKSUM_MAX
        }
    }

    /// Converts the digest into [`WOTS_LEN1`] base-w digits, most significant nibble first.
    fn base_w(input: &Digest) -> [usize; WOTS_LEN1] {
        let mut output = [0usize; WOTS_LEN1];
        let mut bits = 0;
        let mut total: u8 = 0;
        let mut input_index = 0;

        for out in output.iter_mut() {
            if bits == 0 {
                total = input[input_index];
                input_index += 1;
                bits += 8;
            }
            bits -= WOTS_LOGW;
            *out = ((total >> bits) & ((WOTS_W - 1) as u8)) as usize;
        }
        output
    }

    /// The digits followed by the checksum digit.
    fn chain_lengths(digest: &Digest) -> [usize; WOTS_LEN] {
        let digits = Self::base_w(digest);
        let mut lengths = [0usize; WOTS_LEN];
        lengths[..WOTS_LEN1].copy_from_slice(&digits);
        lengths[WOTS_LEN1] = WOTS_CHECKSUM_MAX - digits.iter().sum::<usize>();
        lengths
    }
}
