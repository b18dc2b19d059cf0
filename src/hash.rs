//! The hash primitive every other component is built on.
//!
//! The backend is selected at compile time: SHA-256 with the `hash_sha2` feature (default),
//! or SHAKE-256 squeezed to [`HASH_N`] bytes with `hash_shake`. When both are enabled,
//! SHAKE-256 wins.

use crate::params::HASH_N;

#[cfg(not(any(feature = "hash_sha2", feature = "hash_shake")))]
compile_error!("enable one of the `hash_sha2` or `hash_shake` features");

#[cfg(all(feature = "hash_sha2", not(feature = "hash_shake")))]
mod sha2;
#[cfg(feature = "hash_shake")]
mod shake;

#[cfg(all(feature = "hash_sha2", not(feature = "hash_shake")))]
use crate::hash::sha2::Backend;
#[cfg(feature = "hash_shake")]
use crate::hash::shake::Backend;

/// A hash output.
pub type Digest = [u8; HASH_N];

/// Hashes an arbitrary byte string.
pub fn hash(input: &[u8]) -> Digest {
    Backend::hash_parts(&[input])
}

/// Hashes two nodes into their parent, `H(left || right)`.
pub fn hash_pair(left: &Digest, right: &Digest) -> Digest {
    Backend::hash_parts(&[left.as_ref(), right.as_ref()])
}

/// Hashes the concatenation of a list of digests.
pub fn hash_digests(digests: &[Digest]) -> Digest {
    let parts: Vec<&[u8]> = digests.iter().map(|d| d.as_ref()).collect();
    Backend::hash_parts(&parts)
}

/// Hashes the concatenation of arbitrary parts.
pub(crate) fn hash_parts(parts: &[&[u8]]) -> Digest {
    Backend::hash_parts(parts)
}

/// Applies the hash `steps` times to `start`.
pub fn chain(start: &Digest, steps: usize) -> Digest {
    let mut value = *start;
    for _ in 0..steps {
        value = Backend::hash_parts(&[value.as_ref()]);
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(hash(b"hello"), hash(b"hello"));
        assert_ne!(hash(b"hello"), hash(b"hellp"));
    }

    #[test]
    fn test_pair_and_parts_agree() {
        let left = hash(b"left");
        let right = hash(b"right");
        let mut concat = Vec::new();
        concat.extend_from_slice(&left);
        concat.extend_from_slice(&right);
        assert_eq!(hash_pair(&left, &right), hash(&concat));
        assert_eq!(hash_digests(&[left, right]), hash(&concat));
        assert_ne!(hash_pair(&left, &right), hash_pair(&right, &left));
    }

    #[test]
    fn test_chain_composes() {
        let start = hash(b"start");
        assert_eq!(chain(&start, 0), start);
        assert_eq!(chain(&start, 1), hash(&start));
        assert_eq!(chain(&chain(&start, 3), 4), chain(&start, 7));
    }

    #[cfg(all(feature = "hash_sha2", not(feature = "hash_shake")))]
    #[test]
    fn test_sha256_known_answer() {
        let expected = [
            0xba, 0x78, 0x16, 0xbf, 0x8f, 0x01, 0xcf, 0xea, 0x41, 0x41, 0x40, 0xde, 0x5d, 0xae,
            0x22, 0x23, 0xb0, 0x03, 0x61, 0xa3, 0x96, 0x17, 0x7a, 0x9c, 0xb4, 0x10, 0xff, 0x61,
            0xf2, 0x00, 0x15, 0xad,
        ];
        assert_eq!(hash(b"abc"), expected);
    }
}
