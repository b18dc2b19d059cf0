use crate::hash::Digest;
use crate::params::HASH_N;
use sha2::{Digest as _, Sha256};

pub(crate) struct Backend;

impl Backend {
    /// SHA-256 over the concatenation of `parts`.
    pub(crate) fn hash_parts(parts: &[&[u8]]) -> Digest {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part);
        }
        let mut output = [0u8; HASH_N];
        output.copy_from_slice(hasher.finalize().as_ref());
        output
    }
}
