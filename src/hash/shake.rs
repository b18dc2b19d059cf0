use crate::hash::Digest;
use crate::params::HASH_N;
use sha3::{
    digest::{ExtendableOutput, Update, XofReader},
    Shake256,
};

pub(crate) struct Backend;

impl Backend {
    /// SHAKE-256 over the concatenation of `parts`, squeezed to `HASH_N` bytes.
    pub(crate) fn hash_parts(parts: &[&[u8]]) -> Digest {
        let mut hasher = Shake256::default();
        for part in parts {
            hasher.update(part);
        }
        let mut reader = hasher.finalize_xof();
        let mut output = [0u8; HASH_N];
        reader.read(&mut output);
        output
    }
}
