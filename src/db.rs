use crate::hash::Digest;
use crate::Result;
use std::path::Path;

#[cfg(feature = "in-disk")]
pub mod in_disk;
#[cfg(feature = "in-memory")]
pub mod in_memory;

/// Durable home of the signing index of each key. A key is identified by `hash(seed)`, so the
/// store never sees secret material.
///
/// Implementations must make [`IndexStore::compare_and_swap`] atomic: it is the only thing
/// keeping two signers that share a key from handing out the same index.
pub trait IndexStore {
    /// Open or create the store, using the given `path`.
    fn open<P>(path: P) -> Result<Self>
    where
        Self: Sized,
        P: AsRef<Path> + Send;

    /// Next unused index recorded for `key_id`, or `None` if the key was never used with this
    /// store.
    fn load(&self, key_id: &Digest) -> Result<Option<u64>>;

    /// Sets the index of `key_id` to `new` if it currently equals `expected`.
    ///
    /// Fails with [`crate::Error::IndexConflict`] carrying the value actually found otherwise.
    fn compare_and_swap(&self, key_id: &Digest, expected: Option<u64>, new: u64) -> Result<()>;
}
