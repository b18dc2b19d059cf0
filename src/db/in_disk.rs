use crate::db::IndexStore;
use crate::hash::Digest;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

impl From<sled::Error> for Error {
    fn from(e: sled::Error) -> Self {
        Self::DbInternalError(format!("sled error: {}", e))
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Self::DbInternalError(format!("bincode error: {}", e))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
struct IndexRecord {
    next_index: u64,
}

impl IndexRecord {
    fn encode(next_index: u64) -> Result<Vec<u8>> {
        Ok(bincode::serialize(&IndexRecord { next_index })?)
    }

    fn decode(bytes: &[u8]) -> Result<u64> {
        let record: IndexRecord = bincode::deserialize(bytes)?;
        Ok(record.next_index)
    }
}

/// Index store backed by a `sled` tree. Every successful swap is flushed before returning.
pub struct InDiskIndexStore {
    tree: sled::Tree,
}

impl IndexStore for InDiskIndexStore {
    fn open<P>(path: P) -> Result<Self>
    where
        Self: Sized,
        P: AsRef<Path> + Send,
    {
        let db = sled::open(path.as_ref().join("index_store"))?;
        let tree = db.open_tree("signing_index")?;
        Ok(Self { tree })
    }

    fn load(&self, key_id: &Digest) -> Result<Option<u64>> {
        match self.tree.get(key_id)? {
            Some(value) => Ok(Some(IndexRecord::decode(&value)?)),
            None => Ok(None),
        }
    }

    fn compare_and_swap(&self, key_id: &Digest, expected: Option<u64>, new: u64) -> Result<()> {
        let old = expected.map(IndexRecord::encode).transpose()?;
        let proposed = IndexRecord::encode(new)?;

        if let Err(conflict) = self.tree.compare_and_swap(key_id, old, Some(proposed))? {
            let found = conflict
                .current
                .map(|value| IndexRecord::decode(&value))
                .transpose()?;
            return Err(Error::IndexConflict { expected, found });
        }
        self.tree.flush()?;
        debug!(new, "stored signing index on disk");
        Ok(())
    }
}
