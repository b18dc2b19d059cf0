use crate::db::IndexStore;
use crate::hash::Digest;
use crate::{Error, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

impl<T> From<PoisonError<T>> for Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::DbInternalError(format!("Lock error: {}", err))
    }
}

/// Process-local index store. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct InMemoryIndexStore(Arc<Mutex<HashMap<Digest, u64>>>);

impl IndexStore for InMemoryIndexStore {
    fn open<P>(_: P) -> Result<Self>
    where
        Self: Sized,
        P: AsRef<Path> + Send,
    {
        Ok(Self::default())
    }

    fn load(&self, key_id: &Digest) -> Result<Option<u64>> {
        let data = self.0.lock()?;
        Ok(data.get(key_id).copied())
    }

    fn compare_and_swap(&self, key_id: &Digest, expected: Option<u64>, new: u64) -> Result<()> {
        let mut data = self.0.lock()?;
        let found = data.get(key_id).copied();
        if found != expected {
            return Err(Error::IndexConflict { expected, found });
        }
        data.insert(*key_id, new);
        debug!(new, "stored signing index in memory");
        Ok(())
    }
}
