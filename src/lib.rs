mod db;
mod error;
mod utils;

pub mod fors;
pub mod hash;
pub mod hypertree;
pub mod merkle;
pub mod params;
pub mod scheme;
pub mod seed;
pub mod wots;

pub use crate::db::IndexStore;
pub use crate::error::{Error, Result, VerificationError};
pub use crate::params::Params;
pub use crate::scheme::{HyperSig, PublicKey, SecretKey, Signature};
pub use crate::seed::Seed;

#[cfg(feature = "in-disk")]
pub use crate::db::in_disk::InDiskIndexStore;
#[cfg(feature = "in-memory")]
pub use crate::db::in_memory::InMemoryIndexStore;
