use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid length: expected {0} bytes, found {1} bytes")]
    BadLength(usize, usize),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
    #[error("Signing index exhausted: index {index} reached the bound {bound}")]
    IndexExhausted { index: u64, bound: u64 },
    #[error("Signing index was advanced concurrently: expected {expected:?}, found {found:?}")]
    IndexConflict {
        expected: Option<u64>,
        found: Option<u64>,
    },
    #[error("Malformed signature: {0}")]
    SignatureMalformed(String),
    #[error("Signature verification failed: {0}")]
    VerificationFailed(#[from] VerificationError),
    #[error("Database internal error: {0}")]
    DbInternalError(String),
}

impl From<std::array::TryFromSliceError> for Error {
    fn from(e: std::array::TryFromSliceError) -> Self {
        Error::InvalidInput(e.to_string())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum VerificationError {
    #[error("recomputed hypertree root does not match the public key")]
    RootMismatch,
    #[error("signing index {index} is outside the key's range (bound {bound})")]
    IndexOutOfRange { index: u64, bound: u64 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
