use crate::hash::Digest;
use crate::params::{HASH_N, INDEX_BYTES};
use crate::{Error, Result};
use subtle::ConstantTimeEq;

pub(crate) fn u64_to_bytes(value: u64) -> [u8; INDEX_BYTES] {
    value.to_be_bytes()
}

pub(crate) fn bytes_to_u64(bytes: &[u8]) -> Result<u64> {
    let array: [u8; INDEX_BYTES] = bytes.try_into()?;
    Ok(u64::from_be_bytes(array))
}

/// Constant-time digest equality.
pub(crate) fn ct_eq(a: &Digest, b: &Digest) -> bool {
    a.ct_eq(b).into()
}

/// Sequential reader over a wire encoding. Every read checks the remaining length so that
/// truncated input surfaces as [`Error::SignatureMalformed`].
pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                Error::SignatureMalformed(format!(
                    "truncated input: wanted {} bytes at offset {}, have {}",
                    len,
                    self.offset,
                    self.data.len()
                ))
            })?;
        let slice = &self.data[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    pub(crate) fn digest(&mut self) -> Result<Digest> {
        let mut out = [0u8; HASH_N];
        out.copy_from_slice(self.take(HASH_N)?);
        Ok(out)
    }

    pub(crate) fn digests(&mut self, count: usize) -> Result<Vec<Digest>> {
        (0..count).map(|_| self.digest()).collect()
    }

    pub(crate) fn u64(&mut self) -> Result<u64> {
        bytes_to_u64(self.take(INDEX_BYTES)?)
    }

    /// Fails unless every byte has been consumed.
    pub(crate) fn finish(self) -> Result<()> {
        if self.offset == self.data.len() {
            Ok(())
        } else {
            Err(Error::SignatureMalformed(format!(
                "{} trailing bytes",
                self.data.len() - self.offset
            )))
        }
    }
}
