//! Fixed-stride reader over a response buffer
//!
//! Every sub-record is taken as a whole: the bounds check happens once per
//! `take`, and the first read past the end reports how long the frame would
//! have needed to be.

use crate::error::ProtocolError;

pub(crate) struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Take the next `N` bytes as an array
    pub(crate) fn take<const N: usize>(&mut self) -> Result<[u8; N], ProtocolError> {
        let end = self.pos + N;
        let bytes = self
            .data
            .get(self.pos..end)
            .ok_or(ProtocolError::TruncatedFrame {
                needed: end,
                actual: self.data.len(),
            })?;
        self.pos = end;

        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub(crate) fn take_u8(&mut self) -> Result<u8, ProtocolError> {
        self.take::<1>().map(|[b]| b)
    }

    /// Fail with `TruncatedFrame` unless `len` more bytes are available
    ///
    /// Lets a branch report the full length it needs before any field is read.
    pub(crate) fn require(&self, len: usize) -> Result<(), ProtocolError> {
        let needed = self.pos + len;
        if self.data.len() < needed {
            return Err(ProtocolError::TruncatedFrame {
                needed,
                actual: self.data.len(),
            });
        }
        Ok(())
    }
}
