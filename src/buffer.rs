// In: src/buffer.rs

//! The shared, growable write buffer for one write transaction.
//!
//! A `WriteBuffer` is the single output buffer associated with an open file
//! context. Transform methods and the characteristic codec append to it
//! through the same grow-to-fit primitive, so offset bookkeeping lives in
//! exactly one place. There is exactly one writer at a time within a
//! transaction; a growth failure is reported as `Allocation` and the caller
//! must abort the transaction (partial appends are not rolled back).

use crate::error::{Result, TransformError};

#[derive(Debug, Default)]
pub struct WriteBuffer {
    bytes: Vec<u8>,
}

impl WriteBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// The current logical write offset, i.e. where the next append lands.
    pub fn offset(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Grows the buffer so at least `additional` more bytes fit. Failure is
    /// a real allocation failure, reported upward rather than retried.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.bytes
            .try_reserve(additional)
            .map_err(|_| TransformError::Allocation(additional))
    }

    /// Appends `data`, growing as needed, and returns the offset at which it
    /// was written.
    pub fn append(&mut self, data: &[u8]) -> Result<u64> {
        self.reserve(data.len())?;
        let start = self.offset();
        self.bytes.extend_from_slice(data);
        Ok(start)
    }

    /// Returns the `len` bytes starting at `offset`, if in bounds. Used by
    /// callers resolving an `InSharedBuffer` payload back to its bytes.
    pub fn slice_at(&self, offset: u64, len: u64) -> Option<&[u8]> {
        let start = usize::try_from(offset).ok()?;
        let end = start.checked_add(usize::try_from(len).ok()?)?;
        self.bytes.get(start..end)
    }
}

/// Streaming encoders (zstd) write straight into the shared buffer through
/// this impl, so direct-to-shared output needs no intermediate copy.
impl std::io::Write for WriteBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.bytes
            .try_reserve(buf.len())
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::OutOfMemory, "buffer growth failed"))?;
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_returns_start_offset_and_advances() {
        let mut buf = WriteBuffer::new();
        assert_eq!(buf.append(b"abcd").unwrap(), 0);
        assert_eq!(buf.append(b"xy").unwrap(), 4);
        assert_eq!(buf.offset(), 6);
        assert_eq!(buf.as_slice(), b"abcdxy");
    }

    #[test]
    fn test_slice_at_bounds() {
        let mut buf = WriteBuffer::new();
        buf.append(b"hello world").unwrap();
        assert_eq!(buf.slice_at(6, 5), Some(&b"world"[..]));
        assert_eq!(buf.slice_at(6, 6), None);
        assert_eq!(buf.slice_at(0, 0), Some(&b""[..]));
    }

    #[test]
    fn test_io_write_appends() {
        use std::io::Write;
        let mut buf = WriteBuffer::with_capacity(16);
        buf.write_all(b"123").unwrap();
        assert_eq!(buf.as_slice(), b"123");
    }
}
