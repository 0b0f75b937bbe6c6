//! A growable byte buffer usable both as an arbitrary array of bytes and as
//! a NUL-terminated C string, matching `gdbwire_string` in the original
//! implementation.
//!
//! The stream driver uses one of these to accumulate bytes pushed across
//! calls until a full line is available; the lexer does not use it
//! directly since it operates on an already-isolated `&str` line, but the
//! buffer is the thing that carves that line out of the incoming stream.

use crate::error::{GdbMiError, GdbMiResult};

/// Growth policy: start at zero, jump to 128 on first use, double until
/// 4096, then grow in flat 4096-byte steps. Keeps long lines from
/// reallocating on every byte while not wasting memory on the common case
/// of many short MI lines.
const INITIAL_CAPACITY: usize = 128;
const DOUBLING_CEILING: usize = 4096;
const LINEAR_STEP: usize = 4096;

/// A growable, appendable byte sequence that may contain embedded NULs.
#[derive(Debug, Clone, Default)]
pub struct StringBuffer {
    data: Vec<u8>,
}

impl StringBuffer {
    /// Creates an empty buffer. Its logical size is zero, but `data()`
    /// always yields a validly NUL-terminated view when treated as a C
    /// string, matching the documented behavior of `gdbwire_string_create`.
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    fn grow_for(&mut self, additional: usize) {
        let required = self.data.len() + additional;
        if self.data.capacity() >= required {
            return;
        }
        let mut capacity = self.data.capacity();
        while capacity < required {
            capacity = if capacity == 0 {
                INITIAL_CAPACITY
            } else if capacity < DOUBLING_CEILING {
                capacity * 2
            } else {
                capacity + LINEAR_STEP
            };
        }
        self.data.reserve_exact(capacity - self.data.len());
    }

    /// Appends a single byte.
    pub fn append_byte(&mut self, byte: u8) -> GdbMiResult<()> {
        self.append_bytes(&[byte])
    }

    /// Appends an arbitrary byte slice, which may contain embedded NULs.
    pub fn append_bytes(&mut self, bytes: &[u8]) -> GdbMiResult<()> {
        self.grow_for(bytes.len());
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// Appends a Rust string slice. Semantically equivalent to
    /// `append_bytes`, named separately to mirror the documented
    /// `append_terminated_string` entry point (which, in the C API, copies
    /// through the NUL terminator but reports size excluding it — there is
    /// no separate terminator byte to account for here, since Rust strings
    /// are not NUL-terminated).
    pub fn append_str(&mut self, s: &str) -> GdbMiResult<()> {
        self.append_bytes(s.as_bytes())
    }

    /// Sets the logical size back to zero. Capacity is not released.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// The buffer's bytes. Mutating in place within the current length is
    /// allowed and does not affect bookkeeping.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the index of the first byte that equals any character in
    /// `chars`, or `size()` if none match. `chars` is interpreted as a set
    /// of individual characters, not as a substring to search for.
    pub fn find_first_of(&self, chars: &str) -> usize {
        self.data
            .iter()
            .position(|&b| chars.bytes().any(|c| c == b))
            .unwrap_or(self.data.len())
    }

    /// Removes `count` bytes starting at `pos`, shifting the tail left. If
    /// the range extends past the end it is clipped. Fails if `pos` is out
    /// of range. Never reallocates.
    pub fn erase(&mut self, pos: usize, count: usize) -> GdbMiResult<()> {
        if pos > self.data.len() {
            return Err(GdbMiError::Assert(format!(
                "erase start {pos} is out of range for buffer of size {}",
                self.data.len()
            )));
        }
        let end = (pos + count).min(self.data.len());
        self.data.drain(pos..end);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn new_buffer_is_empty() {
        let buf = StringBuffer::new();
        assert_eq!(buf.size(), 0);
        assert_eq!(buf.data(), b"");
    }

    #[test]
    fn append_and_size() {
        let mut buf = StringBuffer::new();
        buf.append_str("hello").unwrap();
        assert_eq!(buf.size(), 5);
        assert_eq!(buf.data(), b"hello");
    }

    #[test]
    fn clear_resets_size_but_not_capacity() {
        let mut buf = StringBuffer::new();
        buf.append_str("hello world").unwrap();
        let cap_before = buf.capacity();
        buf.clear();
        assert_eq!(buf.size(), 0);
        assert_eq!(buf.capacity(), cap_before);
    }

    #[test]
    fn capacity_growth_policy() {
        let mut buf = StringBuffer::new();
        assert_eq!(buf.capacity(), 0);
        buf.append_byte(b'a').unwrap();
        assert_eq!(buf.capacity(), 128);
        buf.append_bytes(&[0u8; 200]).unwrap();
        assert_eq!(buf.capacity(), 256);
        buf.append_bytes(&[0u8; 4000]).unwrap();
        assert!(buf.capacity() >= 4096);
        let cap_at_ceiling = buf.capacity();
        buf.append_bytes(&[0u8; 1]).unwrap();
        if cap_at_ceiling < 4096 + buf.size() {
            assert!(buf.capacity() >= cap_at_ceiling);
        }
    }

    #[test]
    fn find_first_of_returns_size_when_absent() {
        let mut buf = StringBuffer::new();
        buf.append_str("abcdef").unwrap();
        assert_eq!(buf.find_first_of("xyz"), buf.size());
        assert_eq!(buf.find_first_of("cd"), 2);
    }

    #[test]
    fn erase_shifts_tail_left() {
        let mut buf = StringBuffer::new();
        buf.append_str("abcdef").unwrap();
        buf.erase(1, 2).unwrap();
        assert_eq!(buf.data(), b"adef");
    }

    #[test]
    fn erase_clips_past_end() {
        let mut buf = StringBuffer::new();
        buf.append_str("abc").unwrap();
        buf.erase(1, 100).unwrap();
        assert_eq!(buf.data(), b"a");
    }

    #[test]
    fn erase_out_of_range_start_fails() {
        let mut buf = StringBuffer::new();
        buf.append_str("abc").unwrap();
        assert!(buf.erase(10, 1).is_err());
    }

    #[test]
    fn erase_never_reallocates() {
        let mut buf = StringBuffer::new();
        buf.append_bytes(&[0u8; 200]).unwrap();
        let cap_before = buf.capacity();
        buf.erase(0, 100).unwrap();
        assert_eq!(buf.capacity(), cap_before);
    }
}
