//! Sliding-window dictionary shared by the encoder's match finders and the decoder.
//!
//! Unlike a classic power-of-two ring buffer, lzip dictionary sizes are not
//! restricted to powers of two (the header encodes `base` and a `fraction`,
//! see the format crate), so this buffer wraps with a plain `% capacity`
//! instead of a bitmask.

use rlzip_core::error::{Error, Result};

/// A circular history buffer of up to `capacity` bytes.
#[derive(Debug, Clone)]
pub struct Dictionary {
    buf: Vec<u8>,
    capacity: usize,
    /// Logical write position, monotonically increasing (never wraps).
    pos: u64,
}

impl Dictionary {
    /// Create a dictionary with room for `capacity` bytes of history.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if `capacity` is zero or absurdly large.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::out_of_memory("dictionary capacity must be nonzero"));
        }
        if capacity > (1 << 30) {
            return Err(Error::out_of_memory(format!(
                "refusing to allocate a {capacity}-byte dictionary"
            )));
        }

        Ok(Self {
            buf: vec![0u8; capacity],
            capacity,
            pos: 0,
        })
    }

    /// Total number of bytes ever pushed into the dictionary.
    #[inline]
    pub fn total_len(&self) -> u64 {
        self.pos
    }

    /// Configured capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Push one byte into the dictionary, returning it for convenience.
    #[inline]
    pub fn push(&mut self, byte: u8) -> u8 {
        let idx = (self.pos as usize) % self.capacity;
        self.buf[idx] = byte;
        self.pos += 1;
        byte
    }

    /// True if `dist` (0-based distance back from the current position)
    /// refers to a byte that has actually been written.
    #[inline]
    pub fn is_valid_distance(&self, dist: u32) -> bool {
        (dist as u64) < self.pos
    }

    /// Byte at 0-based distance `dist` behind the current write position.
    ///
    /// Panics if `dist` is not a valid distance; callers must check
    /// [`Self::is_valid_distance`] first (the decoder treats an invalid
    /// distance as a data error before ever calling this).
    #[inline]
    pub fn byte_at_distance(&self, dist: u32) -> u8 {
        let back = dist as u64 + 1;
        debug_assert!(back <= self.pos);
        let idx = ((self.pos - back) as usize) % self.capacity;
        self.buf[idx]
    }

    /// Copy a length-`len` match at 0-based distance `dist` into `out`,
    /// handling the case where `dist + 1 < len` (overlapping self-copy).
    pub fn copy_match(&mut self, dist: u32, len: usize, out: &mut Vec<u8>) {
        out.reserve(len);
        for _ in 0..len {
            let byte = self.byte_at_distance(dist);
            self.push(byte);
            out.push(byte);
        }
    }

    /// The most recently written byte, or 0 if the dictionary is still empty.
    #[inline]
    pub fn last_byte(&self) -> u8 {
        if self.pos == 0 {
            0
        } else {
            self.byte_at_distance(0)
        }
    }
}
