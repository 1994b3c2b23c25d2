//! Memory-mapped file support for rlzip.
//!
//! This module provides memory-mapped file access for efficient reading of
//! large input files. Memory mapping lets the operating system handle I/O
//! through virtual memory, which is typically faster than buffered reads
//! for large sequential or random-access inputs.
//!
//! # Features
//!
//! - [`MmapReader`]: A memory-mapped file reader implementing [`std::io::Read`]
//! - Zero-copy access to file contents
//! - Automatic memory management by the OS
//!
//! # Example
//!
//! ```no_run
//! use rlzip_core::mmap::MmapReader;
//! use std::io::Read;
//!
//! let mut reader = MmapReader::open("data.lz").unwrap();
//! let mut buffer = [0u8; 1024];
//! let bytes_read = reader.read(&mut buffer).unwrap();
//! ```
//!
//! # Safety
//!
//! Memory-mapped files can be dangerous if the underlying file is modified by
//! another process while mapped. This implementation uses read-only mappings
//! to minimize risk.
//!
//! # Performance Considerations
//!
//! Memory mapping is typically faster for:
//! - Large files where the OS can efficiently page in data
//! - Random access patterns
//! - Multiple reads of the same data
//!
//! Regular file I/O may be faster for:
//! - Small files
//! - Sequential reads where buffering is more important
//! - Systems with limited virtual address space

use crate::error::Result;
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

/// A memory-mapped file reader.
///
/// Wraps a memory-mapped file and provides a [`Read`] interface for
/// sequential access, plus [`Seek`] for random access.
///
/// # Thread Safety
///
/// The underlying memory map is wrapped in an [`Arc`], making it safe to
/// clone and share between threads. Each clone maintains its own read
/// position.
#[derive(Debug)]
pub struct MmapReader {
    /// The memory-mapped file data.
    mmap: Arc<Mmap>,
    /// Current read position.
    position: usize,
}

impl MmapReader {
    /// Open a file and create a memory-mapped reader.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Io`] if the file cannot be opened or
    /// mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_file(&file)
    }

    /// Create a memory-mapped reader from an already-open file.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the file is not modified while the
    /// memory mapping is active.
    pub fn from_file(file: &File) -> Result<Self> {
        // SAFETY: read-only mapping; caller must keep the file stable while mapped.
        let mmap = unsafe { Mmap::map(file)? };
        Ok(Self {
            mmap: Arc::new(mmap),
            position: 0,
        })
    }

    /// Get the total length of the mapped file.
    #[inline]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    /// Check if the mapped file is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    /// Get the current read position.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Get the remaining bytes available for reading.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.len().saturating_sub(self.position)
    }

    /// Get a slice of the underlying memory-mapped data.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.mmap
    }

    /// Get a slice of the remaining unread data.
    #[inline]
    pub fn remaining_slice(&self) -> &[u8] {
        if self.position >= self.len() {
            &[]
        } else {
            &self.mmap[self.position..]
        }
    }

    /// Reset the read position to the beginning.
    #[inline]
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Create a clone of this reader with the position reset to zero.
    pub fn clone_with_reset_position(&self) -> Self {
        Self {
            mmap: Arc::clone(&self.mmap),
            position: 0,
        }
    }

    /// Create a clone of this reader preserving the current position.
    pub fn clone_with_position(&self) -> Self {
        Self {
            mmap: Arc::clone(&self.mmap),
            position: self.position,
        }
    }
}

impl Clone for MmapReader {
    fn clone(&self) -> Self {
        self.clone_with_position()
    }
}

impl Read for MmapReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.position >= self.len() {
            return Ok(0);
        }

        let available = self.remaining();
        let to_read = buf.len().min(available);
        buf[..to_read].copy_from_slice(&self.mmap[self.position..self.position + to_read]);
        self.position += to_read;
        Ok(to_read)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        if buf.len() > self.remaining() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "read_exact: requested {} bytes but only {} available",
                    buf.len(),
                    self.remaining()
                ),
            ));
        }
        buf.copy_from_slice(&self.mmap[self.position..self.position + buf.len()]);
        self.position += buf.len();
        Ok(())
    }
}

impl Seek for MmapReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let new_pos = match pos {
            SeekFrom::Start(offset) => offset as i64,
            SeekFrom::End(offset) => self.len() as i64 + offset,
            SeekFrom::Current(offset) => self.position as i64 + offset,
        };

        if new_pos < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek to negative position",
            ));
        }

        let new_pos = new_pos as usize;
        // Allow seeking past end (consistent with std::io::Cursor behavior)
        self.position = new_pos;
        Ok(new_pos as u64)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.position as u64)
    }
}

/// Options for creating a memory-mapped reader.
#[derive(Debug, Default, Clone)]
pub struct MmapOptions {
    /// Whether to populate (prefault) the memory mapping.
    populate: bool,
}

impl MmapOptions {
    /// Create a new `MmapOptions` with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to populate the memory mapping.
    ///
    /// When enabled, the OS prefaults the mapping, reading the file contents
    /// into memory immediately. Improves throughput for files read in full,
    /// at the cost of higher initial memory usage.
    pub fn populate(mut self, populate: bool) -> Self {
        self.populate = populate;
        self
    }

    /// Open a file with the configured options.
    pub fn open<P: AsRef<Path>>(self, path: P) -> Result<MmapReader> {
        let file = File::open(path.as_ref())?;
        self.open_file(&file)
    }

    /// Open an already-open file handle with the configured options.
    pub fn open_file(self, file: &File) -> Result<MmapReader> {
        let mmap = if self.populate {
            // SAFETY: read-only mapping; caller must keep the file stable while mapped.
            unsafe { memmap2::MmapOptions::new().populate().map(file)? }
        } else {
            // SAFETY: read-only mapping; caller must keep the file stable while mapped.
            unsafe { Mmap::map(file)? }
        };

        Ok(MmapReader {
            mmap: Arc::new(mmap),
            position: 0,
        })
    }
}
