//! Shared helpers for the rlzip CLI commands.

use crate::error::Result;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use rlzip_core::mmap::MmapReader;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// An input file's bytes, borrowed from a memory mapping when reading from
/// a real file (the `MmapReader` the ambient stack calls for - see
/// `rlzip_core::mmap`), or owned when the source is stdin.
pub enum Input {
    /// A memory-mapped regular file.
    Mapped(MmapReader),
    /// Bytes read from stdin.
    Buffered(Vec<u8>),
}

impl Input {
    /// Borrow the input's bytes.
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Self::Mapped(m) => m.as_slice(),
            Self::Buffered(v) => v,
        }
    }

    /// The input's length in bytes.
    pub fn len(&self) -> u64 {
        self.as_slice().len() as u64
    }

    /// Whether the input is empty.
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

/// The extension lzip appends to compressed files.
pub const LZ_EXTENSION: &str = "lz";

/// Create a byte-counting progress bar with standard styling, or a hidden
/// one when `enable` is false (mirrors a non-interactive / quiet run).
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
            .expect("progress bar template is valid")
            .progress_chars("█▓▒░ "),
    );
    pb
}

/// Derive the default compressed output name for `input` (append `.lz`).
pub fn default_compressed_name(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_os_string();
    name.push(".");
    name.push(LZ_EXTENSION);
    PathBuf::from(name)
}

/// Derive the default decompressed output name for `input` (strip a
/// trailing `.lz`, or append `.out` if the input doesn't carry one - lzip
/// itself refuses that case, but an `rlzip` invocation with an explicit
/// `--output` never needs this fallback).
pub fn default_decompressed_name(input: &Path) -> Option<PathBuf> {
    if input.extension().and_then(|e| e.to_str()) == Some(LZ_EXTENSION) {
        Some(input.with_extension(""))
    } else {
        None
    }
}

/// Ask the user whether to overwrite an existing `path`, unless `force` is
/// set (in which case overwriting is always allowed without asking).
///
/// Returns `Ok(true)` if writing should proceed.
pub fn confirm_overwrite(path: &Path, force: bool) -> io::Result<bool> {
    if force || !path.exists() {
        return Ok(true);
    }

    Confirm::new()
        .with_prompt(format!("{} already exists, overwrite?", path.display()))
        .default(false)
        .interact()
        .map_err(|e| io::Error::other(e.to_string()))
}

/// Copy `input`'s modification time and Unix permissions onto `output`,
/// best-effort: a failure here shouldn't fail the whole operation, since the
/// compressed/decompressed data is already correct on disk.
pub fn copy_metadata(input: &Path, output: &Path) {
    let Ok(metadata) = fs::metadata(input) else {
        return;
    };

    let mtime = filetime::FileTime::from_last_modification_time(&metadata);
    let _ = filetime::set_file_mtime(output, mtime);

    #[cfg(unix)]
    {
        let _ = fs::set_permissions(output, metadata.permissions());
    }
}

/// Remove the original input file after a successful compress/decompress,
/// unless `keep` or stdout output was requested.
pub fn remove_input_unless_kept(input: &Path, keep: bool, wrote_to_stdout: bool) {
    if keep || wrote_to_stdout || input == Path::new("-") {
        return;
    }
    let _ = fs::remove_file(input);
}

/// Format a byte count in human-readable units.
pub fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GiB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MiB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KiB", size as f64 / KB as f64)
    } else {
        format!("{size} B")
    }
}

/// Format a compression ratio as a percentage of space saved.
pub fn format_ratio(uncompressed: u64, compressed: u64) -> String {
    if uncompressed == 0 {
        return "-".to_string();
    }
    format!(
        "{:.1}%",
        (1.0 - compressed as f64 / uncompressed as f64) * 100.0
    )
}

/// Open `path` for reading, memory-mapping regular files and buffering
/// stdin when `path` is `-`.
pub fn read_input(path: &Path) -> Result<Input> {
    use std::io::Read;

    if path == Path::new("-") {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        Ok(Input::Buffered(buf))
    } else {
        Ok(Input::Mapped(MmapReader::open(path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_compressed_name() {
        assert_eq!(
            default_compressed_name(Path::new("foo.txt")),
            PathBuf::from("foo.txt.lz")
        );
    }

    #[test]
    fn test_default_decompressed_name() {
        assert_eq!(
            default_decompressed_name(Path::new("foo.txt.lz")),
            Some(PathBuf::from("foo.txt"))
        );
        assert_eq!(default_decompressed_name(Path::new("foo.txt")), None);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.00 KiB");
    }

    #[test]
    fn test_format_ratio_zero_input() {
        assert_eq!(format_ratio(0, 0), "-");
    }

    #[test]
    fn test_format_ratio_compressed() {
        assert_eq!(format_ratio(100, 50), "50.0%");
    }
}
