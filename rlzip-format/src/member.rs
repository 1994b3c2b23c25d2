//! A single lzip member: header + LZMA payload + trailer.
//!
//! This is the layer that actually drives [`rlzip_lzma`] - the codec crate
//! produces and consumes raw LZMA streams only, so everything here is
//! framing: measuring the payload as it's written/read so the trailer's
//! `member_size` comes out right, and hashing the decompressed bytes so the
//! trailer's `data_crc` can be checked.

use crate::header::LzipHeader;
use crate::trailer::{LzipTrailer, TRAILER_SIZE};
use rlzip_core::crc::Crc32;
use rlzip_core::error::Result;
use rlzip_lzma::{EncoderOptions, decode as lzma_decode, encode as lzma_encode};
use std::io::{Read, Write};

/// A writer adapter that counts bytes passed through it.
struct CountingWriter<W> {
    inner: W,
    count: u64,
}

impl<W> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, count: 0 }
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// A reader adapter that counts bytes passed through it.
struct CountingReader<R> {
    inner: R,
    count: u64,
}

impl<R> CountingReader<R> {
    fn new(inner: R) -> Self {
        Self { inner, count: 0 }
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n as u64;
        Ok(n)
    }
}

/// A writer adapter that hashes and counts everything passed through it,
/// forwarding the bytes unchanged to the wrapped sink.
struct CrcCountingWriter<W> {
    inner: W,
    crc: Crc32,
    count: u64,
}

impl<W> CrcCountingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            crc: Crc32::new(),
            count: 0,
        }
    }
}

impl<W: Write> Write for CrcCountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.crc.update(&buf[..n]);
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Summary of one member, as produced by encoding or verified while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberInfo {
    /// The member's parsed header.
    pub header: LzipHeader,
    /// Size of the decompressed data this member holds.
    pub data_size: u64,
    /// CRC-32 of the decompressed data.
    pub data_crc: u32,
    /// Total size of the member on the wire (header + payload + trailer).
    pub member_size: u64,
}

/// Encode `data` as one complete lzip member (header, LZMA payload, trailer)
/// written to `out`. Returns the member's size in bytes.
pub fn write_member<W: Write>(data: &[u8], opts: &EncoderOptions, mut out: W) -> Result<MemberInfo> {
    let header = LzipHeader::new(opts.dict_size);
    header.write(&mut out)?;

    let payload_writer = CountingWriter::new(out);
    let payload_writer = lzma_encode(data, opts, payload_writer)?;
    let payload_size = payload_writer.count;
    let mut out = payload_writer.inner;

    let data_crc = Crc32::compute(data);
    let member_size = 6 + payload_size + TRAILER_SIZE as u64;
    let trailer = LzipTrailer {
        data_crc,
        data_size: data.len() as u64,
        member_size,
    };
    trailer.write(&mut out)?;

    Ok(MemberInfo {
        header,
        data_size: data.len() as u64,
        data_crc,
        member_size,
    })
}

/// Read one complete lzip member from `reader`, writing the decompressed
/// data to `out` and verifying the trailer. Returns the member's summary and
/// the reader, positioned just past the trailer (ready for the next member
/// in a concatenated stream).
pub fn read_member<R: Read, W: Write>(mut reader: R, out: W) -> Result<(MemberInfo, R)> {
    let header = LzipHeader::read(&mut reader)?;

    let mut counting_reader = CountingReader::new(reader);
    let mut crc_writer = CrcCountingWriter::new(out);
    lzma_decode(&mut counting_reader, header.dict_size, &mut crc_writer)?;

    let payload_size = counting_reader.count;
    let data_size = crc_writer.count;
    let data_crc = crc_writer.crc.clone().finalize();
    let mut reader = counting_reader.inner;

    let trailer = LzipTrailer::read(&mut reader)?;
    let member_size = 6 + payload_size + TRAILER_SIZE as u64;
    trailer.verify(data_crc, data_size, member_size)?;

    Ok((
        MemberInfo {
            header,
            data_size,
            data_crc,
            member_size,
        },
        reader,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rlzip_core::CompressionLevel;
    use std::io::Cursor;

    #[test]
    fn test_member_roundtrip() {
        let opts = EncoderOptions::from_level(CompressionLevel::DEFAULT);
        let data = b"hello\n";

        let mut buf = Vec::new();
        let written = write_member(data, &opts, &mut buf).unwrap();
        assert_eq!(written.data_size, 6);
        assert_eq!(written.data_crc, 0xC63B_4682);
        assert_eq!(written.member_size, buf.len() as u64);

        let mut out = Vec::new();
        let (info, _reader) = read_member(Cursor::new(buf), &mut out).unwrap();
        assert_eq!(out, data);
        assert_eq!(info, written);
    }

    #[test]
    fn test_empty_member_roundtrip() {
        let opts = EncoderOptions::from_level(CompressionLevel::DEFAULT);
        let mut buf = Vec::new();
        let written = write_member(b"", &opts, &mut buf).unwrap();
        assert_eq!(written.data_size, 0);
        assert_eq!(written.data_crc, 0);

        let mut out = Vec::new();
        let (info, _) = read_member(Cursor::new(buf), &mut out).unwrap();
        assert!(out.is_empty());
        assert_eq!(info.data_size, 0);
    }

    #[test]
    fn test_member_rejects_truncated_trailer() {
        let opts = EncoderOptions::from_level(CompressionLevel::DEFAULT);
        let mut buf = Vec::new();
        write_member(b"hello world hello world", &opts, &mut buf).unwrap();
        buf.truncate(buf.len() - 1);

        let mut out = Vec::new();
        assert!(read_member(Cursor::new(buf), &mut out).is_err());
    }

    #[test]
    fn test_member_detects_flipped_trailer_bit() {
        let opts = EncoderOptions::from_level(CompressionLevel::DEFAULT);
        let mut buf = Vec::new();
        write_member(b"hello world", &opts, &mut buf).unwrap();
        let last = buf.len() - 1;
        buf[last] ^= 0x01;

        let mut out = Vec::new();
        assert!(read_member(Cursor::new(buf), &mut out).is_err());
    }
}
