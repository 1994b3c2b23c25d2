//! Multi-member lzip streams: concatenation on encode, and trailing-data
//! policy on decode (§7).

use crate::header::{MAGIC, VERSION};
use crate::member::{MemberInfo, read_member, write_member};
use rlzip_core::error::{Error, Result};
use rlzip_lzma::EncoderOptions;
use std::io::{Cursor, Read, Write};

/// How a decoder should react to bytes following the last valid member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingDataPolicy {
    /// Any trailing non-member data is a [`Error::TrailingGarbage`].
    #[default]
    Strict,
    /// Silently stop at the first bytes that don't form a valid member.
    Ignore,
    /// Accept trailing bytes that could be the start of another member
    /// (their first byte matches lzip's magic) without error; anything else
    /// is still [`Error::TrailingGarbage`].
    Loose,
}

/// Encode `data` as a stream of one or more concatenated lzip members, each
/// holding at most `member_size_limit` bytes of input. Returns one
/// [`MemberInfo`] per member written, in stream order.
///
/// `member_size_limit` bounds input bytes per member rather than output
/// bytes: the compressed size of a member can't be known before encoding
/// it, so the reference `lzip` binary's own volume-splitting estimates
/// member boundaries the same way. A `member_size_limit` of 0 is treated as
/// unbounded (a single member), matching "no limit configured".
pub fn encode_stream<W: Write>(
    data: &[u8],
    opts: &EncoderOptions,
    member_size_limit: u64,
    mut out: W,
) -> Result<Vec<MemberInfo>> {
    if data.is_empty() {
        return Ok(vec![write_member(data, opts, &mut out)?]);
    }

    let limit = if member_size_limit == 0 {
        data.len()
    } else {
        (member_size_limit as usize).max(1)
    };

    let mut infos = Vec::new();
    let mut pos = 0usize;
    while pos < data.len() {
        let end = (pos + limit).min(data.len());
        infos.push(write_member(&data[pos..end], opts, &mut out)?);
        pos = end;
    }
    Ok(infos)
}

/// Read up to 6 bytes looking for the start of a member header, returning
/// whatever was actually read (fewer than 6 at end of stream) along with the
/// reader positioned just past them.
fn peek_header_bytes<R: Read>(mut reader: R) -> Result<(Vec<u8>, R)> {
    let mut buf = [0u8; 6];
    let mut got = 0usize;
    while got < buf.len() {
        let n = reader.read(&mut buf[got..])?;
        if n == 0 {
            break;
        }
        got += n;
    }
    Ok((buf[..got].to_vec(), reader))
}

fn looks_like_member_start(buf: &[u8]) -> bool {
    buf.len() == 6 && buf[0..4] == MAGIC && buf[4] == VERSION
}

/// Decode every member in `reader`, concatenating their decompressed data
/// onto `out` in stream order, and applying `policy` to whatever bytes
/// follow the last member. Returns one [`MemberInfo`] per member decoded.
pub fn decode_stream<'a, R: Read + 'a, W: Write>(
    reader: R,
    mut out: W,
    policy: TrailingDataPolicy,
) -> Result<Vec<MemberInfo>> {
    let mut cur: Box<dyn Read + 'a> = Box::new(reader);
    let mut infos = Vec::new();

    loop {
        let (prefix, next) = peek_header_bytes(cur)?;
        if prefix.is_empty() {
            break;
        }

        if looks_like_member_start(&prefix) {
            let chained = Cursor::new(prefix).chain(next);
            let (info, remainder) = read_member(chained, &mut out)?;
            infos.push(info);
            cur = Box::new(remainder);
            continue;
        }

        match policy {
            TrailingDataPolicy::Strict => {
                let mut rest = Vec::new();
                let mut next = next;
                next.read_to_end(&mut rest)?;
                return Err(Error::trailing_garbage(prefix.len() as u64 + rest.len() as u64));
            }
            TrailingDataPolicy::Ignore => break,
            TrailingDataPolicy::Loose => {
                if prefix.first() == Some(&MAGIC[0]) {
                    break;
                }
                let mut rest = Vec::new();
                let mut next = next;
                next.read_to_end(&mut rest)?;
                return Err(Error::trailing_garbage(prefix.len() as u64 + rest.len() as u64));
            }
        }
    }

    Ok(infos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rlzip_core::CompressionLevel;
    use std::io::Cursor;

    fn opts() -> EncoderOptions {
        EncoderOptions::from_level(CompressionLevel::DEFAULT)
    }

    #[test]
    fn test_single_member_stream_roundtrip() {
        let data = b"hello\n";
        let mut buf = Vec::new();
        let infos = encode_stream(data, &opts(), 0, &mut buf).unwrap();
        assert_eq!(infos.len(), 1);

        let mut out = Vec::new();
        let read_infos =
            decode_stream(Cursor::new(buf), &mut out, TrailingDataPolicy::Strict).unwrap();
        assert_eq!(out, data);
        assert_eq!(read_infos.len(), 1);
    }

    #[test]
    fn test_multi_member_concatenation() {
        let a = b"The quick brown fox ".repeat(4);
        let b = b"jumps over the lazy dog ".repeat(4);

        let mut buf = Vec::new();
        write_member(&a, &opts(), &mut buf).unwrap();
        write_member(&b, &opts(), &mut buf).unwrap();

        let mut out = Vec::new();
        let infos =
            decode_stream(Cursor::new(buf), &mut out, TrailingDataPolicy::Strict).unwrap();
        assert_eq!(infos.len(), 2);

        let mut expected = a.clone();
        expected.extend_from_slice(&b);
        assert_eq!(out, expected);
    }

    #[test]
    fn test_volume_splitting_produces_multiple_members() {
        let data = vec![b'x'; 10_000];
        let mut buf = Vec::new();
        let infos = encode_stream(&data, &opts(), 4_000, &mut buf).unwrap();
        assert_eq!(infos.len(), 3);

        let mut out = Vec::new();
        decode_stream(Cursor::new(buf), &mut out, TrailingDataPolicy::Strict).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_strict_policy_rejects_trailing_garbage() {
        let mut buf = Vec::new();
        write_member(b"abc", &opts(), &mut buf).unwrap();
        buf.extend_from_slice(b"not a member");

        let mut out = Vec::new();
        let err = decode_stream(Cursor::new(buf), &mut out, TrailingDataPolicy::Strict).unwrap_err();
        assert!(matches!(err, Error::TrailingGarbage { .. }));
    }

    #[test]
    fn test_ignore_policy_stops_silently() {
        let mut buf = Vec::new();
        write_member(b"abc", &opts(), &mut buf).unwrap();
        buf.extend_from_slice(b"garbage trailing bytes");

        let mut out = Vec::new();
        let infos =
            decode_stream(Cursor::new(buf), &mut out, TrailingDataPolicy::Ignore).unwrap();
        assert_eq!(infos.len(), 1);
        assert_eq!(out, b"abc");
    }

    #[test]
    fn test_loose_policy_accepts_magic_like_prefix() {
        let mut buf = Vec::new();
        write_member(b"abc", &opts(), &mut buf).unwrap();
        // A truncated second header: starts with the magic byte but isn't complete.
        buf.extend_from_slice(b"LZ");

        let mut out = Vec::new();
        let infos = decode_stream(Cursor::new(buf), &mut out, TrailingDataPolicy::Loose).unwrap();
        assert_eq!(infos.len(), 1);
    }

    #[test]
    fn test_loose_policy_still_rejects_unrelated_garbage() {
        let mut buf = Vec::new();
        write_member(b"abc", &opts(), &mut buf).unwrap();
        buf.extend_from_slice(b"####");

        let mut out = Vec::new();
        let err = decode_stream(Cursor::new(buf), &mut out, TrailingDataPolicy::Loose).unwrap_err();
        assert!(matches!(err, Error::TrailingGarbage { .. }));
    }
}
