//! lzip member trailer: 20 bytes of `data_crc`, `data_size`, `member_size`.

use rlzip_core::error::{Error, Result};
use std::io::{Read, Write};

/// Size of the trailer in bytes.
pub const TRAILER_SIZE: usize = 20;

/// A parsed lzip member trailer (§6): the CRC-32 of the decompressed data,
/// the decompressed size, and the total size of the member (header, payload,
/// and this trailer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LzipTrailer {
    /// CRC-32 of the decompressed data.
    pub data_crc: u32,
    /// Size of the decompressed data, in bytes.
    pub data_size: u64,
    /// Total size of the member, including header and this trailer.
    pub member_size: u64,
}

impl LzipTrailer {
    /// Write the 20-byte trailer.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.data_crc.to_le_bytes())?;
        writer.write_all(&self.data_size.to_le_bytes())?;
        writer.write_all(&self.member_size.to_le_bytes())?;
        Ok(())
    }

    /// Read a 20-byte trailer.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut buf = [0u8; TRAILER_SIZE];
        reader.read_exact(&mut buf)?;

        Ok(Self {
            data_crc: u32::from_le_bytes(buf[0..4].try_into().unwrap()),
            data_size: u64::from_le_bytes(buf[4..12].try_into().unwrap()),
            member_size: u64::from_le_bytes(buf[12..20].try_into().unwrap()),
        })
    }

    /// Check this trailer against the data actually produced while decoding
    /// a member, returning a [`Error::DataError`] describing the first
    /// mismatch found.
    pub fn verify(&self, data_crc: u32, data_size: u64, member_size: u64) -> Result<()> {
        if self.data_crc != data_crc {
            return Err(Error::data_error(format!(
                "crc mismatch: trailer says {:#010x}, data hashes to {:#010x}",
                self.data_crc, data_crc
            )));
        }
        if self.data_size != data_size {
            return Err(Error::data_error(format!(
                "data size mismatch: trailer says {}, decoded {}",
                self.data_size, data_size
            )));
        }
        if self.member_size != member_size {
            return Err(Error::data_error(format!(
                "member size mismatch: trailer says {}, member was {} bytes",
                self.member_size, member_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_trailer_roundtrip() {
        let trailer = LzipTrailer {
            data_crc: 0xC63B_4682,
            data_size: 6,
            member_size: 32,
        };
        let mut buf = Vec::new();
        trailer.write(&mut buf).unwrap();
        assert_eq!(buf.len(), TRAILER_SIZE);

        let read_back = LzipTrailer::read(&mut Cursor::new(buf)).unwrap();
        assert_eq!(read_back, trailer);
    }

    #[test]
    fn test_verify_detects_crc_mismatch() {
        let trailer = LzipTrailer {
            data_crc: 1,
            data_size: 6,
            member_size: 32,
        };
        let err = trailer.verify(2, 6, 32).unwrap_err();
        assert!(matches!(err, Error::DataError { .. }));
    }

    #[test]
    fn test_verify_detects_size_mismatch() {
        let trailer = LzipTrailer {
            data_crc: 1,
            data_size: 6,
            member_size: 32,
        };
        assert!(trailer.verify(1, 7, 32).is_err());
        assert!(trailer.verify(1, 6, 33).is_err());
        assert!(trailer.verify(1, 6, 32).is_ok());
    }
}
