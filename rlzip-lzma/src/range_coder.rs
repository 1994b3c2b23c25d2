//! Range coder for LZMA compression.
//!
//! The range coder is an entropy coding method similar to arithmetic coding.
//! LZMA uses a specific variant with:
//! - 32-bit range tracking
//! - Normalization when range drops below 2^24
//! - 11-bit probability model (2048 = 50%)

use rlzip_core::error::{Error, Result};
use std::io::{Read, Write};

/// Number of bits in probability model.
pub const PROB_BITS: u32 = 11;

/// Probability representing 50% (1 << 10 = 1024, but we use 2048/2).
pub const PROB_INIT: u16 = 1 << (PROB_BITS - 1);

/// Maximum probability value.
pub const PROB_MAX: u16 = 1 << PROB_BITS;

/// Number of bits to shift for probability update.
pub const MOVE_BITS: u32 = 5;

/// Top value for range normalization.
const TOP_VALUE: u32 = 1 << 24;

/// Range decoder for LZMA decompression, reading from a byte stream.
#[derive(Debug)]
pub struct RangeDecoder<R: Read> {
    reader: R,
    range: u32,
    code: u32,
}

impl<R: Read> RangeDecoder<R> {
    /// Create a new range decoder, consuming the 5-byte preamble
    /// (one zero byte followed by the initial 4-byte code, big-endian).
    pub fn new(mut reader: R) -> Result<Self> {
        let mut buf = [0u8; 1];
        reader.read_exact(&mut buf)?;

        if buf[0] != 0x00 {
            return Err(Error::data_error("invalid range coder start byte"));
        }

        let mut code_buf = [0u8; 4];
        reader.read_exact(&mut code_buf)?;
        let code = u32::from_be_bytes(code_buf);

        Ok(Self {
            reader,
            range: 0xFFFF_FFFF,
            code,
        })
    }

    /// Normalize the range (refill when range gets small).
    fn normalize(&mut self) -> Result<()> {
        if self.range < TOP_VALUE {
            let mut buf = [0u8; 1];
            self.reader.read_exact(&mut buf)?;
            self.range <<= 8;
            self.code = (self.code << 8) | buf[0] as u32;
        }
        Ok(())
    }

    /// Decode a single bit with the given probability.
    pub fn decode_bit(&mut self, prob: &mut u16) -> Result<u32> {
        self.normalize()?;

        let bound = (self.range >> PROB_BITS) * (*prob as u32);

        if self.code < bound {
            self.range = bound;
            *prob += (PROB_MAX - *prob) >> MOVE_BITS;
            Ok(0)
        } else {
            self.range -= bound;
            self.code -= bound;
            *prob -= *prob >> MOVE_BITS;
            Ok(1)
        }
    }

    /// Decode a bit with fixed 50% probability.
    pub fn decode_direct_bit(&mut self) -> Result<u32> {
        self.normalize()?;

        self.range >>= 1;
        self.code = self.code.wrapping_sub(self.range);

        let bit = if (self.code as i32) < 0 {
            self.code = self.code.wrapping_add(self.range);
            0
        } else {
            1
        };

        Ok(bit)
    }

    /// Decode multiple bits with fixed probability, MSB first.
    pub fn decode_direct_bits(&mut self, count: u32) -> Result<u32> {
        let mut result = 0u32;
        for _ in 0..count {
            result = (result << 1) | self.decode_direct_bit()?;
        }
        Ok(result)
    }

    /// Decode a bit tree, LSB first (used for distance alignment bits).
    pub fn decode_bit_tree_reverse(&mut self, probs: &mut [u16], num_bits: u32) -> Result<u32> {
        let mut result = 0u32;
        let mut index = 1usize;

        for i in 0..num_bits {
            let bit = self.decode_bit(&mut probs[index])?;
            index = (index << 1) | bit as usize;
            result |= bit << i;
        }

        Ok(result)
    }

    /// Decode a bit tree, MSB first (used for literals, length and distance slots).
    pub fn decode_bit_tree(&mut self, probs: &mut [u16], num_bits: u32) -> Result<u32> {
        let mut index = 1usize;

        for _ in 0..num_bits {
            let bit = self.decode_bit(&mut probs[index])?;
            index = (index << 1) | bit as usize;
        }

        Ok((index as u32) - (1 << num_bits))
    }

    /// True once the stream has been fully consumed (code drained to zero).
    pub fn is_finished_ok(&self) -> bool {
        self.code == 0
    }
}

/// Range encoder for LZMA compression, writing directly to a byte stream.
#[derive(Debug)]
pub struct RangeEncoder<W: Write> {
    writer: W,
    range: u32,
    low: u64,
    cache: u8,
    cache_size: u64,
    /// Count of bytes written so far, including the initial cache byte once flushed.
    bytes_written: u64,
}

impl<W: Write> RangeEncoder<W> {
    /// Create a new range encoder writing to `writer`.
    ///
    /// `cache` starts at 0 so the very first byte `shift_low` emits is the
    /// zero preamble byte [`RangeDecoder::new`] requires.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            range: 0xFFFF_FFFF,
            low: 0,
            cache: 0,
            cache_size: 1,
            bytes_written: 0,
        }
    }

    /// Shift low and write bytes, propagating any carry into already-cached bytes.
    fn shift_low(&mut self) -> Result<()> {
        if self.low < 0xFF00_0000 || self.low > 0xFFFF_FFFF {
            let mut tmp = self.cache;
            let carry = (self.low >> 32) as u8;

            loop {
                let byte = tmp.wrapping_add(carry);
                self.writer.write_all(&[byte])?;
                self.bytes_written += 1;
                tmp = 0xFF;
                self.cache_size -= 1;
                if self.cache_size == 0 {
                    break;
                }
            }

            self.cache = (self.low >> 24) as u8;
        }

        self.cache_size += 1;
        self.low = (self.low << 8) & 0xFFFF_FFFF;
        Ok(())
    }

    /// Normalize the range.
    fn normalize(&mut self) -> Result<()> {
        if self.range < TOP_VALUE {
            self.range <<= 8;
            self.shift_low()?;
        }
        Ok(())
    }

    /// Encode a single bit with the given probability.
    pub fn encode_bit(&mut self, prob: &mut u16, bit: u32) -> Result<()> {
        let bound = (self.range >> PROB_BITS) * (*prob as u32);

        if bit == 0 {
            self.range = bound;
            *prob += (PROB_MAX - *prob) >> MOVE_BITS;
        } else {
            self.low += bound as u64;
            self.range -= bound;
            *prob -= *prob >> MOVE_BITS;
        }

        self.normalize()
    }

    /// Encode a bit with fixed 50% probability.
    pub fn encode_direct_bit(&mut self, bit: u32) -> Result<()> {
        self.range >>= 1;
        if bit != 0 {
            self.low += self.range as u64;
        }
        self.normalize()
    }

    /// Encode multiple bits with fixed probability, MSB first.
    pub fn encode_direct_bits(&mut self, value: u32, count: u32) -> Result<()> {
        for i in (0..count).rev() {
            self.encode_direct_bit((value >> i) & 1)?;
        }
        Ok(())
    }

    /// Encode a bit tree, LSB first.
    pub fn encode_bit_tree_reverse(
        &mut self,
        probs: &mut [u16],
        num_bits: u32,
        value: u32,
    ) -> Result<()> {
        let mut index = 1usize;

        for i in 0..num_bits {
            let bit = (value >> i) & 1;
            self.encode_bit(&mut probs[index], bit)?;
            index = (index << 1) | bit as usize;
        }
        Ok(())
    }

    /// Encode a bit tree, MSB first.
    pub fn encode_bit_tree(&mut self, probs: &mut [u16], num_bits: u32, value: u32) -> Result<()> {
        let mut index = 1usize;

        for i in (0..num_bits).rev() {
            let bit = (value >> i) & 1;
            self.encode_bit(&mut probs[index], bit)?;
            index = (index << 1) | bit as usize;
        }
        Ok(())
    }

    /// Flush remaining state, finishing the 5-byte tail required to drain the cache.
    pub fn flush(&mut self) -> Result<()> {
        for _ in 0..5 {
            self.shift_low()?;
        }
        Ok(())
    }

    /// Number of bytes written to the underlying writer so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Consume the encoder, flushing and returning the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_prob_constants() {
        assert_eq!(PROB_INIT, 1024);
        assert_eq!(PROB_MAX, 2048);
    }

    #[test]
    fn test_range_encoder_basic() {
        let encoder = RangeEncoder::new(Vec::new());
        assert_eq!(encoder.range, 0xFFFF_FFFF);
    }

    #[test]
    fn test_encode_decode_bits() {
        let mut encoder = RangeEncoder::new(Vec::new());
        let mut prob = PROB_INIT;

        encoder.encode_bit(&mut prob, 0).unwrap();
        encoder.encode_bit(&mut prob, 1).unwrap();
        encoder.encode_bit(&mut prob, 0).unwrap();
        encoder.encode_bit(&mut prob, 1).unwrap();

        let encoded = encoder.into_inner().unwrap();

        let cursor = Cursor::new(encoded);
        let mut decoder = RangeDecoder::new(cursor).unwrap();
        let mut prob = PROB_INIT;

        assert_eq!(decoder.decode_bit(&mut prob).unwrap(), 0);
        assert_eq!(decoder.decode_bit(&mut prob).unwrap(), 1);
        assert_eq!(decoder.decode_bit(&mut prob).unwrap(), 0);
        assert_eq!(decoder.decode_bit(&mut prob).unwrap(), 1);
    }

    #[test]
    fn test_direct_bits_roundtrip() {
        let mut encoder = RangeEncoder::new(Vec::new());
        encoder.encode_direct_bits(0b10110, 5).unwrap();
        let encoded = encoder.into_inner().unwrap();

        let mut decoder = RangeDecoder::new(Cursor::new(encoded)).unwrap();
        assert_eq!(decoder.decode_direct_bits(5).unwrap(), 0b10110);
    }

    #[test]
    fn test_bit_tree_roundtrip() {
        let mut probs = vec![PROB_INIT; 1 << 6];
        let mut encoder = RangeEncoder::new(Vec::new());
        encoder.encode_bit_tree(&mut probs, 6, 37).unwrap();
        let encoded = encoder.into_inner().unwrap();

        let mut decode_probs = vec![PROB_INIT; 1 << 6];
        let mut decoder = RangeDecoder::new(Cursor::new(encoded)).unwrap();
        assert_eq!(decoder.decode_bit_tree(&mut decode_probs, 6).unwrap(), 37);
    }
}
