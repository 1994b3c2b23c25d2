//! LZMA decompression: mirrors [`crate::encoder`], reading a raw LZMA
//! stream (no lzip/member framing) from a [`Read`] source and writing the
//! reconstructed bytes to a [`Write`] sink as it goes.

use crate::dictionary::Dictionary;
use crate::model::{
    DIST_ALIGN_BITS, END_MARKER_DIST, END_POS_MODEL_INDEX, LengthModel, LzmaModel, LzmaProperties,
    MATCH_LEN_MIN, State,
};
use crate::range_coder::RangeDecoder;
use rlzip_core::error::{Error, Result};
use std::io::{Read, Write};

fn decode_length<R: Read>(
    rc: &mut RangeDecoder<R>,
    len_model: &mut LengthModel,
    pos_state: usize,
) -> Result<u32> {
    if rc.decode_bit(&mut len_model.choice)? == 0 {
        return Ok(rc.decode_bit_tree(&mut len_model.low[pos_state], 3)? + MATCH_LEN_MIN as u32);
    }
    if rc.decode_bit(&mut len_model.choice2)? == 0 {
        return Ok(rc.decode_bit_tree(&mut len_model.mid[pos_state], 3)? + 8 + MATCH_LEN_MIN as u32);
    }
    Ok(rc.decode_bit_tree(&mut len_model.high, 8)? + 16 + MATCH_LEN_MIN as u32)
}

fn decode_distance<R: Read>(rc: &mut RangeDecoder<R>, model: &mut LzmaModel, len: u32) -> Result<u32> {
    let len_state = ((len - MATCH_LEN_MIN as u32).min(3)) as usize;
    let slot = rc.decode_bit_tree(&mut model.distance.slot[len_state], 6)?;

    if slot < 4 {
        return Ok(slot);
    }

    let num_direct_bits = (slot >> 1) - 1;
    let mut dist = (2 | (slot & 1)) << num_direct_bits;

    if slot < END_POS_MODEL_INDEX as u32 {
        let base_idx = (dist - slot) as usize;
        dist += rc.decode_bit_tree_reverse(&mut model.distance.special[base_idx..], num_direct_bits)?;
    } else {
        let num_align_bits = DIST_ALIGN_BITS;
        let num_direct = num_direct_bits - num_align_bits;
        dist += rc.decode_direct_bits(num_direct)? << num_align_bits;
        dist += rc.decode_bit_tree_reverse(&mut model.distance.align, num_align_bits)?;
    }

    Ok(dist)
}

fn decode_literal_normal<R: Read>(rc: &mut RangeDecoder<R>, probs: &mut [u16; 0x300]) -> Result<u8> {
    let mut context = 1usize;
    while context < 0x100 {
        let bit = rc.decode_bit(&mut probs[context])?;
        context = (context << 1) | bit as usize;
    }
    Ok((context & 0xFF) as u8)
}

fn decode_literal_matched<R: Read>(
    rc: &mut RangeDecoder<R>,
    probs: &mut [u16; 0x300],
    match_byte: u8,
) -> Result<u8> {
    let mut context = 1usize;
    let mut match_symbol = (match_byte as usize) << 1;

    while context < 0x100 {
        let match_bit = (match_symbol >> 8) & 1;
        match_symbol <<= 1;

        let bit = rc.decode_bit(&mut probs[0x100 + (match_bit << 8) + context])?;
        context = (context << 1) | bit as usize;

        if bit as usize != match_bit {
            while context < 0x100 {
                let bit = rc.decode_bit(&mut probs[context])?;
                context = (context << 1) | bit as usize;
            }
            break;
        }
    }
    Ok((context & 0xFF) as u8)
}

/// `dist` must refer to data already produced: this is stricter than
/// [`Dictionary::is_valid_distance`] alone, which only checks the running
/// byte count and not the physical buffer capacity backing it (a distance
/// can be "seen before" yet still exceed the configured dictionary size if
/// a corrupt stream claims a window larger than what was negotiated).
fn check_distance(dict: &Dictionary, dist: u32) -> Result<()> {
    if !dict.is_valid_distance(dist) {
        return Err(Error::data_error("match distance exceeds data produced so far"));
    }
    if dist as usize >= dict.capacity() {
        return Err(Error::data_error("match distance exceeds dictionary size"));
    }
    Ok(())
}

/// Decode a raw LZMA stream from `reader` into `out`, returning the number
/// of bytes written. `dict_size` bounds the maximum match distance and must
/// match the value the stream was encoded with (carried in lzip's header
/// for the format this codec ultimately serves).
pub fn decode<R: Read, W: Write>(reader: R, dict_size: u32, mut out: W) -> Result<u64> {
    let props = LzmaProperties::default();
    let mut model = LzmaModel::new(props);
    let mut rc = RangeDecoder::new(reader)?;
    let mut dict = Dictionary::new(dict_size as usize)?;
    let mut state = State::new();
    let mut reps = [0u32; 4];
    let mut scratch = Vec::new();

    loop {
        let pos = dict.total_len();
        let num_pos_states = model.props.num_pos_states();
        let pos_state = (pos as usize) & (num_pos_states - 1);
        let state_idx = state.value();

        if rc.decode_bit(&mut model.is_match[state_idx][pos_state])? == 0 {
            let prev_byte = if pos > 0 { dict.last_byte() } else { 0 };
            let lit_state = model.literal.get_state(pos, prev_byte, model.props.lc, model.props.lp);

            let byte = if state.is_literal() {
                decode_literal_normal(&mut rc, &mut model.literal.probs[lit_state])?
            } else {
                check_distance(&dict, reps[0])?;
                let match_byte = dict.byte_at_distance(reps[0]);
                decode_literal_matched(&mut rc, &mut model.literal.probs[lit_state], match_byte)?
            };

            dict.push(byte);
            out.write_all(&[byte])?;
            state.update_literal();
            continue;
        }

        let len;
        if rc.decode_bit(&mut model.is_rep[state_idx])? == 0 {
            // Fresh match: rotate rep history and decode a new distance.
            reps[3] = reps[2];
            reps[2] = reps[1];
            reps[1] = reps[0];
            len = decode_length(&mut rc, &mut model.match_len, pos_state)?;
            reps[0] = decode_distance(&mut rc, &mut model, len)?;

            if reps[0] == END_MARKER_DIST {
                break;
            }
            state.update_match();
        } else {
            if rc.decode_bit(&mut model.is_rep0[state_idx])? == 0 {
                if rc.decode_bit(&mut model.is_rep0_long[state_idx][pos_state])? == 0 {
                    // Short rep: single byte copy at distance reps[0].
                    check_distance(&dict, reps[0])?;
                    let byte = dict.byte_at_distance(reps[0]);
                    dict.push(byte);
                    out.write_all(&[byte])?;
                    state.update_short_rep();
                    continue;
                }
            } else {
                let dist;
                if rc.decode_bit(&mut model.is_rep1[state_idx])? == 0 {
                    dist = reps[1];
                } else if rc.decode_bit(&mut model.is_rep2[state_idx])? == 0 {
                    dist = reps[2];
                    reps[2] = reps[1];
                } else {
                    dist = reps[3];
                    reps[3] = reps[2];
                    reps[2] = reps[1];
                }
                reps[1] = reps[0];
                reps[0] = dist;
            }
            len = decode_length(&mut rc, &mut model.rep_len, pos_state)?;
            state.update_long_rep();
        }

        check_distance(&dict, reps[0])?;
        scratch.clear();
        dict.copy_match(reps[0], len as usize, &mut scratch);
        out.write_all(&scratch)?;
    }

    Ok(dict.total_len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{EncoderOptions, encode};
    use rlzip_core::CompressionLevel;

    #[test]
    fn test_decode_empty_stream() {
        let opts = EncoderOptions::from_level(CompressionLevel::DEFAULT);
        let compressed = encode(b"", &opts, Vec::new()).unwrap();
        let mut out = Vec::new();
        let n = decode(&compressed[..], opts.dict_size, &mut out).unwrap();
        assert_eq!(n, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_decode_rejects_truncated_stream() {
        let opts = EncoderOptions::from_level(CompressionLevel::DEFAULT);
        let compressed = encode(b"hello world hello world", &opts, Vec::new()).unwrap();
        let truncated = &compressed[..compressed.len() - 2];
        let mut out = Vec::new();
        assert!(decode(truncated, opts.dict_size, &mut out).is_err());
    }

    #[test]
    fn test_decode_rejects_bad_preamble() {
        let mut garbage = vec![0x01u8; 16];
        garbage[0] = 0xFF;
        let mut out = Vec::new();
        assert!(decode(&garbage[..], 1 << 20, &mut out).is_err());
    }
}
