//! LZMA compression: wires the match finder, the fast/optimal packet
//! planners, and the probability model into the range coder.
//!
//! This module knows nothing about lzip member framing - it takes a byte
//! slice and a [`Write`] sink and produces a raw LZMA stream terminated by
//! the end-of-stream marker (§4.8). [`crate::dictionary`]'s decoder-side
//! counterpart is mirrored here only in spirit: the encoder's match finder
//! indexes directly into the input slice rather than a circular buffer,
//! since the whole input is already resident (see
//! `crate::match_finder`'s module doc).

use crate::match_finder::MatchFinder;
use crate::model::{
    DIST_ALIGN_BITS, END_POS_MODEL_INDEX, LEN_HIGH_BITS, LEN_LOW_BITS, LEN_MID_BITS, LengthModel,
    LzmaModel, LzmaProperties, MATCH_LEN_MIN, State, END_MARKER_DIST,
};
use crate::optimal::{OptimalParser, Packet, apply_packet};
use crate::fast::FastParser;
use crate::price::get_dist_slot;
use crate::range_coder::RangeEncoder;
use rlzip_core::CompressionLevel;
use rlzip_core::error::Result;
use std::io::Write;

/// Tuning knobs for one encoding run, chosen from a [`CompressionLevel`] or
/// set directly by a caller that wants finer control than the 0-9 scale.
///
/// This is the `EncoderOptions` builder SPEC_FULL's ambient-stack section
/// calls for: a plain value type, not a config file or environment-driven
/// system.
#[derive(Debug, Clone, Copy)]
pub struct EncoderOptions {
    /// Sliding-window size in bytes; bounds the maximum match distance.
    pub dict_size: u32,
    /// Longest match length a planning round will consider (5..=273).
    pub match_len_limit: usize,
    /// Matches/reps at least this long are taken immediately without
    /// further price-driven planning.
    pub nice_len: usize,
    /// Maximum chain links (hash-chain) or tree nodes (binary-tree) visited
    /// per match-finder query.
    pub depth_limit: usize,
    /// Use the binary-tree match finder instead of the hash chain.
    pub use_binary_tree: bool,
    /// Use the optimal (price-driven DP) planner instead of the greedy one.
    pub use_optimal: bool,
}

impl EncoderOptions {
    /// Derive options from a 0-9 compression level, loosely following the
    /// dictionary-size/match-length-limit progression of the reference
    /// `lzip` binary (exact sizes don't affect conformance - any valid
    /// distance/length decodes the same on every implementation - only the
    /// compression ratio).
    pub fn from_level(level: CompressionLevel) -> Self {
        let (dict_size, match_len_limit, nice_len, depth_limit, use_binary_tree, use_optimal) =
            match level.level() {
                0 => (1 << 20, 16, 16, 4, false, false),
                1 => (1 << 20, 16, 16, 8, false, false),
                2 => (3 << 19, 20, 20, 12, false, true),
                3 => (1 << 21, 20, 20, 16, false, true),
                4 => (3 << 20, 20, 20, 24, false, true),
                5 => (1 << 22, 36, 36, 32, false, true),
                6 => (1 << 23, 64, 64, 48, true, true),
                7 => (1 << 24, 132, 132, 64, true, true),
                8 => (1 << 24, 133, 133, 96, true, true),
                _ => (1 << 25, 273, 273, 128, true, true),
            };
        Self {
            dict_size,
            match_len_limit,
            nice_len,
            depth_limit,
            use_binary_tree,
            use_optimal,
        }
    }
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self::from_level(CompressionLevel::DEFAULT)
    }
}

enum Planner {
    Fast(FastParser),
    Optimal(OptimalParser),
}

impl Planner {
    fn next_packet(
        &mut self,
        data: &[u8],
        pos: usize,
        mf: &mut MatchFinder,
        model: &LzmaModel,
        state: State,
        reps: [u32; 4],
    ) -> Packet {
        match self {
            Self::Fast(p) => p.next_packet(data, pos, mf, reps),
            Self::Optimal(p) => p.next_packet(data, pos, mf, model, state, reps),
        }
    }
}

fn encode_length<W: Write>(
    rc: &mut RangeEncoder<W>,
    len_model: &mut LengthModel,
    len: u32,
    pos_state: usize,
) -> Result<()> {
    let len = len - MATCH_LEN_MIN as u32;

    if len < (1 << LEN_LOW_BITS) {
        rc.encode_bit(&mut len_model.choice, 0)?;
        rc.encode_bit_tree(&mut len_model.low[pos_state], LEN_LOW_BITS, len)?;
    } else if len < (1 << LEN_LOW_BITS) + (1 << LEN_MID_BITS) {
        rc.encode_bit(&mut len_model.choice, 1)?;
        rc.encode_bit(&mut len_model.choice2, 0)?;
        rc.encode_bit_tree(
            &mut len_model.mid[pos_state],
            LEN_MID_BITS,
            len - (1 << LEN_LOW_BITS),
        )?;
    } else {
        rc.encode_bit(&mut len_model.choice, 1)?;
        rc.encode_bit(&mut len_model.choice2, 1)?;
        rc.encode_bit_tree(
            &mut len_model.high,
            LEN_HIGH_BITS,
            len - (1 << LEN_LOW_BITS) - (1 << LEN_MID_BITS),
        )?;
    }
    Ok(())
}

fn encode_distance<W: Write>(
    rc: &mut RangeEncoder<W>,
    model: &mut LzmaModel,
    dist: u32,
    len: u32,
) -> Result<()> {
    let len_state = ((len - MATCH_LEN_MIN as u32).min(3)) as usize;
    let slot = get_dist_slot(dist);

    rc.encode_bit_tree(&mut model.distance.slot[len_state], 6, slot)?;

    if slot >= 4 {
        let num_direct_bits = (slot >> 1) - 1;
        let base = (2 | (slot & 1)) << num_direct_bits;
        let dist_reduced = dist - base;

        if slot < END_POS_MODEL_INDEX as u32 {
            let base_idx = (base - slot) as usize;
            rc.encode_bit_tree_reverse(
                &mut model.distance.special[base_idx..],
                num_direct_bits,
                dist_reduced,
            )?;
        } else {
            let num_align_bits = DIST_ALIGN_BITS;
            let num_direct = num_direct_bits - num_align_bits;
            rc.encode_direct_bits(dist_reduced >> num_align_bits, num_direct)?;
            rc.encode_bit_tree_reverse(
                &mut model.distance.align,
                num_align_bits,
                dist_reduced & ((1 << num_align_bits) - 1),
            )?;
        }
    }
    Ok(())
}

fn encode_literal_normal<W: Write>(
    rc: &mut RangeEncoder<W>,
    probs: &mut [u16; 0x300],
    byte: u8,
) -> Result<()> {
    let mut symbol = (byte as usize) | 0x100;
    let mut context = 1usize;

    loop {
        let bit = ((symbol >> 7) & 1) as u32;
        symbol <<= 1;
        rc.encode_bit(&mut probs[context], bit)?;
        context = (context << 1) | bit as usize;
        if context >= 0x100 {
            break;
        }
    }
    Ok(())
}

fn encode_literal_matched<W: Write>(
    rc: &mut RangeEncoder<W>,
    probs: &mut [u16; 0x300],
    byte: u8,
    match_byte: u8,
) -> Result<()> {
    let mut symbol = (byte as usize) | 0x100;
    let mut match_symbol = (match_byte as usize) << 1;
    let mut context = 1usize;

    loop {
        let match_bit = (match_symbol >> 8) & 1;
        match_symbol <<= 1;

        let bit = ((symbol >> 7) & 1) as u32;
        symbol <<= 1;

        rc.encode_bit(&mut probs[0x100 + (match_bit << 8) + context], bit)?;
        context = (context << 1) | bit as usize;

        if context >= 0x100 {
            break;
        }
        if bit as usize != match_bit {
            while context < 0x100 {
                let bit = ((symbol >> 7) & 1) as u32;
                symbol <<= 1;
                rc.encode_bit(&mut probs[context], bit)?;
                context = (context << 1) | bit as usize;
            }
            break;
        }
    }
    Ok(())
}

/// Emit one planned packet, leaving `model`'s probabilities updated but
/// `state`/`reps` untouched - the caller applies that transition via
/// [`apply_packet`] once, shared with the planner so the two can never
/// disagree.
#[allow(clippy::too_many_arguments)]
fn emit_packet<W: Write>(
    rc: &mut RangeEncoder<W>,
    model: &mut LzmaModel,
    state: State,
    reps: [u32; 4],
    packet: &Packet,
    pos: usize,
    data: &[u8],
) -> Result<()> {
    let num_pos_states = model.props.num_pos_states();
    let pos_state = pos & (num_pos_states - 1);
    let state_idx = state.value();

    match *packet {
        Packet::Literal(byte) => {
            rc.encode_bit(&mut model.is_match[state_idx][pos_state], 0)?;
            let prev_byte = if pos > 0 { data[pos - 1] } else { 0 };
            let lit_state = model
                .literal
                .get_state(pos as u64, prev_byte, model.props.lc, model.props.lp);
            if state.is_literal() {
                encode_literal_normal(rc, &mut model.literal.probs[lit_state], byte)?;
            } else {
                let match_byte = if (reps[0] as usize) < pos {
                    data[pos - reps[0] as usize - 1]
                } else {
                    0
                };
                encode_literal_matched(rc, &mut model.literal.probs[lit_state], byte, match_byte)?;
            }
        }
        Packet::ShortRep => {
            rc.encode_bit(&mut model.is_match[state_idx][pos_state], 1)?;
            rc.encode_bit(&mut model.is_rep[state_idx], 1)?;
            rc.encode_bit(&mut model.is_rep0[state_idx], 0)?;
            rc.encode_bit(&mut model.is_rep0_long[state_idx][pos_state], 0)?;
        }
        Packet::Rep { idx, len } => {
            rc.encode_bit(&mut model.is_match[state_idx][pos_state], 1)?;
            rc.encode_bit(&mut model.is_rep[state_idx], 1)?;

            if idx == 0 {
                rc.encode_bit(&mut model.is_rep0[state_idx], 0)?;
                rc.encode_bit(&mut model.is_rep0_long[state_idx][pos_state], 1)?;
            } else {
                rc.encode_bit(&mut model.is_rep0[state_idx], 1)?;
                if idx == 1 {
                    rc.encode_bit(&mut model.is_rep1[state_idx], 0)?;
                } else {
                    rc.encode_bit(&mut model.is_rep1[state_idx], 1)?;
                    rc.encode_bit(&mut model.is_rep2[state_idx], if idx == 2 { 0 } else { 1 })?;
                }
            }
            encode_length(rc, &mut model.rep_len, len, pos_state)?;
        }
        Packet::Match { dist, len } => {
            rc.encode_bit(&mut model.is_match[state_idx][pos_state], 1)?;
            rc.encode_bit(&mut model.is_rep[state_idx], 0)?;
            encode_length(rc, &mut model.match_len, len, pos_state)?;
            encode_distance(rc, model, dist, len)?;
        }
    }
    Ok(())
}

/// Encode `data` as a raw LZMA stream (no lzip/member framing), written to
/// `out`. Returns `out` back once the end-of-stream marker has been
/// flushed, so a caller that handed in e.g. a byte-counting adapter keeps
/// it.
pub fn encode<W: Write>(data: &[u8], opts: &EncoderOptions, out: W) -> Result<W> {
    let props = LzmaProperties::default();
    let mut model = LzmaModel::new(props);
    let mut rc = RangeEncoder::new(out);
    let mut state = State::new();
    let mut reps = [0u32; 4];

    let mut mf = if opts.use_binary_tree {
        MatchFinder::binary_tree(
            data.len(),
            opts.dict_size as usize,
            opts.nice_len,
            opts.depth_limit,
        )
    } else {
        MatchFinder::hash_chain(data.len(), opts.dict_size as usize, opts.depth_limit)
    };

    let mut planner = if opts.use_optimal {
        Planner::Optimal(OptimalParser::new(opts.nice_len, opts.match_len_limit))
    } else {
        Planner::Fast(FastParser::new(opts.match_len_limit))
    };

    let mut pos = 0usize;
    while pos < data.len() {
        let packet = planner.next_packet(data, pos, &mut mf, &model, state, reps);
        emit_packet(&mut rc, &mut model, state, reps, &packet, pos, data)?;
        let (new_state, new_reps) = apply_packet(state, reps, &packet);
        state = new_state;
        reps = new_reps;
        pos += packet.len();
    }

    // End-of-stream marker: a "match" with the reserved all-ones distance.
    let num_pos_states = model.props.num_pos_states();
    let pos_state = pos & (num_pos_states - 1);
    let state_idx = state.value();
    rc.encode_bit(&mut model.is_match[state_idx][pos_state], 1)?;
    rc.encode_bit(&mut model.is_rep[state_idx], 0)?;
    encode_length(&mut rc, &mut model.match_len, MATCH_LEN_MIN as u32, pos_state)?;
    encode_distance(&mut rc, &mut model, END_MARKER_DIST, MATCH_LEN_MIN as u32)?;

    rc.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::decode;
    use rlzip_core::CompressionLevel;

    fn roundtrip(data: &[u8], opts: &EncoderOptions) -> Vec<u8> {
        let compressed = encode(data, opts, Vec::new()).unwrap();
        let mut out = Vec::new();
        decode(&compressed[..], opts.dict_size, &mut out).unwrap();
        out
    }

    #[test]
    fn test_options_from_level_cover_whole_range() {
        for level in 0..=9u8 {
            let opts = EncoderOptions::from_level(CompressionLevel::new(level));
            assert!(opts.dict_size >= 1 << 20);
            assert!((5..=273).contains(&opts.match_len_limit));
        }
    }

    #[test]
    fn test_roundtrip_empty() {
        let opts = EncoderOptions::from_level(CompressionLevel::DEFAULT);
        assert_eq!(roundtrip(b"", &opts), b"");
    }

    #[test]
    fn test_roundtrip_single_byte() {
        let opts = EncoderOptions::from_level(CompressionLevel::DEFAULT);
        assert_eq!(roundtrip(b"A", &opts), b"A");
    }

    #[test]
    fn test_roundtrip_hello() {
        let opts = EncoderOptions::from_level(CompressionLevel::DEFAULT);
        assert_eq!(roundtrip(b"hello\n", &opts), b"hello\n");
    }

    #[test]
    fn test_roundtrip_repetitive_fast_level() {
        let opts = EncoderOptions::from_level(CompressionLevel::new(0));
        let data = b"abcd".repeat(1 << 18);
        let compressed = encode(&data, &opts, Vec::new()).unwrap();
        assert!(compressed.len() <= 2048, "compressed to {} bytes", compressed.len());
        let mut out = Vec::new();
        decode(&compressed[..], opts.dict_size, &mut out).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_roundtrip_all_levels() {
        let data = b"The quick brown fox jumps over the lazy dog. ".repeat(20);
        for level in 0..=9u8 {
            let opts = EncoderOptions::from_level(CompressionLevel::new(level));
            assert_eq!(roundtrip(&data, &opts), data, "level {level} roundtrip failed");
        }
    }

    #[test]
    fn test_optimal_not_worse_than_fast_on_repetitive_data() {
        let data = b"mississippi river mississippi river mississippi river".repeat(4);
        let fast = encode(&data, &EncoderOptions::from_level(CompressionLevel::new(0)), Vec::new()).unwrap();
        let optimal = encode(&data, &EncoderOptions::from_level(CompressionLevel::new(9)), Vec::new()).unwrap();
        assert!(optimal.len() <= fast.len());
    }
}
