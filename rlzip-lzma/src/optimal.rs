//! Optimal (price-driven) parsing.
//!
//! Greedy parsing takes the first acceptable match at each position; optimal
//! parsing instead looks at every literal/rep/match edge reachable within a
//! bounded window and picks the cheapest path through it, in the price units
//! defined by [`crate::price`]. The window for one round of planning is
//! bounded by the longest single candidate found at the starting position
//! (a match or a rep), which both keeps the search small and guarantees the
//! forward fill always reaches the end of the window by at least that one
//! edge.

use crate::match_finder::MatchFinder;
use crate::model::{LzmaModel, MATCH_LEN_MAX, MATCH_LEN_MIN, State};
use crate::price::{get_distance_price, get_length_price, get_price};
use std::collections::VecDeque;

/// Default "nice length": a match or rep at least this long is taken
/// immediately without planning further, same role as `nice_len` in the
/// reference encoder.
pub const NICE_LEN_DEFAULT: usize = 64;
/// Minimum nice length accepted by [`OptimalParser::new`].
pub const NICE_LEN_MIN: usize = 8;
/// Maximum nice length accepted by [`OptimalParser::new`].
pub const NICE_LEN_MAX: usize = MATCH_LEN_MAX;

/// One encoding decision: what to emit next and how many input bytes it
/// consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packet {
    /// A single literal byte.
    Literal(u8),
    /// A length-1 repeat of `rep[0]` encoded as is_rep0_long = 0.
    ShortRep,
    /// A repeat of one of the four most recent distances.
    Rep {
        /// Index into the rep-distance history (0-3).
        idx: u8,
        /// Match length.
        len: u32,
    },
    /// A match against a fresh (non-rep) distance.
    Match {
        /// 0-based back distance.
        dist: u32,
        /// Match length.
        len: u32,
    },
}

impl Packet {
    /// Number of input bytes this packet consumes.
    pub fn len(&self) -> usize {
        match *self {
            Packet::Literal(_) | Packet::ShortRep => 1,
            Packet::Rep { len, .. } | Packet::Match { len, .. } => len as usize,
        }
    }
}

/// Apply a packet's state/rep-history transition, shared by the planner and
/// the encoder so the two can never disagree about what a packet means.
pub fn apply_packet(mut state: State, mut reps: [u32; 4], packet: &Packet) -> (State, [u32; 4]) {
    match *packet {
        Packet::Literal(_) => state.update_literal(),
        Packet::ShortRep => state.update_short_rep(),
        Packet::Rep { idx, .. } => {
            let d = reps[idx as usize];
            for j in (1..=idx as usize).rev() {
                reps[j] = reps[j - 1];
            }
            reps[0] = d;
            state.update_long_rep();
        }
        Packet::Match { dist, .. } => {
            reps[3] = reps[2];
            reps[2] = reps[1];
            reps[1] = reps[0];
            reps[0] = dist;
            state.update_match();
        }
    }
    (state, reps)
}

fn match_len_at(data: &[u8], pos: usize, match_pos: usize, max_len: usize) -> usize {
    let mut len = 0;
    while len < max_len && data[pos + len] == data[match_pos + len] {
        len += 1;
    }
    len
}

fn rep_len_at(data: &[u8], pos: usize, dist: u32, max_len: usize) -> usize {
    let dist = dist as usize;
    if dist >= pos {
        return 0;
    }
    match_len_at(data, pos, pos - dist - 1, max_len)
}

fn literal_price_normal(probs: &[u16; 0x300], byte: u8) -> u32 {
    let mut symbol = (byte as usize) | 0x100;
    let mut context = 1usize;
    let mut price = 0u32;

    loop {
        let bit = ((symbol >> 7) & 1) as u32;
        symbol <<= 1;
        price += get_price(probs[context], bit);
        context = (context << 1) | bit as usize;
        if context >= 0x100 {
            break;
        }
    }

    price
}

fn literal_price_matched(probs: &[u16; 0x300], byte: u8, match_byte: u8) -> u32 {
    let mut symbol = (byte as usize) | 0x100;
    let mut match_symbol = (match_byte as usize) << 1;
    let mut context = 1usize;
    let mut price = 0u32;

    loop {
        let match_bit = (match_symbol >> 8) & 1;
        match_symbol <<= 1;

        let bit = ((symbol >> 7) & 1) as u32;
        symbol <<= 1;

        price += get_price(probs[0x100 + (match_bit << 8) + context], bit);
        context = (context << 1) | bit as usize;

        if context >= 0x100 {
            break;
        }

        if bit as usize != match_bit {
            while context < 0x100 {
                let bit = ((symbol >> 7) & 1) as u32;
                symbol <<= 1;
                price += get_price(probs[context], bit);
                context = (context << 1) | bit as usize;
            }
            break;
        }
    }

    price
}

#[derive(Debug, Clone)]
struct Trial {
    price: u32,
    prev: usize,
    packet: Packet,
    state: State,
    reps: [u32; 4],
}

impl Trial {
    fn unreachable() -> Self {
        Self {
            price: u32::MAX,
            prev: 0,
            packet: Packet::Literal(0),
            state: State::new(),
            reps: [0; 4],
        }
    }
}

/// Plans a bounded-horizon cheapest path through literal/rep/match edges,
/// one planning round at a time.
pub struct OptimalParser {
    nice_len: usize,
    match_len_limit: usize,
    trials: Vec<Trial>,
    pending: VecDeque<Packet>,
}

impl OptimalParser {
    /// Build a parser that takes dominant matches/reps of `nice_len` bytes
    /// or longer immediately, and otherwise plans within a window no wider
    /// than `match_len_limit`.
    pub fn new(nice_len: usize, match_len_limit: usize) -> Self {
        Self {
            nice_len: nice_len.clamp(NICE_LEN_MIN, NICE_LEN_MAX),
            match_len_limit: match_len_limit.clamp(MATCH_LEN_MIN, MATCH_LEN_MAX),
            trials: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    /// Nice-length threshold in effect.
    pub fn nice_len(&self) -> usize {
        self.nice_len
    }

    /// Return the next packet to emit at `pos`, running a fresh planning
    /// round against `mf`/`model` if the previous round's packets have all
    /// been consumed.
    ///
    /// `mf` must already have been queried for every position strictly
    /// before `pos` and not yet for `pos` itself - same invariant
    /// [`MatchFinder::insert_and_get_matches`] documents.
    pub fn next_packet(
        &mut self,
        data: &[u8],
        pos: usize,
        mf: &mut MatchFinder,
        model: &LzmaModel,
        state: State,
        reps: [u32; 4],
    ) -> Packet {
        if let Some(packet) = self.pending.pop_front() {
            return packet;
        }
        self.fill(data, pos, mf, model, state, reps);
        self.pending
            .pop_front()
            .expect("a planning round always yields at least one packet")
    }

    fn commit_single(&mut self, data: &[u8], pos: usize, mf: &mut MatchFinder, packet: Packet) {
        for k in 1..packet.len() {
            if pos + k < data.len() {
                mf.skip(data, pos + k);
            }
        }
        self.pending.push_back(packet);
    }

    fn fill(
        &mut self,
        data: &[u8],
        pos: usize,
        mf: &mut MatchFinder,
        model: &LzmaModel,
        state: State,
        reps: [u32; 4],
    ) {
        let remaining = data.len() - pos;
        debug_assert!(remaining > 0);
        let limit = remaining.min(self.match_len_limit);

        let matches0 = mf.insert_and_get_matches(data, pos, limit);
        let longest0 = matches0.last().copied();

        let mut rep_lens0 = [0usize; 4];
        for (idx, &d) in reps.iter().enumerate() {
            rep_lens0[idx] = rep_len_at(data, pos, d, limit);
        }
        let best_rep0 = rep_lens0
            .iter()
            .enumerate()
            .filter(|&(_, &l)| l >= MATCH_LEN_MIN)
            .max_by_key(|&(_, &l)| l)
            .map(|(idx, &l)| (idx as u8, l as u32));

        // Dominant-candidate shortcut: a very long match or rep is always
        // worth taking without spending a planning round on it.
        if let Some((idx, len)) = best_rep0 {
            if len as usize >= self.nice_len {
                self.commit_single(data, pos, mf, Packet::Rep { idx, len });
                return;
            }
        }
        if let Some(m) = longest0 {
            if m.len as usize >= self.nice_len {
                self.commit_single(data, pos, mf, Packet::Match { dist: m.dist, len: m.len });
                return;
            }
        }

        let horizon = longest0
            .map(|m| m.len as usize)
            .unwrap_or(0)
            .max(best_rep0.map(|(_, len)| len as usize).unwrap_or(0))
            .max(1)
            .min(limit);

        if self.trials.len() < horizon + 1 {
            self.trials.resize(horizon + 1, Trial::unreachable());
        }
        for t in &mut self.trials[..=horizon] {
            *t = Trial::unreachable();
        }
        self.trials[0] = Trial {
            price: 0,
            prev: 0,
            packet: Packet::Literal(0),
            state,
            reps,
        };

        let num_pos_states = model.props.num_pos_states();

        for i in 0..horizon {
            let matches_i = if i == 0 {
                matches0.clone()
            } else {
                mf.insert_and_get_matches(data, pos + i, limit - i)
            };

            if self.trials[i].price == u32::MAX {
                continue;
            }

            let cur = self.trials[i].clone();
            let cur_pos = pos + i;
            let pos_state = cur_pos & (num_pos_states - 1);
            let state_idx = cur.state.value();
            let is_match_price0 = get_price(model.is_match[state_idx][pos_state], 0);
            let is_match_price1 = get_price(model.is_match[state_idx][pos_state], 1);

            // Literal.
            {
                let lit_state = model.literal.get_state(
                    cur_pos as u64,
                    if cur_pos == 0 { 0 } else { data[cur_pos - 1] },
                    model.props.lc,
                    model.props.lp,
                );
                let probs = &model.literal.probs[lit_state];
                let byte = data[cur_pos];
                let lit_price = if cur.state.is_literal() {
                    literal_price_normal(probs, byte)
                } else {
                    let match_byte = if (cur.reps[0] as usize) < cur_pos {
                        data[cur_pos - cur.reps[0] as usize - 1]
                    } else {
                        0
                    };
                    literal_price_matched(probs, byte, match_byte)
                };
                let price = cur.price + is_match_price0 + lit_price;
                let packet = Packet::Literal(byte);
                let (state, reps) = apply_packet(cur.state, cur.reps, &packet);
                self.relax(i + 1, price, i, packet, state, reps);
            }

            // Short rep (length 1, rep0 only).
            if rep_len_at(data, cur_pos, cur.reps[0], 1) == 1 {
                let price = cur.price
                    + is_match_price1
                    + get_price(model.is_rep[state_idx], 1)
                    + get_price(model.is_rep0[state_idx], 0)
                    + get_price(model.is_rep0_long[state_idx][pos_state], 0);
                let packet = Packet::ShortRep;
                let (state, reps) = apply_packet(cur.state, cur.reps, &packet);
                self.relax(i + 1, price, i, packet, state, reps);
            }

            // Rep matches (length >= 2).
            let rep_budget = (horizon - i).min(limit - i);
            for ridx in 0..4usize {
                let max_len = rep_len_at(data, cur_pos, cur.reps[ridx], rep_budget);
                if max_len < MATCH_LEN_MIN {
                    continue;
                }
                let mut rep_bits = is_match_price1 + get_price(model.is_rep[state_idx], 1);
                rep_bits += if ridx == 0 {
                    get_price(model.is_rep0[state_idx], 0) + get_price(model.is_rep0_long[state_idx][pos_state], 1)
                } else {
                    let mut b = get_price(model.is_rep0[state_idx], 1);
                    b += if ridx == 1 {
                        get_price(model.is_rep1[state_idx], 0)
                    } else {
                        get_price(model.is_rep1[state_idx], 1)
                            + get_price(model.is_rep2[state_idx], if ridx == 2 { 0 } else { 1 })
                    };
                    b
                };

                let len = max_len as u32;
                let len_price = get_length_price(&model.rep_len, len, pos_state);
                let price = cur.price + rep_bits + len_price;
                let packet = Packet::Rep { idx: ridx as u8, len };
                let (state, reps) = apply_packet(cur.state, cur.reps, &packet);
                self.relax(i + len as usize, price, i, packet, state, reps);
            }

            // Normal (non-rep) matches.
            let match_bits = is_match_price1 + get_price(model.is_rep[state_idx], 0);
            for m in &matches_i {
                let len = (m.len as usize).min(horizon - i) as u32;
                if (len as usize) < MATCH_LEN_MIN {
                    continue;
                }
                let len_price = get_length_price(&model.match_len, len, pos_state);
                let dist_price = get_distance_price(
                    &model.distance.slot,
                    &model.distance.special,
                    &model.distance.align,
                    m.dist,
                    len,
                );
                let price = cur.price + match_bits + len_price + dist_price;
                let packet = Packet::Match { dist: m.dist, len };
                let (state, reps) = apply_packet(cur.state, cur.reps, &packet);
                self.relax(i + len as usize, price, i, packet, state, reps);
            }
        }

        debug_assert!(self.trials[horizon].price != u32::MAX);

        let mut forward = Vec::new();
        let mut idx = horizon;
        while idx > 0 {
            let t = &self.trials[idx];
            forward.push(t.packet);
            idx = t.prev;
        }
        forward.reverse();
        self.pending.extend(forward);
    }

    fn relax(&mut self, idx: usize, price: u32, prev: usize, packet: Packet, state: State, reps: [u32; 4]) {
        if price < self.trials[idx].price {
            self.trials[idx] = Trial { price, prev, packet, state, reps };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LzmaProperties;

    #[test]
    fn test_packet_len() {
        assert_eq!(Packet::Literal(b'x').len(), 1);
        assert_eq!(Packet::ShortRep.len(), 1);
        assert_eq!(Packet::Rep { idx: 0, len: 5 }.len(), 5);
        assert_eq!(Packet::Match { dist: 3, len: 10 }.len(), 10);
    }

    #[test]
    fn test_apply_packet_match_shifts_reps() {
        let (state, reps) = apply_packet(State::new(), [1, 2, 3, 4], &Packet::Match { dist: 9, len: 4 });
        assert_eq!(reps, [9, 1, 2, 3]);
        assert!(!state.is_literal());
    }

    #[test]
    fn test_apply_packet_rep2_rotates() {
        let (_, reps) = apply_packet(State::new(), [1, 2, 3, 4], &Packet::Rep { idx: 2, len: 4 });
        assert_eq!(reps, [3, 1, 2, 4]);
    }

    #[test]
    fn test_plan_literal_run_on_incompressible_data() {
        let data = b"the quick brown fox";
        let model = LzmaModel::new(LzmaProperties::default());
        let mut mf = MatchFinder::hash_chain(data.len(), 1 << 16, 32);
        let mut parser = OptimalParser::new(NICE_LEN_DEFAULT, MATCH_LEN_MAX);

        let mut state = State::new();
        let mut reps = [0u32; 4];
        let mut pos = 0;
        let mut out = Vec::new();
        while pos < data.len() {
            let packet = parser.next_packet(data, pos, &mut mf, &model, state, reps);
            out.push(packet);
            let (s, r) = apply_packet(state, reps, &packet);
            state = s;
            reps = r;
            pos += packet.len();
        }
        let total: usize = out.iter().map(|p| p.len()).sum();
        assert_eq!(total, data.len());
    }

    #[test]
    fn test_plan_finds_match_on_repeat() {
        let data = b"abcdefgh abcdefgh abcdefgh";
        let model = LzmaModel::new(LzmaProperties::default());
        let mut mf = MatchFinder::hash_chain(data.len(), 1 << 16, 32);
        let mut parser = OptimalParser::new(NICE_LEN_DEFAULT, MATCH_LEN_MAX);

        let mut state = State::new();
        let mut reps = [0u32; 4];
        let mut pos = 0;
        let mut saw_match_or_rep = false;
        while pos < data.len() {
            let packet = parser.next_packet(data, pos, &mut mf, &model, state, reps);
            if matches!(packet, Packet::Match { .. } | Packet::Rep { .. }) {
                saw_match_or_rep = true;
            }
            let (s, r) = apply_packet(state, reps, &packet);
            state = s;
            reps = r;
            pos += packet.len();
        }
        assert!(saw_match_or_rep);
    }
}
