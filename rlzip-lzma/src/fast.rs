//! Greedy (non-optimal) packet planner, used at the fast end of the
//! compression-level range where the cost of price-driven planning isn't
//! worth paying.
//!
//! Unlike [`crate::optimal::OptimalParser`] this makes an irrevocable choice
//! at every position: take the first acceptable match, preferring a rep
//! match over a fresh distance unless the fresh match is meaningfully
//! longer, otherwise emit a literal.

use crate::match_finder::MatchFinder;
use crate::model::MATCH_LEN_MIN;
use crate::optimal::Packet;

/// Smallest length at which a fresh (non-rep) match is considered at all -
/// anything shorter rarely earns back its distance-encoding overhead.
const MIN_NORMAL_MATCH_LEN: usize = MATCH_LEN_MIN;

/// A match is only preferred over an equal-or-shorter rep match if it beats
/// the rep length by more than this margin, since encoding a fresh distance
/// costs more bits than reusing one already in the rep history.
const REP_PREFERENCE_MARGIN: usize = 2;

fn rep_match_len(data: &[u8], pos: usize, dist: u32, max_len: usize) -> usize {
    let dist = dist as usize;
    if dist >= pos {
        return 0;
    }
    let start = pos - dist - 1;
    let mut len = 0;
    while len < max_len && data[pos + len] == data[start + len] {
        len += 1;
    }
    len
}

/// Greedy planner sharing the [`Packet`] vocabulary with the optimal parser
/// so both can feed the same encoder loop.
pub struct FastParser {
    match_len_limit: usize,
}

impl FastParser {
    /// Build a planner that never proposes matches longer than
    /// `match_len_limit`.
    pub fn new(match_len_limit: usize) -> Self {
        Self { match_len_limit }
    }

    /// Decide the next packet at `pos`, inserting `pos` into `mf`.
    ///
    /// Same call-order requirement as [`crate::optimal::OptimalParser::next_packet`]:
    /// `mf` must not already have seen `pos`.
    pub fn next_packet(&mut self, data: &[u8], pos: usize, mf: &mut MatchFinder, reps: [u32; 4]) -> Packet {
        let remaining = data.len() - pos;
        let limit = remaining.min(self.match_len_limit);

        let mut best_rep: Option<(u8, usize)> = None;
        for (idx, &d) in reps.iter().enumerate() {
            let len = rep_match_len(data, pos, d, limit);
            if len >= MATCH_LEN_MIN && best_rep.is_none_or(|(_, l)| len > l) {
                best_rep = Some((idx as u8, len));
            }
        }

        let matches = mf.insert_and_get_matches(data, pos, limit);
        let best_match = matches.last().copied();

        match (best_rep, best_match) {
            (Some((0, 1)), _) => Packet::ShortRep,
            (Some((idx, rep_len)), Some(m))
                if rep_len + REP_PREFERENCE_MARGIN >= m.len as usize || rep_len >= m.len as usize =>
            {
                Packet::Rep { idx, len: rep_len as u32 }
            }
            (Some((idx, rep_len)), None) => Packet::Rep { idx, len: rep_len as u32 },
            (_, Some(m)) if m.len as usize >= MIN_NORMAL_MATCH_LEN => {
                Packet::Match { dist: m.dist, len: m.len }
            }
            _ => Packet::Literal(data[pos]),
        }
    }
}
