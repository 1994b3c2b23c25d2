//! Binary-tree match finder (§4.5, levels 5-9).
//!
//! Each position is inserted as a node of a binary search tree keyed by the
//! bytes starting at that position, maintained incrementally: inserting a
//! new position walks down from the hash bucket's root, splitting the
//! existing chain into a "shorter than new node" branch and a "longer"
//! branch as it goes, the classic `BT4`-style insert used by the LZMA SDK.
//! Unlike that SDK this keeps the whole input in memory, so tree nodes are
//! addressed directly by absolute position instead of a cyclic buffer index
//! - the dictionary-size cutoff is still enforced by distance, it just
//! doesn't need modular arithmetic to find it.

use super::MatchCandidate;
use crate::model::MATCH_LEN_MIN;

const HASH_BITS: u32 = 16;
const HASH_SIZE: usize = 1 << HASH_BITS;
const NIL: u32 = u32::MAX;

fn hash3(data: &[u8]) -> usize {
    let mut h = 0x811c_9dc5u32;
    h ^= data[0] as u32;
    h = h.wrapping_mul(0x0100_0193);
    h ^= data[1] as u32;
    h = h.wrapping_mul(0x0100_0193);
    h ^= data[2] as u32;
    h = h.wrapping_mul(0x0100_0193);
    (h as usize) & (HASH_SIZE - 1)
}

/// Binary-tree matcher, used for levels 5-9.
pub struct BinaryTreeMatchFinder {
    dict_size: usize,
    nice_len: usize,
    depth_limit: usize,
    hash_head: Vec<u32>,
    /// `son[pos] = [left_child, right_child]`, `NIL` for absent.
    son: Vec<[u32; 2]>,
}

impl BinaryTreeMatchFinder {
    /// Build a matcher over an input of `data_len` bytes.
    pub fn new(data_len: usize, dict_size: usize, nice_len: usize, depth_limit: usize) -> Self {
        Self {
            dict_size: dict_size.max(1),
            nice_len: nice_len.max(MATCH_LEN_MIN),
            depth_limit: depth_limit.max(1),
            hash_head: vec![NIL; HASH_SIZE],
            son: vec![[NIL, NIL]; data_len],
        }
    }

    pub(super) fn insert_and_get_matches(
        &mut self,
        data: &[u8],
        pos: usize,
        match_len_limit: usize,
    ) -> Vec<MatchCandidate> {
        let mut matches = Vec::new();
        let max_len = (data.len() - pos).min(match_len_limit);
        if max_len < 3 {
            return matches;
        }

        let hash = hash3(&data[pos..]);
        let mut cur_match = self.hash_head[hash];
        self.hash_head[hash] = pos as u32;

        // Insertion points: the right child of the last node visited on the
        // "data here sorts before pos" side, and the left child of the last
        // node visited on the "sorts after pos" side.
        let mut left_node = pos;
        let mut right_node = pos;
        let mut len_left = 0usize;
        let mut len_right = 0usize;
        let mut best_len = MATCH_LEN_MIN - 1;
        let mut depth = self.depth_limit;

        loop {
            let cm = cur_match;
            if cm == NIL || depth == 0 {
                self.son[left_node][1] = NIL;
                self.son[right_node][0] = NIL;
                break;
            }
            depth -= 1;

            let cand = cm as usize;
            let dist = pos - cand;
            if dist > self.dict_size {
                self.son[left_node][1] = NIL;
                self.son[right_node][0] = NIL;
                break;
            }

            let mut len = len_left.min(len_right);
            while len < max_len && data[cand + len] == data[pos + len] {
                len += 1;
            }

            if len > best_len {
                best_len = len;
                matches.push(MatchCandidate {
                    len: len as u32,
                    dist: (dist - 1) as u32,
                });
                if len >= self.nice_len || len >= max_len {
                    self.son[left_node][1] = self.son[cand][1];
                    self.son[right_node][0] = self.son[cand][0];
                    break;
                }
            }

            if len >= max_len {
                self.son[left_node][1] = self.son[cand][1];
                self.son[right_node][0] = self.son[cand][0];
                break;
            }

            if data[cand + len] < data[pos + len] {
                self.son[left_node][1] = cm;
                left_node = cand;
                len_left = len;
                cur_match = self.son[cand][1];
            } else {
                self.son[right_node][0] = cm;
                right_node = cand;
                len_right = len;
                cur_match = self.son[cand][0];
            }
        }

        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_longest_and_ascending() {
        let data = b"mississippi mississippi mississippi";
        let mut mf = BinaryTreeMatchFinder::new(data.len(), 1 << 16, 32, 64);
        let mut longest_seen = 0u32;
        for pos in 0..data.len() {
            let matches = mf.insert_and_get_matches(data, pos, 273);
            for w in matches.windows(2) {
                assert!(w[0].len < w[1].len);
            }
            if let Some(m) = matches.last() {
                longest_seen = longest_seen.max(m.len);
            }
        }
        assert!(longest_seen >= 12);
    }

    #[test]
    fn test_no_self_match() {
        let data = b"abcdefgh";
        let mut mf = BinaryTreeMatchFinder::new(data.len(), 1 << 16, 32, 64);
        let matches = mf.insert_and_get_matches(data, 0, 273);
        assert!(matches.is_empty());
    }
}
