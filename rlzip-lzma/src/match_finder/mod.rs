//! Sliding-window match finders shared by the fast and optimal encoders.
//!
//! The whole input is held in memory (the encoder is handed a `&[u8]` slice
//! rather than a blocking byte source), so the "window buffer" of §4.5 is
//! just that slice: a match finder indexes positions into it and enforces
//! the dictionary-size distance ceiling itself rather than managing its own
//! circular storage. This sidesteps the refill/look-ahead bookkeeping a
//! streaming matcher would need without changing the public contract below.

mod binary_tree;
mod hash_chain;

pub use binary_tree::BinaryTreeMatchFinder;
pub use hash_chain::HashChainMatchFinder;

/// A candidate back-reference found by a match finder.
///
/// `dist` is the 0-based distance used by the rest of the codec (an actual
/// back-reference of `dist + 1` bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchCandidate {
    /// Match length, at least [`crate::model::MATCH_LEN_MIN`].
    pub len: u32,
    /// 0-based back distance.
    pub dist: u32,
}

/// Either match-finder strategy behind one call surface, selected by
/// [`crate::EncoderOptions`] (levels 1-4 and the fast encoder get a hash
/// chain; levels 5-9 get a binary tree).
pub enum MatchFinder {
    /// Hash-chain matcher (§4.5, levels 1-4 and the fast encoder).
    HashChain(HashChainMatchFinder),
    /// Binary-tree matcher (§4.5, levels 5-9).
    BinaryTree(BinaryTreeMatchFinder),
}

impl MatchFinder {
    /// Build a hash-chain matcher over `data`, bounded to `dict_size` bytes
    /// of back-reference distance and scanning at most `chain_depth` chain
    /// links per position.
    pub fn hash_chain(data_len: usize, dict_size: usize, chain_depth: usize) -> Self {
        Self::HashChain(HashChainMatchFinder::new(data_len, dict_size, chain_depth))
    }

    /// Build a binary-tree matcher over `data`, bounded to `dict_size` bytes
    /// of back-reference distance, accepting matches of `nice_len` or longer
    /// immediately, and visiting at most `depth_limit` tree nodes per
    /// position.
    pub fn binary_tree(
        data_len: usize,
        dict_size: usize,
        nice_len: usize,
        depth_limit: usize,
    ) -> Self {
        Self::BinaryTree(BinaryTreeMatchFinder::new(
            data_len, dict_size, nice_len, depth_limit,
        ))
    }

    /// Record `data[pos..]` in the index and return every candidate match
    /// at `pos`, strictly increasing in length, each the shortest-distance
    /// candidate for its length, capped at `match_len_limit`.
    ///
    /// Must be called with `pos` values in strictly increasing order,
    /// exactly once per position - both matchers maintain per-position
    /// index state that depends on that sequencing.
    pub fn insert_and_get_matches(
        &mut self,
        data: &[u8],
        pos: usize,
        match_len_limit: usize,
    ) -> Vec<MatchCandidate> {
        match self {
            Self::HashChain(mf) => mf.insert_and_get_matches(data, pos, match_len_limit),
            Self::BinaryTree(mf) => mf.insert_and_get_matches(data, pos, match_len_limit),
        }
    }

    /// Record `data[pos..]` in the index without collecting matches - used
    /// by the fast encoder to keep the index current while skipping over
    /// bytes already consumed by an accepted match.
    pub fn skip(&mut self, data: &[u8], pos: usize) {
        match self {
            Self::HashChain(mf) => {
                mf.insert_and_get_matches(data, pos, 2);
            }
            Self::BinaryTree(mf) => {
                mf.insert_and_get_matches(data, pos, 2);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_chain_finds_repeat() {
        let data = b"abcdabcdabcd";
        let mut mf = MatchFinder::hash_chain(data.len(), 1 << 16, 32);
        for pos in 0..data.len() {
            let matches = mf.insert_and_get_matches(data, pos, 273);
            if pos == 4 {
                assert!(matches.iter().any(|m| m.dist == 3 && m.len >= 4));
            }
        }
    }

    #[test]
    fn test_binary_tree_finds_repeat() {
        let data = b"abcdabcdabcd";
        let mut mf = MatchFinder::binary_tree(data.len(), 1 << 16, 64, 32);
        for pos in 0..data.len() {
            let matches = mf.insert_and_get_matches(data, pos, 273);
            if pos == 4 {
                assert!(matches.iter().any(|m| m.dist == 3 && m.len >= 4));
            }
        }
    }

    #[test]
    fn test_matches_respect_dict_size() {
        let mut data = vec![b'x'; 10];
        data.extend_from_slice(b"NEEDLE");
        data.extend(vec![b'y'; 100]);
        data.extend_from_slice(b"NEEDLE");

        let mut mf = MatchFinder::hash_chain(data.len(), 8, 64);
        for pos in 0..data.len() {
            let matches = mf.insert_and_get_matches(&data, pos, 273);
            // the second "NEEDLE" is ~106 bytes back, well beyond dict_size=8
            if pos == 116 {
                assert!(matches.iter().all(|m| m.dist < 8));
            }
        }
    }
}
