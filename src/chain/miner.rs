use sha2::{Digest, Sha256};

use super::Hash;

/// Puzzle and digest strategy carried by every [`Link`](super::Link).
///
/// The puzzle input is the decimal string of the parent's proof followed by
/// the decimal string of the candidate. Concatenated, not added.
pub trait Miner {
    /// Digest used both for the puzzle and for link content hashes.
    fn digest(&self, bytes: &[u8]) -> Hash;

    /// Check whether `candidate` solves the puzzle seeded by `parent_proof`.
    /// A difficulty of 0 accepts everything; a difficulty longer than the
    /// hex digest accepts nothing.
    fn validate_proof(&self, parent_proof: u64, candidate: u64, difficulty: u32) -> bool {
        let combined = format!("{parent_proof}{candidate}");
        let sum = hex::encode(self.digest(combined.as_bytes()));
        let want = difficulty as usize;
        sum.len() >= want && sum.bytes().take(want).all(|b| b == b'0')
    }

    /// Brute-force search from 0 upwards, returning the first valid proof.
    /// Blocks the calling thread until a solution is found.
    fn mine(&self, parent_proof: u64, difficulty: u32) -> u64 {
        let mut candidate = 0u64;
        while !self.validate_proof(parent_proof, candidate, difficulty) {
            candidate = candidate.wrapping_add(1);
        }
        candidate
    }
}

/// SHA-256 for both the puzzle and content hashes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sha256Miner;

impl Miner for Sha256Miner {
    fn digest(&self, bytes: &[u8]) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        hasher.finalize().to_vec()
    }
}
