use chrono::{DateTime, Utc};
use log::debug;
use serde::{Serialize, Serializer};

use super::encoding::{self, LinkRecord};
use super::miner::{Miner, Sha256Miner};
use super::Hash;

/// Snapshot of the preceding link, taken when a link is built.
///
/// The default value is the genesis sentinel: no index (conceptually -1),
/// proof 0 and no hash. A link always has a parent, so nothing downstream
/// needs to special-case genesis beyond what the values already say.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parent {
    pub index: Option<u64>,
    pub proof: u64,
    pub hash: Option<Hash>,
}

impl Parent {
    /// The parent of a genesis link.
    pub fn sentinel() -> Self {
        Self::default()
    }

    /// Capture the current state of `link`.
    pub fn of<M>(link: &Link<M>) -> Self {
        Self {
            index: Some(link.index),
            proof: link.proof,
            hash: link.hash.clone(),
        }
    }

    pub fn next_index(&self) -> u64 {
        self.index.map_or(0, |i| i + 1)
    }

    pub fn is_mined(&self) -> bool {
        self.proof != 0
    }
}

/// A single record of the chain.
///
/// Lifecycle: built (`genesis` / `child_of`), mined (`mine`), sealed (`seal`),
/// then appended to a [`Chain`](super::Chain). Fields stay public; keeping a
/// stored link unchanged is up to the caller.
#[derive(Debug, Clone)]
pub struct Link<M = Sha256Miner> {
    pub index: u64,
    pub difficulty: u32,
    pub proof: u64, // 0 = not mined yet
    pub data: String,
    pub timestamp: DateTime<Utc>,
    pub hash: Option<Hash>, // Cached content hash
    parent: Parent,
    miner: M,
}

impl Link {
    /// Detached genesis link using SHA-256.
    pub fn genesis(difficulty: u32, data: impl Into<String>) -> Self {
        Self::genesis_with(Sha256Miner, difficulty, data)
    }
}

impl<M: Miner> Link<M> {
    /// Detached genesis link using the given strategy.
    pub fn genesis_with(miner: M, difficulty: u32, data: impl Into<String>) -> Self {
        Self::with_parent(miner, Parent::sentinel(), difficulty, data)
    }

    /// New unmined link on top of `parent`, sharing its strategy.
    pub fn child_of(parent: &Link<M>, difficulty: u32, data: impl Into<String>) -> Self
    where
        M: Clone,
    {
        Self::with_parent(parent.miner.clone(), Parent::of(parent), difficulty, data)
    }

    pub fn with_parent(miner: M, parent: Parent, difficulty: u32, data: impl Into<String>) -> Self {
        Self {
            index: parent.next_index(),
            difficulty,
            proof: 0,
            data: data.into(),
            timestamp: Utc::now(),
            hash: None,
            parent,
            miner,
        }
    }

    pub fn parent(&self) -> &Parent {
        &self.parent
    }

    pub fn miner(&self) -> &M {
        &self.miner
    }

    /// Search for a proof against the parent's proof and record it.
    /// Does not return until one is found.
    pub fn mine(&mut self) -> u64 {
        let proof = self.miner.mine(self.parent.proof, self.difficulty);
        debug!(
            "MINER - link #{} solved (proof={}, difficulty={})",
            self.index, proof, self.difficulty
        );
        self.proof = proof;
        proof
    }

    /// Re-read the parent's index, proof and hash from `parent` as it is now.
    /// A link built before its parent was mined picks up the real values here.
    pub fn refresh_parent(&mut self, parent: &Link<M>) {
        self.parent = Parent::of(parent);
    }

    /// [`mine`](Self::mine) against the current state of `parent`.
    pub fn mine_after(&mut self, parent: &Link<M>) -> u64 {
        self.refresh_parent(parent);
        self.mine()
    }

    /// [`seal`](Self::seal) with the current hash of `parent` as `parent_hash`.
    pub fn seal_after(&mut self, parent: &Link<M>) -> Hash {
        self.refresh_parent(parent);
        self.seal()
    }

    pub fn validate_proof(&self, candidate: u64) -> bool {
        self.miner
            .validate_proof(self.parent.proof, candidate, self.difficulty)
    }

    pub fn is_valid_proof(&self) -> bool {
        self.validate_proof(self.proof)
    }

    /// Mined means a non-zero proof. A genuine proof of 0 reads as unmined.
    pub fn is_mined(&self) -> bool {
        self.proof != 0
    }

    /// Serialized record, including the stored hash.
    pub fn encode(&self) -> Vec<u8> {
        self.encode_with(self.hash.as_deref())
    }

    /// Content hash of this link with its own hash field treated as absent.
    /// Never touches stored state.
    pub fn compute_hash(&self) -> Hash {
        self.miner.digest(&self.encode_with(None))
    }

    /// Compute the content hash and store it.
    pub fn seal(&mut self) -> Hash {
        let sum = self.compute_hash();
        self.hash = Some(sum.clone());
        sum
    }

    /// Validate against the parent snapshot recorded at construction.
    pub fn is_valid(&self) -> bool {
        self.linkage_holds(&self.parent) && self.is_intact()
    }

    /// Validate against an actual parent link as it is now, which also
    /// catches a parent that changed after this link was built.
    pub fn is_valid_after(&self, parent: &Link<M>) -> bool {
        self.linkage_holds(&Parent::of(parent)) && self.is_intact()
    }

    fn linkage_holds(&self, actual: &Parent) -> bool {
        // Nothing to link against until the parent has been mined.
        if !actual.is_mined() {
            return true;
        }
        actual.next_index() == self.index
            && actual.hash == self.parent.hash
            && self
                .miner
                .validate_proof(actual.proof, self.proof, self.difficulty)
    }

    fn is_intact(&self) -> bool {
        let expected = self.compute_hash();
        self.hash.as_deref() == Some(expected.as_slice()) && self.is_mined()
    }

    fn encode_with(&self, hash: Option<&[u8]>) -> Vec<u8> {
        encoding::to_vec(&self.record(hash)).expect("link record serializes")
    }

    fn record<'a>(&'a self, hash: Option<&'a [u8]>) -> LinkRecord<'a> {
        LinkRecord {
            parent_hash: self.parent.hash.as_deref(),
            hash,
            index: self.index,
            pow: self.proof,
            difficulty: self.difficulty,
            data: &self.data,
            timestamp: &self.timestamp,
        }
    }
}

impl<M: Miner> Serialize for Link<M> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.record(self.hash.as_deref()).serialize(serializer)
    }
}
