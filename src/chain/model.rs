use log::{debug, warn};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use super::encoding;
use super::error::{ChainError, ChainResult};
use super::link::{Link, Parent};
use super::miner::{Miner, Sha256Miner};
use super::Hash;

/// In-memory, insertion-ordered chain of links.
#[derive(Debug, Clone, Default)]
pub struct Chain<M = Sha256Miner> {
    links: Vec<Link<M>>,
    miner: M,
}

impl Chain {
    /// Empty chain using SHA-256.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<M: Miner + Clone> Chain<M> {
    /// Empty chain whose new links use `miner`.
    pub fn with_miner(miner: M) -> Self {
        Self {
            links: Vec::new(),
            miner,
        }
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Link<M>> {
        self.links.iter()
    }

    pub fn get(&self, index: usize) -> ChainResult<&Link<M>> {
        self.links.get(index).ok_or_else(|| self.out_of_range(index))
    }

    fn out_of_range(&self, index: usize) -> ChainError {
        ChainError::IndexOutOfRange {
            index: i64::try_from(index).unwrap_or(i64::MAX),
            length: self.len(),
        }
    }

    pub fn previous(&self, index: usize) -> ChainResult<&Link<M>> {
        match index.checked_sub(1) {
            Some(i) => self.get(i),
            None => Err(ChainError::IndexOutOfRange {
                index: -1,
                length: self.len(),
            }),
        }
    }

    pub fn next(&self, index: usize) -> ChainResult<&Link<M>> {
        self.get(index.saturating_add(1))
    }

    pub fn first(&self) -> ChainResult<&Link<M>> {
        self.links.first().ok_or(ChainError::EmptyChain)
    }

    pub fn last(&self) -> ChainResult<&Link<M>> {
        self.links.last().ok_or(ChainError::EmptyChain)
    }

    /// Unmined link on top of the current tip (or a genesis link when the
    /// chain is empty). The link is not appended.
    pub fn build_link(&self, difficulty: u32, data: impl Into<String>) -> Link<M> {
        match self.links.last() {
            Some(tip) => Link::child_of(tip, difficulty, data),
            None => Link::with_parent(self.miner.clone(), Parent::sentinel(), difficulty, data),
        }
    }

    /// Mine the stored link at `index` against the link stored before it.
    ///
    /// # Errors
    ///
    /// [`ChainError::IndexOutOfRange`] when there is no link at `index`.
    pub fn mine_at(&mut self, index: usize) -> ChainResult<u64> {
        Ok(self.with_current_parent(index)?.mine())
    }

    /// Seal the stored link at `index` against the link stored before it.
    ///
    /// # Errors
    ///
    /// [`ChainError::IndexOutOfRange`] when there is no link at `index`.
    pub fn seal_at(&mut self, index: usize) -> ChainResult<Hash> {
        Ok(self.with_current_parent(index)?.seal())
    }

    /// Mutable access to a stored link whose parent snapshot has been
    /// refreshed from its stored predecessor. The first link keeps its own.
    fn with_current_parent(&mut self, index: usize) -> ChainResult<&mut Link<M>> {
        if index >= self.links.len() {
            return Err(self.out_of_range(index));
        }
        let (before, rest) = self.links.split_at_mut(index);
        let link = &mut rest[0];
        if let Some(parent) = before.last() {
            link.refresh_parent(parent);
        }
        Ok(link)
    }

    /// Append `links` in order.
    ///
    /// With `verify`, every link must pass [`Link::is_valid`]; the first
    /// failure rejects the whole batch. Without `verify` the links are
    /// stored as given, to be mined and sealed in place later.
    ///
    /// # Errors
    ///
    /// [`ChainError::InvalidLink`] with the batch position of the first
    /// link that failed; the chain is left unchanged.
    pub fn append<I>(&mut self, verify: bool, links: I) -> ChainResult<()>
    where
        I: IntoIterator<Item = Link<M>>,
    {
        let batch: Vec<Link<M>> = links.into_iter().collect();

        if verify {
            if let Some(position) = batch.iter().position(|link| !link.is_valid()) {
                warn!(
                    "CHAIN - rejected batch of {} at position {} (index={})",
                    batch.len(),
                    position,
                    batch[position].index
                );
                return Err(ChainError::InvalidLink { position });
            }
        }

        debug!(
            "CHAIN - appended {} link(s) (verified={}, length={})",
            batch.len(),
            verify,
            self.links.len() + batch.len()
        );
        self.links.extend(batch);
        Ok(())
    }

    /// Whether every stored link is valid on its own, in storage order.
    pub fn is_valid(&self) -> bool {
        match self.links.iter().position(|link| !link.is_valid()) {
            Some(position) => {
                debug!("CHAIN - invalid link at position {position}");
                false
            }
            None => true,
        }
    }

    /// Stricter than [`is_valid`](Self::is_valid): every link after the
    /// first must also validate against the link actually stored before it,
    /// so a detached link or a rewritten and resealed predecessor fails.
    pub fn is_linked(&self) -> bool {
        let Some(first) = self.links.first() else {
            return true;
        };
        if !first.is_valid() {
            debug!("CHAIN - invalid link at position 0");
            return false;
        }
        for (offset, pair) in self.links.windows(2).enumerate() {
            if !pair[1].is_valid_after(&pair[0]) {
                debug!("CHAIN - link at position {} does not follow its predecessor", offset + 1);
                return false;
            }
        }
        true
    }

    /// Two links are the same when their stored content hashes match.
    pub fn is_same_link(&self, a: &Link<M>, b: &Link<M>) -> bool {
        a.hash == b.hash
    }

    /// `{"blocks":[...]}` in the link record layout.
    pub fn encode(&self) -> Vec<u8> {
        encoding::to_vec(self).expect("chain record serializes")
    }
}

impl<M: Miner> Serialize for Chain<M> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Chain", 1)?;
        state.serialize_field("blocks", &self.links)?;
        state.end()
    }
}

impl<'a, M> IntoIterator for &'a Chain<M> {
    type Item = &'a Link<M>;
    type IntoIter = std::slice::Iter<'a, Link<M>>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}
