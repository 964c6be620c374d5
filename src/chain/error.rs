/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// Errors returned by [`Chain`](super::Chain) lookups and appends.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    /// Lookup outside `0..length`. `index` is signed so `previous(0)` can report -1.
    #[error("no link at index {index} (chain length {length})")]
    IndexOutOfRange { index: i64, length: usize },

    /// `first`/`last` on a chain with no links.
    #[error("chain is empty")]
    EmptyChain,

    /// A verified append was rejected; nothing from the batch was stored.
    #[error("link at batch position {position} is not valid")]
    InvalidLink { position: usize },
}
