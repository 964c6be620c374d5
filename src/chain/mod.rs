pub mod encoding;
pub mod error;
pub mod link;
pub mod miner;
pub mod model;

pub use error::{ChainError, ChainResult};
pub use link::{Link, Parent};
pub use miner::{Miner, Sha256Miner};
pub use model::Chain;

/// Digest bytes. Length depends on the [`Miner`] strategy (32 for SHA-256).
pub type Hash = Vec<u8>;

/// Difficulty used by the host when none is configured.
pub const DEFAULT_DIFFICULTY: u32 = 2;

/// Difficulty bounds accepted by the host. Difficulty 0 always mines proof 0,
/// which never counts as mined.
pub const DIFF_MIN: u32 = 1;
pub const DIFF_MAX: u32 = 5;
