//! Minimal hash-linked ledger: links bound to their parent by a
//! proof-of-work puzzle and a content hash.

pub mod chain;

pub use chain::{Chain, ChainError, ChainResult, Link, Miner, Sha256Miner};
