use linkchain::Chain;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Shared host state: one in-memory chain and the default difficulty for new links.
pub struct AppState {
    pub chain: Mutex<Chain>,
    pub difficulty: u32,
}

impl AppState {
    pub fn new(difficulty: u32) -> Self {
        Self {
            chain: Mutex::new(Chain::new()),
            difficulty,
        }
    }
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub links: usize,
    pub difficulty: u32,
}

#[derive(Serialize)]
pub struct ChainResponse<'a> {
    pub length: usize,
    pub valid: bool,
    pub chain: &'a Chain,
}

#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    /// Every link also follows the link stored before it.
    pub linked: bool,
    pub length: usize,
}

/* ---------- Mining API Models ---------- */

#[derive(Deserialize)]
pub struct MineRequest {
    pub data: String,
    /// Falls back to the host difficulty.
    pub difficulty: Option<u32>,
}

#[derive(Serialize)]
pub struct MineResponse {
    pub index: u64,
    pub proof: u64,
    pub hash: String, // hex
    pub difficulty: u32,
}
