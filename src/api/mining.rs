use actix_web::{HttpResponse, Responder, post, web};
use linkchain::chain::{DIFF_MAX, DIFF_MIN};
use linkchain::{Chain, Link};
use log::{error, info, warn};

use super::models::{AppState, MineRequest, MineResponse};

/// Build a link on the tip, mine and seal it off the lock, then append it
/// with verification if the tip has not moved in the meantime.
#[post("/mine/")]
pub async fn mine_link(state: web::Data<AppState>, req: web::Json<MineRequest>) -> impl Responder {
    let MineRequest { data, difficulty } = req.into_inner();
    let difficulty = difficulty.unwrap_or(state.difficulty);
    if !(DIFF_MIN..=DIFF_MAX).contains(&difficulty) {
        return HttpResponse::BadRequest().body(format!(
            "difficulty must be between {DIFF_MIN} and {DIFF_MAX}"
        ));
    }

    // Snapshot the tip; the search itself runs without the chain lock.
    let (candidate, tip_len) = {
        let chain = state.chain.lock().expect("mutex poisoned");
        (chain.build_link(difficulty, data), chain.len())
    };

    let sealed = web::block(move || {
        let mut link = candidate;
        link.mine();
        link.seal();
        link
    })
    .await;
    let link = match sealed {
        Ok(link) => link,
        Err(e) => {
            error!("MINER - worker failed: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let mut chain = state.chain.lock().expect("mutex poisoned");
    if tip_moved(&chain, tip_len, &link) {
        warn!("MINER - stale link #{}: tip moved while mining", link.index);
        return HttpResponse::Conflict().body("chain tip moved while mining, retry");
    }

    let resp = MineResponse {
        index: link.index,
        proof: link.proof,
        hash: link.hash.as_deref().map(hex::encode).unwrap_or_default(),
        difficulty,
    };
    match chain.append(true, [link]) {
        Ok(()) => {
            info!(
                "MINER - sealed link #{} (hash={}, proof={})",
                resp.index, resp.hash, resp.proof
            );
            HttpResponse::Ok().json(resp)
        }
        Err(e) => {
            // A smallest proof of 0 reads as unmined and is rejected here.
            warn!("MINER - append rejected: {e}");
            HttpResponse::Conflict().body(e.to_string())
        }
    }
}

/// Whether `chain` no longer ends where it did when `link` was built.
pub(super) fn tip_moved(chain: &Chain, tip_len: usize, link: &Link) -> bool {
    let tip_hash = chain.last().ok().and_then(|tip| tip.hash.as_ref());
    chain.len() != tip_len || tip_hash != link.parent().hash.as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sealed(mut link: Link) -> Link {
        link.mine();
        link.seal();
        link
    }

    #[test]
    fn tip_unchanged() {
        let mut chain = Chain::new();
        let first = sealed(chain.build_link(1, "One"));
        chain.append(true, [first]).unwrap();
        let candidate = sealed(chain.build_link(1, "Two"));
        assert!(!tip_moved(&chain, 1, &candidate));
    }

    #[test]
    fn append_while_mining_is_detected() {
        let mut chain = Chain::new();
        let candidate = sealed(chain.build_link(1, "late"));
        let first = sealed(chain.build_link(1, "first"));
        chain.append(true, [first]).unwrap();
        assert!(tip_moved(&chain, 0, &candidate));
    }
}
