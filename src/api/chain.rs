use actix_web::{HttpResponse, Responder, get, web};

use super::models::{AppState, ChainResponse, ValidateResponse};

/// Get the full chain.
#[get("/chain/")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    let chain = state.chain.lock().expect("mutex poisoned");
    let resp = ChainResponse {
        length: chain.len(),
        valid: chain.is_valid(),
        chain: &chain,
    };
    HttpResponse::Ok().json(resp)
}

/// Get a single link by position.
#[get("/chain/{index}/")]
pub async fn get_link(state: web::Data<AppState>, path: web::Path<usize>) -> impl Responder {
    let chain = state.chain.lock().expect("mutex poisoned");
    match chain.get(path.into_inner()) {
        Ok(link) => HttpResponse::Ok().json(link),
        Err(e) => HttpResponse::NotFound().body(e.to_string()),
    }
}

/// Validate the whole chain.
#[get("/validate/")]
pub async fn validate_chain(state: web::Data<AppState>) -> impl Responder {
    let chain = state.chain.lock().expect("mutex poisoned");
    HttpResponse::Ok().json(ValidateResponse {
        valid: chain.is_valid(),
        linked: chain.is_linked(),
        length: chain.len(),
    })
}
