use actix_web::{HttpResponse, Responder, get, web};

use super::models::{AppState, HealthResponse};

/// Liveness plus the current chain length. Does not validate.
#[get("/health/")]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let links = state.chain.lock().expect("mutex poisoned").len();
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        links,
        difficulty: state.difficulty,
    })
}
