mod api;
mod config;

use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::info;

use api::AppState;
use config::HostConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let HostConfig {
        host,
        port,
        difficulty,
    } = HostConfig::from_env();
    info!("linkchain host listening on http://{host}:{port} (difficulty={difficulty})");

    let state = web::Data::new(AppState::new(difficulty));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
