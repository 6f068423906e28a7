use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use std::io;

use property_chain::api::{self, AppState};
use property_chain::{Config, PropertyService};

#[actix_web::main]
async fn main() -> io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let config = Config::from_env();
    let service = PropertyService::open(&config).map_err(io::Error::other)?;
    if !service.is_chain_valid() {
        log::warn!("loaded chain failed validation; serving it as-is");
    }

    println!(
        "⛓️ Starting property ledger API at http://{}:{} (data: {}, difficulty: {})",
        config.host,
        config.port,
        config.data_dir.display(),
        config.difficulty
    );

    let state = web::Data::new(AppState::new(service));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
