use actix_web::{web, App, HttpServer};
use log::info;

use chess_game_server::routes::configure_routes;
use chess_game_server::{AppState, ServerConfig};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    info!("Starting chess web app server at http://{}", config.bind_addr);

    // Create shared application state
    let bind_addr = config.bind_addr.clone();
    let static_dir = config.static_dir.clone();
    let app_state = web::Data::new(AppState::new(config));

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(|cfg| configure_routes(cfg, &static_dir))
    })
    .bind(bind_addr)?
    .run()
    .await
}
