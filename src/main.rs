use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::io;

use tasktrack::config::{Config, Profile};
use tasktrack::routes::{self, health};
use tasktrack::AppState;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| {
        log::error!("configuration error: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;
    if config.profile == Profile::Development {
        log::warn!("running with the development profile");
    }

    let state = AppState::from_config(&config).map_err(|e| {
        log::error!("failed to initialise services: {}", e);
        io::Error::new(io::ErrorKind::Other, e.to_string())
    })?;

    log::info!(
        "Starting tasktrack server at {} ({:?} profile, token ttl {}h)",
        config.server_url(),
        config.profile,
        state.tokens.ttl().num_hours()
    );

    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .configure(|cfg| state.configure(cfg))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .service(web::scope("/api").configure(routes::config))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
