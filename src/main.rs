use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;

use taskboard::auth::{AuthGate, TokenService};
use taskboard::config::Config;
use taskboard::error::ErrorEnvelope;
use taskboard::routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    let tokens = TokenService::new(&config.jwt_secret, config.token_ttl_hours);

    log::info!("starting server at {}", config.server_url());

    let bind_addr = (config.server_host.clone(), config.server_port);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(tokens.clone()))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .wrap(ErrorEnvelope)
            .service(routes::health::health)
            .service(
                web::scope("/api/v1")
                    .wrap(AuthGate)
                    .configure(routes::config),
            )
    })
    .bind(bind_addr)?
    .run()
    .await
}
