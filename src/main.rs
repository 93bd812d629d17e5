mod config;
mod db;
mod errors;
mod middleware;
mod models;
mod policy;
mod routes;
mod services;
mod state;
#[cfg(test)]
mod test_support;
mod utils;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue, Method};
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::Config;
use db::postgres::PgRepository;
use services::geocoder::{Geocoder, TokenCache};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cfg = Config::from_env();

    let pool = establish_connection().await?;

    let state = AppState {
        db: Arc::new(PgRepository::new(pool)),
        geocoder: Arc::new(Geocoder::new(cfg.geocode.clone(), TokenCache::new())),
    };

    let mut origins = Vec::with_capacity(cfg.allowed_origins.len());
    for origin in &cfg.allowed_origins {
        origins.push(HeaderValue::from_str(origin)?);
    }
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-access-token"),
        ])
        .allow_credentials(true);

    let app = routes::api_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn establish_connection() -> anyhow::Result<PgPool> {
    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

    let pool = PgPool::connect(&database_url).await?;

    sqlx::query("SELECT 1").execute(&pool).await?;
    sqlx::migrate!().run(&pool).await?;

    info!("Successfully connected to the database");
    Ok(pool)
}
