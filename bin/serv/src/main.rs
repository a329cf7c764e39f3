use std::net::SocketAddr;

use anki_api::{
    ApiConfig, ApiState,
    metrics::{init_metrics, metrics_handler, track_metrics},
    middleware::create_cors_layer,
    tracing::init_tracing,
};
use axum::{Router, middleware, routing::get};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `.env` is optional; real deployments set the variables directly
    dotenvy::dotenv().ok();
    let config = ApiConfig::from_env()?;

    init_tracing(&config.env);
    let metrics_handle = init_metrics()?;

    anki_db::ensure_database(&config.database_url).await?;
    let pool = anki_db::create_pool(&config.database_url, config.db_max_connections).await?;
    anki_db::run_migrations(&pool).await?;

    let bind_address = config.bind_address();
    let cors = create_cors_layer(&config.allowed_origins);
    let environment = config.env;
    let state = ApiState::new(config, pool)?;

    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    let app = anki_api::router::router(environment)
        .with_state(state)
        .merge(metrics_router)
        .layer(middleware::from_fn(track_metrics))
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server running on http://{bind_address}");

    // Peer addresses feed the per-IP rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
