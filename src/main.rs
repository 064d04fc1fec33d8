use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ai_dashboard_gateway::{
    app, config::Args, load_balancer::health_checker, state::AppState,
    sweeper::expiry_sweeper, worker::generation_worker,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // parse and validate cli arguments
    let config = match Args::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    let (state, jobs_rx) = AppState::new(&config);
    let state = Arc::new(state);
    let client = reqwest::Client::new();

    tokio::spawn(generation_worker(
        jobs_rx,
        client.clone(),
        Arc::clone(&state.load_balancer),
        Arc::clone(&state.cache),
        config.backend_timeout,
    ));
    tokio::spawn(health_checker(
        Arc::clone(&state.load_balancer),
        client,
        config.health_interval,
    ));
    tokio::spawn(expiry_sweeper(
        Arc::clone(&state.limiter),
        Arc::clone(&state.cache),
        config.sweep_interval,
    ));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("gateway running on http://localhost:{}", config.port);
    info!(
        "generation routes: {} requests per {:?}",
        config.generation_quota.limit(),
        config.generation_quota.window()
    );
    info!(
        "file routes: {} requests per {:?}",
        config.file_quota.limit(),
        config.file_quota.window()
    );

    axum::serve(listener, app(state)).await?;
    Ok(())
}
