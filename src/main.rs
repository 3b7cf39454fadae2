use anyhow::Context;
use log::info;

use nwc_demo::demo::{self, DemoConfig};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    env_logger::init();

    let config = DemoConfig::from_env();
    info!(
        "starting demo status server: demo_mode={} network={}",
        config.demo_mode, config.network
    );

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3001);
    let addr = format!("0.0.0.0:{}", port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("could not bind {}", addr))?;
    info!("listening on {}", addr);
    axum::serve(listener, demo::router(config)).await?;
    Ok(())
}
