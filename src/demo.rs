//! Peripheral HTTP surface exposing demo-wallet availability metadata.
//! Connection strings stay server-side, the endpoints only report whether a
//! demo wallet is configured.

use std::env;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

const DEFAULT_NETWORK: &str = "signet";
const DEFAULT_FAUCET_URL: &str = "https://faucet.mutinynet.com";
const INSTRUCTIONS: &str = "Use the built-in demo wallets to walk through the payment \
    scenarios, or connect any NWC-capable wallet with its own connection string.";

#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub demo_mode: bool,
    pub network: String,
    /// Connection strings of the preconfigured demo wallets. Never exposed
    /// over HTTP.
    pub alice_connection: Option<String>,
    pub bob_connection: Option<String>,
    pub faucet_url: String,
}

impl DemoConfig {
    pub fn from_env() -> Self {
        let demo_mode = env::var("DEMO_MODE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        DemoConfig {
            demo_mode,
            network: env::var("NETWORK").unwrap_or_else(|_| DEFAULT_NETWORK.to_string()),
            alice_connection: env::var("DEMO_NWC_URL_ALICE").ok(),
            bob_connection: env::var("DEMO_NWC_URL_BOB").ok(),
            faucet_url: env::var("FAUCET_URL").unwrap_or_else(|_| DEFAULT_FAUCET_URL.to_string()),
        }
    }
}

pub fn router(config: DemoConfig) -> Router {
    Router::new()
        .route("/api/demo/status", get(demo_status))
        .route("/api/demo/wallets", get(demo_wallets))
        .with_state(Arc::new(config))
}

async fn demo_status(State(config): State<Arc<DemoConfig>>) -> Json<serde_json::Value> {
    Json(json!({
        "demoMode": config.demo_mode,
        "network": config.network,
    }))
}

async fn demo_wallets(State(config): State<Arc<DemoConfig>>) -> Response {
    if !config.demo_mode {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "Demo mode is not enabled" })),
        )
            .into_response();
    }
    Json(json!({
        "demoMode": true,
        "wallets": {
            "alice": {
                "available": config.alice_connection.is_some(),
                "name": "Demo Wallet (Alice)",
            },
            "bob": {
                "available": config.bob_connection.is_some(),
                "name": "Demo Wallet (Bob)",
            },
        },
        "faucetUrl": config.faucet_url,
        "instructions": INSTRUCTIONS,
    }))
    .into_response()
}
