use anyhow::Context;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{cors_layer, router, AppState};
use api_shared::AuthConfig;
use raktmap_core::config::{
    match_policy_from_env_value, max_concurrent_sends_from_env_value, sms_timeout_from_env_value,
};
use raktmap_core::{CoreConfig, FileStore, SmsConfig, TwilioGateway, DEFAULT_DATA_DIR};

const DEFAULT_JWT_TTL_SECS: u64 = 3600;

/// Main entry point for the RaktMap server
///
/// Resolves configuration from the environment (after loading `.env`), opens the JSON store,
/// builds the Twilio gateway and serves the REST API.
///
/// # Environment Variables
/// - `RAKTMAP_REST_ADDR`: REST server address (default: "0.0.0.0:5000")
/// - `RAKTMAP_DATA_DIR`: Directory for the JSON store (default: "raktmap_data")
/// - `RAKTMAP_MATCH_POLICY`: `exact` (default) or `compatible`
/// - `RAKTMAP_MAX_CONCURRENT_SENDS`: Upper bound on in-flight SMS sends (default: 1)
/// - `RAKTMAP_CORS_ORIGIN`: Allowed browser origin (permissive when unset)
/// - `TWILIO_ACCOUNT_SID`, `TWILIO_AUTH_TOKEN`, `TWILIO_PHONE_NUMBER`: SMS credentials
/// - `TWILIO_API_BASE`: Override for the Twilio API base URL
/// - `SMS_TIMEOUT_SECS`: Per-send HTTP timeout (default: 10)
/// - `JWT_SECRET`: Token signing secret
/// - `JWT_TTL_SECS`: Token lifetime in seconds (default: 3600)
///
/// # Errors
/// Returns an error if any setting is missing or invalid, the data directory cannot be
/// opened, the address cannot be bound, or the server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("raktmap=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr: SocketAddr = std::env::var("RAKTMAP_REST_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:5000".into())
        .parse()
        .context("RAKTMAP_REST_ADDR must be a socket address")?;

    let data_dir = PathBuf::from(
        std::env::var("RAKTMAP_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.into()),
    );
    let cfg = CoreConfig::new(
        data_dir,
        match_policy_from_env_value(std::env::var("RAKTMAP_MATCH_POLICY").ok())?,
        max_concurrent_sends_from_env_value(std::env::var("RAKTMAP_MAX_CONCURRENT_SENDS").ok())?,
    )?;

    let sms_cfg = SmsConfig::new(
        &required_env("TWILIO_ACCOUNT_SID")?,
        &required_env("TWILIO_AUTH_TOKEN")?,
        &required_env("TWILIO_PHONE_NUMBER")?,
        std::env::var("TWILIO_API_BASE").ok(),
        sms_timeout_from_env_value(std::env::var("SMS_TIMEOUT_SECS").ok())?,
    )?;

    let jwt_ttl = match std::env::var("JWT_TTL_SECS") {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .context("JWT_TTL_SECS must be a whole number of seconds")?,
        Err(_) => DEFAULT_JWT_TTL_SECS,
    };
    let auth = AuthConfig::new(&required_env("JWT_SECRET")?, Duration::from_secs(jwt_ttl))?;

    let cors = cors_layer(std::env::var("RAKTMAP_CORS_ORIGIN").ok().as_deref())
        .context("RAKTMAP_CORS_ORIGIN is not a valid origin")?;

    let store = Arc::new(FileStore::open(cfg.data_dir())?);
    let gateway = Arc::new(TwilioGateway::new(sms_cfg)?);
    let app = router(AppState::new(&cfg, store.clone(), gateway, auth), cors);

    tracing::info!("++ Starting RaktMap REST on {}", rest_addr);
    tracing::info!("++ Data directory: {}", store.root().display());

    let listener = tokio::net::TcpListener::bind(rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn required_env(name: &str) -> anyhow::Result<String> {
    std::env::var(name).with_context(|| format!("{name} must be set"))
}
