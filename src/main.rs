use anyhow::Context;
use std::sync::Arc;
use token_issuer::config::Config;
use token_issuer::keys::{JwksPublisher, KeyMaterialProvider};
use token_issuer::telemetry::init_tracing;
use token_issuer::token::TokenDispatcher;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("loading configuration")?;
    init_tracing(&config.tracing)?;

    info!(
        runtime_mode = %config.runtime_mode,
        key_dir = %config.key_store.directory.display(),
        "Starting token issuer"
    );

    let keys = Arc::new(KeyMaterialProvider::from_config(&config));

    // Key generation and file IO block; keep them off the runtime threads.
    let provisioning = Arc::clone(&keys);
    tokio::task::spawn_blocking(move || provisioning.initialize())
        .await
        .context("key provisioning task panicked")?
        .context("provisioning signing key")?;

    let dispatcher = TokenDispatcher::from_config(Arc::clone(&keys), &config);
    let publisher = JwksPublisher::new(keys);
    let kid = publisher.get_current_key_id()?;
    info!(
        kid = %kid,
        issuer = dispatcher.issuer().unwrap_or("<unset>"),
        "Signing key ready"
    );

    println!("{}", publisher.get_jwks()?.to_json()?);
    Ok(())
}
