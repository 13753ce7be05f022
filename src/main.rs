/// Bodega API - winery registry backend
///
/// HTTP API for the winery registry: user accounts with cookie-bound JWT
/// sessions, winery records, and password recovery by email.

mod api;
mod auth;
mod bodega;
mod config;
mod context;
mod db;
mod error;
mod jobs;
mod mailer;
mod recovery;
mod server;
mod usuario;

use config::ServerConfig;
use context::AppContext;
use error::ApiResult;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ApiResult<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bodega_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    print_banner();

    // Load configuration
    let config = ServerConfig::from_env()?;

    // Create application context
    let ctx = Arc::new(AppContext::new(config).await?);

    // Start background jobs; the token also drives server shutdown
    let cancel = CancellationToken::new();
    let sweeper = jobs::JobScheduler::new(Arc::clone(&ctx), cancel.clone()).start();

    // Start server
    server::serve((*ctx).clone(), cancel).await?;

    // The serve future only returns after the shutdown signal, at which
    // point the sweep loop is already unwinding
    if let Err(e) = sweeper.await {
        tracing::warn!(error = %e, "sweep task did not exit cleanly");
    }

    Ok(())
}

fn print_banner() {
    println!(
        r#"
    ____            __                     ___    ____  ____
   / __ )____  ____/ /__  ____ _____ _    /   |  / __ \/  _/
  / __  / __ \/ __  / _ \/ __ `/ __ `/   / /| | / /_/ // /
 / /_/ / /_/ / /_/ /  __/ /_/ / /_/ /   / ___ |/ ____// /
/_____/\____/\__,_/\___/\__, /\__,_/   /_/  |_/_/   /___/
                       /____/

        Bodega API v{}
        "#,
        env!("CARGO_PKG_VERSION")
    );
}
