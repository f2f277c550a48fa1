//! # rupee-tally
//!
//! Razorpay payment counter backend.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export RAZORPAY_KEY_ID=rzp_test_...
//! export RAZORPAY_KEY_SECRET=...
//! export JWT_SECRET=...
//! export DATABASE_URL=postgres://...   # optional, file counter otherwise
//!
//! # Run the server
//! rupee-tally
//! ```

use tally_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    // Print banner
    print_banner();

    // Initialize application state
    let state = AppState::new().await?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Payment provider: {}", state.gateway.provider_name());
    info!("Counter storage: {}", state.store.backend_name());
    info!(
        "Order template: {} {}",
        state.order_template.amount, state.order_template.currency
    );

    // Create router
    let app = routes::create_router(state);

    // Start server
    info!("rupee-tally starting on http://{}", addr);

    if !is_prod {
        info!("Health: http://{}/health", addr);
        info!("Order: POST http://{}/create-order", addr);
        info!("Verify: POST http://{}/verify", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("rupee-tally stopped");
    Ok(())
}

/// `LOG_FORMAT=json` switches to structured output
fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

fn print_banner() {
    println!(
        r#"
  rupee-tally
  ━━━━━━━━━━━━━━━━━━━━━━━
  Payment counter backend
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
