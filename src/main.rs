// BetTicket Ledger - Main Entry Point
// Prediction projects, tradable bet tickets and pro-rata settlement over HTTP

use std::process::ExitCode;

use betticket_ledger::{build_router, AppState, Config};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(parse_level(&config.log_level))
        .init();

    info!("🎲 BetTicket Ledger starting");

    let addr = config.bind_addr;
    let state_file = config.state_file.clone();
    let state = match AppState::new(config) {
        Ok(app_state) => app_state.shared(),
        Err(e) => {
            error!("❌ Cannot restore state from {}: {}", state_file.display(), e);
            error!("   Fix or move the file aside, then restart");
            return ExitCode::FAILURE;
        }
    };

    // Clone state for shutdown handler before moving into router
    let shutdown_state = state.clone();
    let app = build_router(state);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("❌ Failed to bind {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    info!("🚀 Server running on http://{}", addr);
    info!("   POST /airdrop                  - Claim the one-time token airdrop");
    info!("   POST /approve                  - Approve a spender");
    info!("   POST /projects                 - Create project (manager)");
    info!("   POST /projects/:id/bet         - Place bet, receive ticket");
    info!("   POST /projects/:id/settle      - Settle project (manager)");
    info!("   GET  /market                   - Listed tickets");
    info!("   POST /tickets/:id/{{list,unlist,buy}}");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("❌ Failed to listen for shutdown signal: {}", e);
            }
            info!("🛑 Shutdown signal received...");
        })
        .await;

    if let Err(e) = served {
        error!("❌ Server error: {}", e);
    }

    info!("💾 Saving state to disk...");
    match shutdown_state.lock() {
        Ok(app_state) => match app_state.save_to_disk() {
            Ok(()) => info!("✅ State saved successfully"),
            Err(e) => error!("❌ Failed to save state: {}", e),
        },
        Err(_) => error!("❌ Ledger lock poisoned, state not saved"),
    }

    info!("👋 Goodbye!");
    ExitCode::SUCCESS
}

fn parse_level(level: &str) -> tracing::Level {
    level.parse().unwrap_or(tracing::Level::INFO)
}
