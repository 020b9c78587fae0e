// Routes module - maps every ledger operation onto an HTTP endpoint

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::app_state::SharedState;
use crate::handlers::*;

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        // ===== HEALTH CHECK =====
        .route("/", get(health_check))
        .route("/health", get(health_check))

        // ===== TOKEN ENDPOINTS =====
        .route("/token", get(get_token_info))
        .route("/balance/:account", get(get_balance))
        .route("/allowance/:owner/:spender", get(get_allowance))
        .route("/approve", post(approve))
        .route("/transfer", post(transfer))
        .route("/airdrop", post(airdrop))

        // ===== PROJECT ENDPOINTS =====
        .route("/projects", get(get_projects).post(create_project))
        .route("/projects/count", get(get_project_count))
        .route("/projects/:id", get(get_project))
        .route("/projects/:id/bet", post(place_bet))
        .route("/projects/:id/settle", post(settle_project))
        .route("/projects/:id/options/:option_id/tickets", get(get_betting_tickets))

        // ===== TICKET & MARKET ENDPOINTS =====
        .route("/tickets/address", get(get_ticket_address))
        .route("/tickets/user/:account", get(get_user_tickets))
        .route("/tickets/:id", get(get_ticket))
        .route("/tickets/:id/list", post(list_ticket))
        .route("/tickets/:id/unlist", post(unlist_ticket))
        .route("/tickets/:id/buy", post(buy_ticket))
        .route("/market", get(get_market))

        // ===== SYSTEM ENDPOINTS =====
        .route("/manager", get(get_manager))
        .route("/events", get(get_events))

        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
