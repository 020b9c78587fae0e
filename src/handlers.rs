// HTTP request handlers for the betting ledger API
//
// Each handler holds the state lock for the whole command, so commands
// reach the ledger strictly one at a time.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};
use std::sync::MutexGuard;
use tracing::{error, warn};

use crate::app_state::{AppState, SharedState};
use crate::errors::{ErrorKind, LedgerError};
use crate::models::*;
use crate::{ProjectId, TokenId};

// ===== ERRORS =====

pub enum ApiError {
    Ledger(LedgerError),
    StatePoisoned,
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError::Ledger(err)
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Authorization | ErrorKind::Ownership => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
        ErrorKind::StateConflict => StatusCode::CONFLICT,
        ErrorKind::InsufficientFunds => StatusCode::PAYMENT_REQUIRED,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Ledger(err) => {
                warn!("❌ Rejected: {} ({})", err, err.code());
                let body = ErrorResponse {
                    success: false,
                    kind: err.kind().as_str(),
                    code: err.code(),
                    error: err.to_string(),
                };
                (status_for(err.kind()), Json(body)).into_response()
            }
            ApiError::StatePoisoned => {
                error!("🔥 Ledger lock poisoned");
                let body = ErrorResponse {
                    success: false,
                    kind: "Internal",
                    code: "StatePoisoned",
                    error: "ledger state unavailable".to_string(),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

type ApiResult = Result<Json<Value>, ApiError>;

fn lock(state: &SharedState) -> Result<MutexGuard<'_, AppState>, ApiError> {
    state.lock().map_err(|_| ApiError::StatePoisoned)
}

// ===== HEALTH =====

pub async fn health_check() -> &'static str {
    "BetTicket Ledger - Online ✅"
}

// ===== TOKEN ENDPOINTS =====

pub async fn get_token_info(State(state): State<SharedState>) -> ApiResult {
    let app = lock(&state)?;
    Ok(Json(json!({
        "name": app.system.name(),
        "symbol": app.system.symbol(),
        "total_supply": app.system.total_supply(),
    })))
}

pub async fn get_balance(State(state): State<SharedState>, Path(account): Path<String>) -> ApiResult {
    let app = lock(&state)?;
    let balance = app.system.balance_of(&account);
    let claimed = app.system.has_claimed_airdrop(&account);
    Ok(Json(json!({ "account": account, "balance": balance, "has_claimed_airdrop": claimed })))
}

pub async fn get_allowance(
    State(state): State<SharedState>,
    Path((owner, spender)): Path<(String, String)>,
) -> ApiResult {
    let app = lock(&state)?;
    let allowance = app.system.allowance(&owner, &spender);
    Ok(Json(json!({ "owner": owner, "spender": spender, "allowance": allowance })))
}

pub async fn airdrop(State(state): State<SharedState>, Json(req): Json<AirdropRequest>) -> ApiResult {
    let mut app = lock(&state)?;
    let balance = app.system.airdrop(&req.from)?;
    Ok(Json(json!({ "success": true, "account": req.from, "balance": balance })))
}

pub async fn approve(State(state): State<SharedState>, Json(req): Json<ApproveRequest>) -> ApiResult {
    let mut app = lock(&state)?;
    app.system.approve(&req.from, &req.spender, req.amount)?;
    Ok(Json(json!({ "success": true, "allowance": app.system.allowance(&req.from, &req.spender) })))
}

pub async fn transfer(State(state): State<SharedState>, Json(req): Json<TransferRequest>) -> ApiResult {
    let mut app = lock(&state)?;
    app.system.transfer(&req.from, &req.to, req.amount)?;
    Ok(Json(json!({ "success": true, "balance": app.system.balance_of(&req.from) })))
}

// ===== PROJECT ENDPOINTS =====

pub async fn get_projects(State(state): State<SharedState>) -> ApiResult {
    let app = lock(&state)?;
    let projects: Vec<ProjectResponse> = app.system.get_projects().into_iter().map(ProjectResponse::from).collect();
    Ok(Json(json!({ "projects": projects })))
}

pub async fn get_project_count(State(state): State<SharedState>) -> ApiResult {
    let app = lock(&state)?;
    Ok(Json(json!({ "count": app.system.get_project_count() })))
}

pub async fn get_project(State(state): State<SharedState>, Path(id): Path<ProjectId>) -> ApiResult {
    let app = lock(&state)?;
    let project = ProjectResponse::from(app.system.get_project(id)?);
    Ok(Json(json!(project)))
}

pub async fn create_project(
    State(state): State<SharedState>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult {
    let mut app = lock(&state)?;
    let id = app
        .system
        .create_project(&req.from, &req.title, req.options, req.pool, req.duration)?;
    Ok(Json(json!({ "success": true, "project_id": id })))
}

pub async fn place_bet(
    State(state): State<SharedState>,
    Path(id): Path<ProjectId>,
    Json(req): Json<PlaceBetRequest>,
) -> ApiResult {
    let mut app = lock(&state)?;
    let token_id = app.system.place_bet(&req.from, id, req.option_id, req.amount)?;
    Ok(Json(json!({
        "success": true,
        "token_id": token_id,
        "new_balance": app.system.balance_of(&req.from),
    })))
}

pub async fn settle_project(
    State(state): State<SharedState>,
    Path(id): Path<ProjectId>,
    Json(req): Json<SettleRequest>,
) -> ApiResult {
    let mut app = lock(&state)?;
    let report = app.system.settle_project(&req.from, id, req.winner_option_id)?;
    Ok(Json(json!(SettleResponse { success: true, report })))
}

pub async fn get_betting_tickets(
    State(state): State<SharedState>,
    Path((id, option_id)): Path<(ProjectId, usize)>,
) -> ApiResult {
    let app = lock(&state)?;
    app.system.get_project(id)?;
    Ok(Json(json!({ "tickets": app.system.get_betting_tickets(id, option_id) })))
}

// ===== TICKET ENDPOINTS =====

pub async fn get_ticket_address(State(state): State<SharedState>) -> ApiResult {
    let app = lock(&state)?;
    Ok(Json(json!({ "address": app.system.get_lottery_ticket_address() })))
}

pub async fn get_user_tickets(State(state): State<SharedState>, Path(account): Path<String>) -> ApiResult {
    let app = lock(&state)?;
    Ok(Json(json!({ "account": account, "tickets": app.system.get_user_tickets(&account) })))
}

pub async fn get_ticket(State(state): State<SharedState>, Path(id): Path<TokenId>) -> ApiResult {
    let app = lock(&state)?;
    let ticket = TicketResponse::from(app.system.ticket_infos(id)?);
    Ok(Json(json!(ticket)))
}

pub async fn get_market(State(state): State<SharedState>) -> ApiResult {
    let app = lock(&state)?;
    let listed: Vec<TicketResponse> = app.system.listed_tickets().into_iter().map(TicketResponse::from).collect();
    Ok(Json(json!({ "tickets": listed })))
}

pub async fn list_ticket(
    State(state): State<SharedState>,
    Path(id): Path<TokenId>,
    Json(req): Json<ListTicketRequest>,
) -> ApiResult {
    let mut app = lock(&state)?;
    app.system.list_ticket(&req.from, id, req.price)?;
    Ok(Json(json!({ "success": true, "token_id": id, "price": req.price })))
}

pub async fn unlist_ticket(
    State(state): State<SharedState>,
    Path(id): Path<TokenId>,
    Json(req): Json<CallerRequest>,
) -> ApiResult {
    let mut app = lock(&state)?;
    app.system.unlist_ticket(&req.from, id)?;
    Ok(Json(json!({ "success": true, "token_id": id })))
}

pub async fn buy_ticket(
    State(state): State<SharedState>,
    Path(id): Path<TokenId>,
    Json(req): Json<CallerRequest>,
) -> ApiResult {
    let mut app = lock(&state)?;
    let sale = app.system.buy_ticket(&req.from, id)?;
    Ok(Json(json!({ "success": true, "sale": sale })))
}

// ===== SYSTEM ENDPOINTS =====

pub async fn get_manager(State(state): State<SharedState>) -> ApiResult {
    let app = lock(&state)?;
    Ok(Json(json!({ "manager": app.system.manager(), "system_address": app.system.address() })))
}

pub async fn get_events(State(state): State<SharedState>, Query(query): Query<EventsQuery>) -> ApiResult {
    let app = lock(&state)?;
    Ok(Json(json!({ "events": app.system.recent_events(query.limit) })))
}
