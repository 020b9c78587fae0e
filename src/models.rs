// Request/response models for the HTTP API
//
// Response shapes mirror the contract call surface the frontend reads
// (`getProject`, `ticketInfos`), so their fields are camelCase.

use serde::{Deserialize, Serialize};

use crate::projects::{Project, SettlementReport};
use crate::tickets::TicketInfo;
use crate::{Amount, ProjectId, TokenId};

// ===== REQUESTS =====

#[derive(Debug, Deserialize)]
pub struct AirdropRequest {
    pub from: String,
}

#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    pub from: String,
    pub spender: String,
    pub amount: Amount,
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub from: String,
    pub to: String,
    pub amount: Amount,
}

/// POST /projects request body
///
/// ```json
/// {
///   "from": "MANAGER",
///   "title": "Match A",
///   "options": ["Home", "Away"],
///   "pool": 1000,
///   "duration": 3600
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub from: String,
    pub title: String,
    pub options: Vec<String>,
    #[serde(default)]
    pub pool: Amount,
    /// Seconds the betting window stays open
    pub duration: i64,
}

#[derive(Debug, Deserialize)]
pub struct PlaceBetRequest {
    pub from: String,
    #[serde(alias = "optionId")]
    pub option_id: usize,
    pub amount: Amount,
}

#[derive(Debug, Deserialize)]
pub struct SettleRequest {
    pub from: String,
    #[serde(alias = "winnerOptionId")]
    pub winner_option_id: usize,
}

#[derive(Debug, Deserialize)]
pub struct ListTicketRequest {
    pub from: String,
    pub price: Amount,
}

/// Body for unlist/buy, which only need the caller
#[derive(Debug, Deserialize)]
pub struct CallerRequest {
    pub from: String,
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    #[serde(default = "default_event_limit")]
    pub limit: usize,
}

fn default_event_limit() -> usize {
    100
}

// ===== RESPONSES =====

/// `getProject` shape
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: ProjectId,
    pub title: String,
    pub options: Vec<String>,
    pub total_pool: Amount,
    pub end_time: u64,
    pub winner_option_id: Option<usize>,
    pub is_active: bool,
    pub total_bet_amount: Amount,
}

impl From<&Project> for ProjectResponse {
    fn from(p: &Project) -> Self {
        Self {
            id: p.id,
            title: p.title.clone(),
            options: p.options.clone(),
            total_pool: p.total_pool,
            end_time: p.end_time,
            winner_option_id: p.winner_option_id,
            is_active: p.is_active,
            total_bet_amount: p.total_bet_amount,
        }
    }
}

/// `ticketInfos` shape
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub token_id: TokenId,
    pub betting_id: ProjectId,
    pub option_id: usize,
    pub amount: Amount,
    pub is_listed: bool,
    pub list_price: Amount,
    pub owner: String,
}

impl From<TicketInfo> for TicketResponse {
    fn from(t: TicketInfo) -> Self {
        Self {
            token_id: t.token_id,
            betting_id: t.betting_id,
            option_id: t.option_id,
            amount: t.amount,
            is_listed: t.is_listed,
            list_price: t.list_price,
            owner: t.owner,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SettleResponse {
    pub success: bool,
    pub report: SettlementReport,
}

/// Error body: `kind` and `code` are stable, `error` is for humans
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub kind: &'static str,
    pub code: &'static str,
    pub error: String,
}
