/// BetTicket Ledger - prediction projects with tradable bet tickets
/// Exports all modules for use as a library crate

pub mod app_state;
pub mod clock;
pub mod config;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod marketplace;
pub mod models;
pub mod projects;
pub mod routes;
pub mod system;
pub mod tickets;
pub mod token;

use sha2::{Digest, Sha256};

/// Token amounts (whole token units)
pub type Amount = u64;
/// Sequential project identifier, starting at 1
pub type ProjectId = u64;
/// Sequential ticket identifier, starting at 1
pub type TokenId = u64;

pub use app_state::{AppState, SharedState};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, ConfigError};
pub use errors::{ErrorKind, LedgerError, LedgerResult};
pub use events::{EventKind, EventLog, LedgerEvent};
pub use marketplace::{Marketplace, Sale};
pub use projects::{split_pot, Payout, Project, ProjectLedger, SettlementReport};
pub use routes::build_router;
pub use system::BettingSystem;
pub use tickets::{Ticket, TicketInfo, TicketRegistry};
pub use token::TokenLedger;

/// Deterministic `0x`-prefixed identity for a built-in contract
pub fn contract_address(label: &str) -> String {
    let digest = hex::encode(Sha256::digest(label.as_bytes()));
    format!("0x{}", &digest[..40])
}

/// Shortened account for log lines
pub(crate) fn short(account: &str) -> String {
    account.chars().take(16).collect()
}
