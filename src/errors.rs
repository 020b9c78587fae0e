//! Error types for the betting ledger.
//!
//! Every rejected command maps to exactly one [`LedgerError`] variant, and
//! every variant belongs to exactly one [`ErrorKind`]. Callers branch on the
//! kind (or the variant) and never on the message text.

use serde::Serialize;
use thiserror::Error;

use crate::{Amount, ProjectId, TokenId};

/// Coarse error taxonomy exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    Authorization,
    NotFound,
    InvalidArgument,
    StateConflict,
    InsufficientFunds,
    Ownership,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Authorization => "AuthorizationError",
            ErrorKind::NotFound => "NotFoundError",
            ErrorKind::InvalidArgument => "InvalidArgument",
            ErrorKind::StateConflict => "StateConflict",
            ErrorKind::InsufficientFunds => "InsufficientFunds",
            ErrorKind::Ownership => "OwnershipError",
        }
    }
}

/// Precise ledger errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ===== AUTHORIZATION =====
    #[error("only the manager can {action}")]
    ManagerOnly { action: &'static str },

    #[error("{caller} is a ledger-owned account and cannot issue commands")]
    ReservedAccount { caller: String },

    // ===== NOT FOUND =====
    #[error("project {0} not found")]
    ProjectNotFound(ProjectId),

    #[error("ticket {0} not found")]
    TicketNotFound(TokenId),

    // ===== INVALID ARGUMENT =====
    #[error("project title must not be empty")]
    InvalidTitle,

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("duration must be positive, got {0}")]
    InvalidDuration(i64),

    #[error("option {option_id} is out of range for project {project_id} ({option_count} options)")]
    InvalidOption {
        project_id: ProjectId,
        option_id: usize,
        option_count: usize,
    },

    #[error("amount must be positive")]
    InvalidAmount,

    #[error("list price must be positive")]
    InvalidPrice,

    #[error("arithmetic overflow while {0}")]
    Overflow(&'static str),

    // ===== STATE CONFLICT =====
    #[error("project {0} is no longer active")]
    ProjectInactive(ProjectId),

    #[error("betting on project {project_id} closed at {end_time}")]
    BettingClosed { project_id: ProjectId, end_time: u64 },

    #[error("project {0} has already been settled")]
    AlreadySettled(ProjectId),

    #[error("ticket {0} is already listed")]
    AlreadyListed(TokenId),

    #[error("ticket {0} is not listed")]
    NotListed(TokenId),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("{0} has already claimed the airdrop")]
    AlreadyClaimed(String),

    // ===== INSUFFICIENT FUNDS =====
    #[error("insufficient balance: have {available}, need {requested}")]
    InsufficientBalance { available: Amount, requested: Amount },

    #[error("insufficient allowance: approved {approved}, need {requested}")]
    InsufficientAllowance { approved: Amount, requested: Amount },

    // ===== OWNERSHIP =====
    #[error("{caller} does not own ticket {token_id}")]
    NotOwner { token_id: TokenId, caller: String },
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::ManagerOnly { .. } | LedgerError::ReservedAccount { .. } => {
                ErrorKind::Authorization
            }
            LedgerError::ProjectNotFound(_) | LedgerError::TicketNotFound(_) => ErrorKind::NotFound,
            LedgerError::InvalidTitle
            | LedgerError::InvalidOptions(_)
            | LedgerError::InvalidDuration(_)
            | LedgerError::InvalidOption { .. }
            | LedgerError::InvalidAmount
            | LedgerError::InvalidPrice
            | LedgerError::Overflow(_) => ErrorKind::InvalidArgument,
            LedgerError::ProjectInactive(_)
            | LedgerError::BettingClosed { .. }
            | LedgerError::AlreadySettled(_)
            | LedgerError::AlreadyListed(_)
            | LedgerError::NotListed(_)
            | LedgerError::InvalidOperation(_)
            | LedgerError::AlreadyClaimed(_) => ErrorKind::StateConflict,
            LedgerError::InsufficientBalance { .. }
            | LedgerError::InsufficientAllowance { .. } => ErrorKind::InsufficientFunds,
            LedgerError::NotOwner { .. } => ErrorKind::Ownership,
        }
    }

    /// Stable machine-readable code (the variant name).
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::ManagerOnly { .. } => "ManagerOnly",
            LedgerError::ReservedAccount { .. } => "ReservedAccount",
            LedgerError::ProjectNotFound(_) => "ProjectNotFound",
            LedgerError::TicketNotFound(_) => "TicketNotFound",
            LedgerError::InvalidTitle => "InvalidTitle",
            LedgerError::InvalidOptions(_) => "InvalidOptions",
            LedgerError::InvalidDuration(_) => "InvalidDuration",
            LedgerError::InvalidOption { .. } => "InvalidOption",
            LedgerError::InvalidAmount => "InvalidAmount",
            LedgerError::InvalidPrice => "InvalidPrice",
            LedgerError::ProjectInactive(_) => "ProjectInactive",
            LedgerError::BettingClosed { .. } => "BettingClosed",
            LedgerError::AlreadySettled(_) => "AlreadySettled",
            LedgerError::AlreadyListed(_) => "AlreadyListed",
            LedgerError::NotListed(_) => "NotListed",
            LedgerError::InvalidOperation(_) => "InvalidOperation",
            LedgerError::AlreadyClaimed(_) => "AlreadyClaimed",
            LedgerError::InsufficientBalance { .. } => "InsufficientBalance",
            LedgerError::InsufficientAllowance { .. } => "InsufficientAllowance",
            LedgerError::Overflow(_) => "Overflow",
            LedgerError::NotOwner { .. } => "NotOwner",
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
