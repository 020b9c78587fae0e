/// Event Log - append-only record of committed ledger activity
///
/// Only operations that commit append an entry, so the log never shows a
/// half-applied or rejected command. Callers poll it through
/// `BettingSystem::recent_events`.

use serde::{Deserialize, Serialize};

use crate::{Amount, ProjectId, TokenId};

/// Event types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EventKind {
    Airdrop,
    Approval,
    Transfer,
    ProjectCreated,
    BetPlaced,
    TicketListed,
    TicketUnlisted,
    TicketSold,
    Payout,
    ProjectSettled,
}

/// A single committed event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerEvent {
    pub id: String,
    pub sequence: u64,
    pub kind: EventKind,
    pub account: String,
    #[serde(default)]
    pub counterparty: Option<String>,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    #[serde(default)]
    pub token_id: Option<TokenId>,
    pub amount: Amount,
    pub timestamp: u64,
}

impl LedgerEvent {
    pub fn new(kind: EventKind, account: &str, amount: Amount) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sequence: 0,
            kind,
            account: account.to_string(),
            counterparty: None,
            project_id: None,
            token_id: None,
            amount,
            timestamp: 0,
        }
    }

    pub fn with_counterparty(mut self, counterparty: &str) -> Self {
        self.counterparty = Some(counterparty.to_string());
        self
    }

    pub fn with_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn with_ticket(mut self, token_id: TokenId) -> Self {
        self.token_id = Some(token_id);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<LedgerEvent>,
    next_sequence: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp and append an event
    pub fn record(&mut self, mut event: LedgerEvent, timestamp: u64) {
        self.next_sequence += 1;
        event.sequence = self.next_sequence;
        event.timestamp = timestamp;
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Newest first
    pub fn recent(&self, limit: usize) -> Vec<&LedgerEvent> {
        self.events.iter().rev().take(limit).collect()
    }

    pub fn for_account(&self, account: &str) -> Vec<&LedgerEvent> {
        self.events
            .iter()
            .filter(|e| e.account == account || e.counterparty.as_deref() == Some(account))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_assigns_sequence() {
        let mut log = EventLog::new();
        log.record(LedgerEvent::new(EventKind::Airdrop, "alice", 100), 10);
        log.record(
            LedgerEvent::new(EventKind::Transfer, "alice", 40).with_counterparty("bob"),
            11,
        );

        let recent = log.recent(10);
        assert_eq!(recent[0].sequence, 2);
        assert_eq!(recent[0].timestamp, 11);
        assert_eq!(recent[1].kind, EventKind::Airdrop);
        assert_eq!(log.for_account("bob").len(), 1);
        assert_eq!(log.recent(1).len(), 1);
    }
}
