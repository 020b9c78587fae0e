// ============================================================================
// Ticket Registry - non-fungible bet tickets
// ============================================================================
//
// One map from token id to ticket is the single source of truth for who owns
// a ticket and whether it is for sale. Only the registry writes `owner`,
// `is_listed` and `list_price`:
//   - mint:               issued by the betting system when a bet is placed
//   - set_listing:        the current owner offers / withdraws the ticket
//   - transfer_ownership: the registry operator moves a ticket (sales)
//
// Stake fields (`betting_id`, `option_id`, `amount`) are fixed at mint.
// ============================================================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use crate::errors::{LedgerError, LedgerResult};
use crate::{short, Amount, ProjectId, TokenId};

/// A transferable claim on one placed bet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub token_id: TokenId,
    pub owner: String,
    pub betting_id: ProjectId,
    pub option_id: usize,
    pub amount: Amount,
    pub is_listed: bool,
    /// Only meaningful while `is_listed`
    pub list_price: Amount,
    pub minted_at: u64,
}

/// Shape returned by the `ticketInfos` query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketInfo {
    pub token_id: TokenId,
    pub betting_id: ProjectId,
    pub option_id: usize,
    pub amount: Amount,
    pub is_listed: bool,
    pub list_price: Amount,
    pub owner: String,
}

impl From<&Ticket> for TicketInfo {
    fn from(t: &Ticket) -> Self {
        Self {
            token_id: t.token_id,
            betting_id: t.betting_id,
            option_id: t.option_id,
            amount: t.amount,
            is_listed: t.is_listed,
            list_price: if t.is_listed { t.list_price } else { 0 },
            owner: t.owner.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketRegistry {
    /// Identity of this registry (the "ticket contract address")
    address: String,
    /// The only caller allowed to move tickets between owners
    operator: String,
    tickets: BTreeMap<TokenId, Ticket>,
    next_token_id: TokenId,
}

impl TicketRegistry {
    pub fn new(address: &str, operator: &str) -> Self {
        Self {
            address: address.to_string(),
            operator: operator.to_string(),
            tickets: BTreeMap::new(),
            next_token_id: 1,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn ticket_count(&self) -> usize {
        self.tickets.len()
    }

    pub fn get(&self, token_id: TokenId) -> LedgerResult<&Ticket> {
        self.tickets.get(&token_id).ok_or(LedgerError::TicketNotFound(token_id))
    }

    pub fn ticket_info(&self, token_id: TokenId) -> LedgerResult<TicketInfo> {
        self.get(token_id).map(TicketInfo::from)
    }

    /// Issue a new ticket. Ids are strictly increasing and never reused.
    pub(crate) fn mint(
        &mut self,
        owner: &str,
        betting_id: ProjectId,
        option_id: usize,
        amount: Amount,
        now: u64,
    ) -> TokenId {
        let token_id = self.next_token_id;
        self.next_token_id += 1;

        self.tickets.insert(
            token_id,
            Ticket {
                token_id,
                owner: owner.to_string(),
                betting_id,
                option_id,
                amount,
                is_listed: false,
                list_price: 0,
                minted_at: now,
            },
        );

        info!(
            "🎟️  Mint: ticket #{} -> {} (project {}, option {}, {})",
            token_id,
            short(owner),
            betting_id,
            option_id,
            amount
        );
        token_id
    }

    /// Check that `transfer_ownership` would succeed. Only the operator moves tickets.
    pub(crate) fn check_transfer(&self, caller: &str, token_id: TokenId) -> LedgerResult<()> {
        self.get(token_id)?;
        if caller != self.operator {
            return Err(LedgerError::NotOwner { token_id, caller: caller.to_string() });
        }
        Ok(())
    }

    /// Move a ticket to a new owner. Clears any listing.
    pub(crate) fn transfer_ownership(
        &mut self,
        caller: &str,
        token_id: TokenId,
        new_owner: &str,
    ) -> LedgerResult<()> {
        self.check_transfer(caller, token_id)?;
        let ticket = self
            .tickets
            .get_mut(&token_id)
            .ok_or(LedgerError::TicketNotFound(token_id))?;

        ticket.owner = new_owner.to_string();
        ticket.is_listed = false;
        ticket.list_price = 0;
        Ok(())
    }

    /// Check that `set_listing` would succeed.
    pub(crate) fn check_listing(
        &self,
        caller: &str,
        token_id: TokenId,
        is_listed: bool,
        list_price: Amount,
    ) -> LedgerResult<&Ticket> {
        let ticket = self.get(token_id)?;
        if ticket.owner != caller {
            return Err(LedgerError::NotOwner { token_id, caller: caller.to_string() });
        }
        if is_listed && list_price == 0 {
            return Err(LedgerError::InvalidPrice);
        }
        Ok(ticket)
    }

    pub(crate) fn set_listing(
        &mut self,
        caller: &str,
        token_id: TokenId,
        is_listed: bool,
        list_price: Amount,
    ) -> LedgerResult<()> {
        self.check_listing(caller, token_id, is_listed, list_price)?;
        let ticket = self
            .tickets
            .get_mut(&token_id)
            .ok_or(LedgerError::TicketNotFound(token_id))?;

        ticket.is_listed = is_listed;
        ticket.list_price = if is_listed { list_price } else { 0 };
        Ok(())
    }

    /// Withdraw every open listing on a project's tickets. Returns how many
    /// listings were closed.
    pub(crate) fn delist_project(&mut self, betting_id: ProjectId) -> usize {
        let mut closed = 0;
        for ticket in self.tickets.values_mut() {
            if ticket.betting_id == betting_id && ticket.is_listed {
                ticket.is_listed = false;
                ticket.list_price = 0;
                closed += 1;
            }
        }
        closed
    }

    /// Token ids owned by `account`, ascending
    pub fn tickets_of(&self, account: &str) -> Vec<TokenId> {
        self.tickets
            .values()
            .filter(|t| t.owner == account)
            .map(|t| t.token_id)
            .collect()
    }

    /// Token ids placed on one option of one project, ascending
    pub fn tickets_for_option(&self, betting_id: ProjectId, option_id: usize) -> Vec<TokenId> {
        self.tickets
            .values()
            .filter(|t| t.betting_id == betting_id && t.option_id == option_id)
            .map(|t| t.token_id)
            .collect()
    }

    pub fn tickets_for_project(&self, betting_id: ProjectId) -> Vec<&Ticket> {
        self.tickets.values().filter(|t| t.betting_id == betting_id).collect()
    }

    /// Every ticket currently offered on the secondary market
    pub fn listed_tickets(&self) -> Vec<TicketInfo> {
        self.tickets
            .values()
            .filter(|t| t.is_listed)
            .map(TicketInfo::from)
            .collect()
    }
}
