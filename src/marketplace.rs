// ============================================================================
// Marketplace - secondary market for bet tickets
// ============================================================================
//
// Owners list tickets at a fixed price; any other account buys a listed
// ticket by paying the seller through an allowance granted to the ticket
// registry. A sale is one step: payment, ownership transfer and delisting
// all happen or none do.
// ============================================================================

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{LedgerError, LedgerResult};
use crate::projects::ProjectLedger;
use crate::tickets::TicketRegistry;
use crate::token::TokenLedger;
use crate::{short, Amount, TokenId};

/// Completed secondary-market sale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub token_id: TokenId,
    pub seller: String,
    pub buyer: String,
    pub price: Amount,
}

/// Marketplace view over the ledger components for the length of one call
pub struct Marketplace<'a> {
    pub tickets: &'a mut TicketRegistry,
    pub token: &'a mut TokenLedger,
    pub projects: &'a ProjectLedger,
}

impl<'a> Marketplace<'a> {
    pub fn list_ticket(&mut self, caller: &str, token_id: TokenId, price: Amount) -> LedgerResult<()> {
        let ticket = self.tickets.check_listing(caller, token_id, true, price)?;
        if ticket.is_listed {
            return Err(LedgerError::AlreadyListed(token_id));
        }
        let project = self.projects.get(ticket.betting_id)?;
        if !project.is_active {
            return Err(LedgerError::ProjectInactive(project.id));
        }

        self.tickets.set_listing(caller, token_id, true, price)?;
        info!("🏷️  Listed: ticket #{} by {} at {}", token_id, short(caller), price);
        Ok(())
    }

    pub fn unlist_ticket(&mut self, caller: &str, token_id: TokenId) -> LedgerResult<()> {
        let ticket = self.tickets.check_listing(caller, token_id, false, 0)?;
        if !ticket.is_listed {
            return Err(LedgerError::NotListed(token_id));
        }

        self.tickets.set_listing(caller, token_id, false, 0)?;
        info!("🚫 Unlisted: ticket #{} by {}", token_id, short(caller));
        Ok(())
    }

    pub fn buy_ticket(&mut self, buyer: &str, token_id: TokenId) -> LedgerResult<Sale> {
        let ticket = self.tickets.get(token_id)?;
        if !ticket.is_listed {
            return Err(LedgerError::NotListed(token_id));
        }
        if ticket.owner == buyer {
            return Err(LedgerError::InvalidOperation(format!(
                "{} already owns ticket {}",
                buyer, token_id
            )));
        }
        let seller = ticket.owner.clone();
        let price = ticket.list_price;

        // Everything below must succeed once payment succeeds
        let operator = self.projects.address();
        self.tickets.check_transfer(operator, token_id)?;

        let spender = self.tickets.address().to_string();
        self.token.transfer_from(&spender, buyer, &seller, price)?;
        self.tickets.transfer_ownership(operator, token_id, buyer)?;

        info!(
            "🤝 Sale: ticket #{} {} -> {} for {}",
            token_id,
            short(&seller),
            short(buyer),
            price
        );
        Ok(Sale { token_id, seller, buyer: buyer.to_string(), price })
    }
}
