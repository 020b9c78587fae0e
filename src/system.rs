// ============================================================================
// Betting System - the single call surface of the ledger
// ============================================================================
//
// Owns the token ledger, the ticket registry, the project ledger and the
// event log. Every command takes `&mut self`, so whoever holds the system
// (the HTTP layer keeps it behind one mutex) runs commands one at a time and
// each command commits fully or not at all.
//
// Identities:
//   - system address:  escrow for pools and stakes, spender for bets,
//                      operator of the ticket registry
//   - ticket address:  spender for secondary-market purchases
// ============================================================================

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::errors::{LedgerError, LedgerResult};
use crate::events::{EventKind, EventLog, LedgerEvent};
use crate::marketplace::{Marketplace, Sale};
use crate::projects::{Project, ProjectLedger, SettlementReport};
use crate::tickets::{TicketInfo, TicketRegistry};
use crate::token::TokenLedger;
use crate::{contract_address, Amount, ProjectId, TokenId};

pub const SYSTEM_CONTRACT: &str = "BettingSystem";
pub const TICKET_CONTRACT: &str = "LotteryTicket";

fn default_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BettingSystem {
    token: TokenLedger,
    tickets: TicketRegistry,
    projects: ProjectLedger,
    events: EventLog,
    #[serde(skip, default = "default_clock")]
    clock: Arc<dyn Clock>,
}

impl BettingSystem {
    pub fn new(manager: &str, token_name: &str, token_symbol: &str, airdrop_amount: Amount) -> Self {
        Self::with_clock(manager, token_name, token_symbol, airdrop_amount, default_clock())
    }

    pub fn with_clock(
        manager: &str,
        token_name: &str,
        token_symbol: &str,
        airdrop_amount: Amount,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let system_address = contract_address(SYSTEM_CONTRACT);
        let ticket_address = contract_address(TICKET_CONTRACT);

        info!(
            "📒 Betting system initialized (manager: {}, token: {} {})",
            manager, token_name, token_symbol
        );

        Self {
            token: TokenLedger::new(token_name, token_symbol, airdrop_amount),
            tickets: TicketRegistry::new(&ticket_address, &system_address),
            projects: ProjectLedger::new(&system_address, manager),
            events: EventLog::new(),
            clock,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.manager_address,
            &config.token_name,
            &config.token_symbol,
            config.airdrop_amount,
        )
    }

    /// Swap the time source, e.g. after restoring a snapshot
    pub fn set_clock(&mut self, clock: Arc<dyn Clock>) {
        self.clock = clock;
    }

    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Contract identities never act as callers
    fn require_external(&self, caller: &str) -> LedgerResult<()> {
        if caller == self.address() || caller == self.get_lottery_ticket_address() {
            warn!("⛔ Rejected command issued as ledger-owned account {}", caller);
            return Err(LedgerError::ReservedAccount { caller: caller.to_string() });
        }
        Ok(())
    }

    fn record(&mut self, event: LedgerEvent) {
        let now = self.clock.now();
        self.events.record(event, now);
    }

    // ===== IDENTITIES =====

    pub fn manager(&self) -> &str {
        self.projects.manager()
    }

    /// Escrow / spender identity of the betting system
    pub fn address(&self) -> &str {
        self.projects.address()
    }

    pub fn get_lottery_ticket_address(&self) -> &str {
        self.tickets.address()
    }

    // ===== TOKEN =====

    pub fn name(&self) -> &str {
        self.token.name()
    }

    pub fn symbol(&self) -> &str {
        self.token.symbol()
    }

    pub fn airdrop_amount(&self) -> Amount {
        self.token.airdrop_amount()
    }

    pub fn total_supply(&self) -> Amount {
        self.token.total_supply()
    }

    pub fn balance_of(&self, account: &str) -> Amount {
        self.token.balance_of(account)
    }

    pub fn allowance(&self, owner: &str, spender: &str) -> Amount {
        self.token.allowance(owner, spender)
    }

    pub fn has_claimed_airdrop(&self, account: &str) -> bool {
        self.token.has_claimed_airdrop(account)
    }

    pub fn airdrop(&mut self, caller: &str) -> LedgerResult<Amount> {
        self.require_external(caller)?;
        let balance = self.token.airdrop(caller)?;
        let amount = self.token.airdrop_amount();
        self.record(LedgerEvent::new(EventKind::Airdrop, caller, amount));
        Ok(balance)
    }

    pub fn approve(&mut self, caller: &str, spender: &str, amount: Amount) -> LedgerResult<()> {
        self.require_external(caller)?;
        self.token.approve(caller, spender, amount);
        self.record(LedgerEvent::new(EventKind::Approval, caller, amount).with_counterparty(spender));
        Ok(())
    }

    pub fn transfer(&mut self, caller: &str, to: &str, amount: Amount) -> LedgerResult<()> {
        self.require_external(caller)?;
        self.token.transfer(caller, to, amount)?;
        self.record(LedgerEvent::new(EventKind::Transfer, caller, amount).with_counterparty(to));
        Ok(())
    }

    // ===== PROJECTS =====

    pub fn create_project(
        &mut self,
        caller: &str,
        title: &str,
        options: Vec<String>,
        pool: Amount,
        duration: i64,
    ) -> LedgerResult<ProjectId> {
        self.require_external(caller)?;
        let now = self.clock.now();
        let id = self
            .projects
            .create_project(&mut self.token, caller, title, options, pool, duration, now)?;
        self.record(LedgerEvent::new(EventKind::ProjectCreated, caller, pool).with_project(id));
        Ok(id)
    }

    pub fn place_bet(
        &mut self,
        caller: &str,
        project_id: ProjectId,
        option_id: usize,
        amount: Amount,
    ) -> LedgerResult<TokenId> {
        self.require_external(caller)?;
        let now = self.clock.now();
        let token_id = self.projects.place_bet(
            &mut self.token,
            &mut self.tickets,
            caller,
            project_id,
            option_id,
            amount,
            now,
        )?;
        self.record(
            LedgerEvent::new(EventKind::BetPlaced, caller, amount)
                .with_project(project_id)
                .with_ticket(token_id),
        );
        Ok(token_id)
    }

    pub fn settle_project(
        &mut self,
        caller: &str,
        project_id: ProjectId,
        winner_option_id: usize,
    ) -> LedgerResult<SettlementReport> {
        self.require_external(caller)?;
        let now = self.clock.now();
        let report = self.projects.settle_project(
            &mut self.token,
            &mut self.tickets,
            caller,
            project_id,
            winner_option_id,
            now,
        )?;

        for payout in report.payouts.iter().filter(|p| p.amount > 0) {
            self.record(
                LedgerEvent::new(EventKind::Payout, &payout.owner, payout.amount)
                    .with_project(project_id)
                    .with_ticket(payout.token_id),
            );
        }
        if report.manager_remainder > 0 {
            let manager = self.projects.manager().to_string();
            self.record(
                LedgerEvent::new(EventKind::Payout, &manager, report.manager_remainder)
                    .with_project(project_id),
            );
        }
        self.record(LedgerEvent::new(EventKind::ProjectSettled, caller, report.pot).with_project(project_id));
        Ok(report)
    }

    pub fn get_project(&self, project_id: ProjectId) -> LedgerResult<&Project> {
        self.projects.get(project_id)
    }

    pub fn get_projects(&self) -> Vec<&Project> {
        self.projects.all()
    }

    pub fn get_project_count(&self) -> u64 {
        self.projects.project_count()
    }

    /// Whether bets are currently accepted on a project
    pub fn is_betting_open(&self, project_id: ProjectId) -> LedgerResult<bool> {
        Ok(self.projects.get(project_id)?.is_open(self.clock.now()))
    }

    // ===== TICKETS =====

    pub fn get_user_tickets(&self, account: &str) -> Vec<TokenId> {
        self.tickets.tickets_of(account)
    }

    pub fn get_betting_tickets(&self, project_id: ProjectId, option_id: usize) -> Vec<TokenId> {
        self.tickets.tickets_for_option(project_id, option_id)
    }

    pub fn ticket_infos(&self, token_id: TokenId) -> LedgerResult<TicketInfo> {
        self.tickets.ticket_info(token_id)
    }

    pub fn listed_tickets(&self) -> Vec<TicketInfo> {
        self.tickets.listed_tickets()
    }

    pub fn ticket_count(&self) -> usize {
        self.tickets.ticket_count()
    }

    // ===== MARKETPLACE =====

    fn marketplace(&mut self) -> Marketplace<'_> {
        Marketplace {
            tickets: &mut self.tickets,
            token: &mut self.token,
            projects: &self.projects,
        }
    }

    pub fn list_ticket(&mut self, caller: &str, token_id: TokenId, price: Amount) -> LedgerResult<()> {
        self.require_external(caller)?;
        self.marketplace().list_ticket(caller, token_id, price)?;
        self.record(LedgerEvent::new(EventKind::TicketListed, caller, price).with_ticket(token_id));
        Ok(())
    }

    pub fn unlist_ticket(&mut self, caller: &str, token_id: TokenId) -> LedgerResult<()> {
        self.require_external(caller)?;
        self.marketplace().unlist_ticket(caller, token_id)?;
        self.record(LedgerEvent::new(EventKind::TicketUnlisted, caller, 0).with_ticket(token_id));
        Ok(())
    }

    pub fn buy_ticket(&mut self, caller: &str, token_id: TokenId) -> LedgerResult<Sale> {
        self.require_external(caller)?;
        let sale = self.marketplace().buy_ticket(caller, token_id)?;
        self.record(
            LedgerEvent::new(EventKind::TicketSold, &sale.buyer, sale.price)
                .with_counterparty(&sale.seller)
                .with_ticket(token_id),
        );
        Ok(sale)
    }

    // ===== EVENTS =====

    pub fn recent_events(&self, limit: usize) -> Vec<&LedgerEvent> {
        self.events.recent(limit)
    }

    pub fn events_for(&self, account: &str) -> Vec<&LedgerEvent> {
        self.events.for_account(account)
    }
}
