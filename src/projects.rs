use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::errors::{LedgerError, LedgerResult};
use crate::tickets::TicketRegistry;
use crate::token::TokenLedger;
use crate::{short, Amount, ProjectId, TokenId};

/// Production Betting Project System
/// Manages project creation, bet placement and one-shot settlement

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Sequential identifier, starting at 1
    pub id: ProjectId,

    /// Question/title shown to bettors
    pub title: String,

    /// Mutually exclusive options (at least two, never change)
    pub options: Vec<String>,

    /// Seed amount funded by the manager
    pub total_pool: Amount,

    /// Sum of every bet placed on this project
    pub total_bet_amount: Amount,

    /// Betting closes at this unix timestamp (exclusive)
    pub end_time: u64,

    /// Winning option index (None until settled)
    pub winner_option_id: Option<usize>,

    /// True from creation until settlement
    pub is_active: bool,

    /// Manager who created the project
    pub manager: String,

    pub created_at: u64,
    pub settled_at: Option<u64>,
}

impl Project {
    /// Pool plus every stake: the amount distributed at settlement
    pub fn pot(&self) -> LedgerResult<Amount> {
        self.total_pool
            .checked_add(self.total_bet_amount)
            .ok_or(LedgerError::Overflow("computing project pot"))
    }

    pub fn is_open(&self, now: u64) -> bool {
        self.is_active && now < self.end_time
    }

    fn check_option(&self, option_id: usize) -> LedgerResult<()> {
        if option_id >= self.options.len() {
            return Err(LedgerError::InvalidOption {
                project_id: self.id,
                option_id,
                option_count: self.options.len(),
            });
        }
        Ok(())
    }
}

/// One winning ticket's share of the pot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub token_id: TokenId,
    pub owner: String,
    pub stake: Amount,
    pub amount: Amount,
}

/// Full accounting of a settlement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReport {
    pub project_id: ProjectId,
    pub winner_option_id: usize,
    pub pot: Amount,
    pub winning_stake: Amount,
    pub payouts: Vec<Payout>,
    /// Rounding dust, or the whole pot when nobody backed the winner
    pub manager_remainder: Amount,
    pub listings_closed: usize,
}

impl SettlementReport {
    pub fn total_paid(&self) -> Amount {
        self.payouts.iter().map(|p| p.amount).sum::<Amount>() + self.manager_remainder
    }
}

/// Split `pot` across winning tickets in proportion to their stake.
///
/// Each ticket receives `floor(pot * stake / winning_stake)`; whatever the
/// floors leave behind goes to the manager, so payouts plus remainder always
/// equal the pot. With no winning stake the manager takes the whole pot.
pub fn split_pot(pot: Amount, winning_tickets: &[(TokenId, String, Amount)]) -> (Vec<Payout>, Amount) {
    let winning_stake: u128 = winning_tickets.iter().map(|(_, _, stake)| *stake as u128).sum();
    if winning_stake == 0 {
        return (Vec::new(), pot);
    }

    let mut distributed: Amount = 0;
    let payouts: Vec<Payout> = winning_tickets
        .iter()
        .map(|(token_id, owner, stake)| {
            // stake <= winning_stake, so the quotient never exceeds pot
            let amount = (pot as u128 * *stake as u128 / winning_stake) as Amount;
            distributed += amount;
            Payout { token_id: *token_id, owner: owner.clone(), stake: *stake, amount }
        })
        .collect();

    (payouts, pot - distributed)
}

/// Project manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectLedger {
    /// Identity of the betting system: escrow holder, bet spender, ticket operator
    address: String,

    /// The only account allowed to create and settle projects
    manager: String,

    projects: BTreeMap<ProjectId, Project>,

    next_project_id: ProjectId,
}

impl ProjectLedger {
    pub fn new(address: &str, manager: &str) -> Self {
        Self {
            address: address.to_string(),
            manager: manager.to_string(),
            projects: BTreeMap::new(),
            next_project_id: 1,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn manager(&self) -> &str {
        &self.manager
    }

    pub fn project_count(&self) -> u64 {
        self.projects.len() as u64
    }

    pub fn get(&self, project_id: ProjectId) -> LedgerResult<&Project> {
        self.projects
            .get(&project_id)
            .ok_or(LedgerError::ProjectNotFound(project_id))
    }

    /// All projects in id order
    pub fn all(&self) -> Vec<&Project> {
        self.projects.values().collect()
    }

    fn require_manager(&self, caller: &str, action: &'static str) -> LedgerResult<()> {
        if caller != self.manager {
            warn!("⛔ {} tried to {} without manager rights", short(caller), action);
            return Err(LedgerError::ManagerOnly { action });
        }
        Ok(())
    }

    /// Create a new project, moving the seed pool from the manager into escrow
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn create_project(
        &mut self,
        token: &mut TokenLedger,
        caller: &str,
        title: &str,
        options: Vec<String>,
        pool: Amount,
        duration: i64,
        now: u64,
    ) -> LedgerResult<ProjectId> {
        self.require_manager(caller, "create projects")?;

        if title.trim().is_empty() {
            return Err(LedgerError::InvalidTitle);
        }
        if options.len() < 2 {
            return Err(LedgerError::InvalidOptions(format!(
                "need at least 2 options, got {}",
                options.len()
            )));
        }
        if let Some(idx) = options.iter().position(|o| o.trim().is_empty()) {
            return Err(LedgerError::InvalidOptions(format!("option {} is empty", idx)));
        }
        if duration <= 0 {
            return Err(LedgerError::InvalidDuration(duration));
        }
        let end_time = now
            .checked_add(duration as u64)
            .ok_or(LedgerError::Overflow("computing end time"))?;

        // Only fallible mutation; nothing has been written yet
        token.transfer(caller, &self.address, pool)?;

        let id = self.next_project_id;
        self.next_project_id += 1;
        self.projects.insert(
            id,
            Project {
                id,
                title: title.to_string(),
                options,
                total_pool: pool,
                total_bet_amount: 0,
                end_time,
                winner_option_id: None,
                is_active: true,
                manager: caller.to_string(),
                created_at: now,
                settled_at: None,
            },
        );

        info!("📊 Project #{} created: {} (pool {}, closes at {})", id, title, pool, end_time);
        Ok(id)
    }

    /// Place a bet - pulls the stake into escrow and mints a ticket
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn place_bet(
        &mut self,
        token: &mut TokenLedger,
        tickets: &mut TicketRegistry,
        caller: &str,
        project_id: ProjectId,
        option_id: usize,
        amount: Amount,
        now: u64,
    ) -> LedgerResult<TokenId> {
        let project = self.get(project_id)?;
        if !project.is_active {
            return Err(LedgerError::ProjectInactive(project_id));
        }
        if now >= project.end_time {
            return Err(LedgerError::BettingClosed { project_id, end_time: project.end_time });
        }
        project.check_option(option_id)?;
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        let new_total = project
            .total_bet_amount
            .checked_add(amount)
            .ok_or(LedgerError::Overflow("adding bet to project total"))?;

        token.transfer_from(&self.address, caller, &self.address, amount)?;

        let token_id = tickets.mint(caller, project_id, option_id, amount, now);
        if let Some(project) = self.projects.get_mut(&project_id) {
            project.total_bet_amount = new_total;
        }

        info!(
            "🎯 Bet: {} wagered {} on project #{} option {} [ticket #{}]",
            short(caller),
            amount,
            project_id,
            option_id,
            token_id
        );
        Ok(token_id)
    }

    /// Settle a project - pays every winning ticket's current owner from escrow
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn settle_project(
        &mut self,
        token: &mut TokenLedger,
        tickets: &mut TicketRegistry,
        caller: &str,
        project_id: ProjectId,
        winner_option_id: usize,
        now: u64,
    ) -> LedgerResult<SettlementReport> {
        self.require_manager(caller, "settle projects")?;

        let project = self.get(project_id)?;
        if !project.is_active {
            return Err(LedgerError::AlreadySettled(project_id));
        }
        project.check_option(winner_option_id)?;
        let pot = project.pot()?;

        let winning: Vec<(TokenId, String, Amount)> = tickets
            .tickets_for_project(project_id)
            .into_iter()
            .filter(|t| t.option_id == winner_option_id)
            .map(|t| (t.token_id, t.owner.clone(), t.amount))
            .collect();
        let winning_stake: Amount = winning.iter().map(|(_, _, stake)| *stake).sum();

        let (payouts, manager_remainder) = split_pot(pot, &winning);
        if winning_stake == 0 {
            warn!("🕳️  Project #{}: no bets on option {}, pot goes to manager", project_id, winner_option_id);
        }

        let mut payments: Vec<(String, Amount)> = payouts
            .iter()
            .filter(|p| p.amount > 0)
            .map(|p| (p.owner.clone(), p.amount))
            .collect();
        if manager_remainder > 0 {
            payments.push((self.manager.clone(), manager_remainder));
        }

        // Only fallible mutation; escrow always holds every active pot
        token.transfer_batch(&self.address, &payments)?;

        let listings_closed = tickets.delist_project(project_id);
        if let Some(project) = self.projects.get_mut(&project_id) {
            project.winner_option_id = Some(winner_option_id);
            project.is_active = false;
            project.settled_at = Some(now);
        }

        info!(
            "✅ Project #{} settled: option {} wins, pot {} across {} tickets (manager {})",
            project_id,
            winner_option_id,
            pot,
            payouts.len(),
            manager_remainder
        );

        Ok(SettlementReport {
            project_id,
            winner_option_id,
            pot,
            winning_stake,
            payouts,
            manager_remainder,
            listings_closed,
        })
    }
}
