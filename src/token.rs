/// Token Ledger - fungible betting token (ERC20-style)
///
/// Tracks balances, spender allowances and the one-time airdrop claim set.
///
/// KEY RULES:
/// - `transfer` moves the caller's own funds, no allowance involved
/// - `transfer_from` spends an allowance granted through `approve`
/// - every mutation checks first and writes second, so a rejected call
///   leaves balances, allowances and the claim set untouched
/// - tokens only enter circulation through `airdrop`, so no balance can
///   exceed `total_supply`

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

use crate::errors::{LedgerError, LedgerResult};
use crate::{short, Amount};

// ============================================================================
// TOKEN LEDGER
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenLedger {
    name: String,
    symbol: String,
    airdrop_amount: Amount,
    total_supply: Amount,
    /// Account -> balance. Accounts with no entry hold zero.
    balances: BTreeMap<String, Amount>,
    /// Owner -> (spender -> remaining approved amount)
    allowances: BTreeMap<String, BTreeMap<String, Amount>>,
    /// Accounts that already received the airdrop
    claimed_airdrop: BTreeSet<String>,
}

impl TokenLedger {
    pub fn new(name: &str, symbol: &str, airdrop_amount: Amount) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            airdrop_amount,
            total_supply: 0,
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
            claimed_airdrop: BTreeSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    pub fn airdrop_amount(&self) -> Amount {
        self.airdrop_amount
    }

    pub fn balance_of(&self, account: &str) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: &str, spender: &str) -> Amount {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or(0)
    }

    pub fn has_claimed_airdrop(&self, account: &str) -> bool {
        self.claimed_airdrop.contains(account)
    }

    /// Claim the fixed airdrop. Exactly once per account.
    pub fn airdrop(&mut self, account: &str) -> LedgerResult<Amount> {
        if self.claimed_airdrop.contains(account) {
            return Err(LedgerError::AlreadyClaimed(account.to_string()));
        }
        let new_supply = self
            .total_supply
            .checked_add(self.airdrop_amount)
            .ok_or(LedgerError::Overflow("minting airdrop"))?;

        self.claimed_airdrop.insert(account.to_string());
        self.total_supply = new_supply;
        *self.balances.entry(account.to_string()).or_insert(0) += self.airdrop_amount;

        info!("🪂 Airdrop: {} claimed {} {}", short(account), self.airdrop_amount, self.symbol);
        Ok(self.balance_of(account))
    }

    /// Set (not add to) the amount `spender` may move out of `owner`.
    pub fn approve(&mut self, owner: &str, spender: &str, amount: Amount) {
        self.allowances
            .entry(owner.to_string())
            .or_default()
            .insert(spender.to_string(), amount);
        debug!("✍️  Approve: {} lets {} spend {}", short(owner), short(spender), amount);
    }

    /// Move the caller's own funds.
    pub fn transfer(&mut self, from: &str, to: &str, amount: Amount) -> LedgerResult<()> {
        self.check_balance(from, amount)?;
        self.move_funds(from, to, amount);
        Ok(())
    }

    /// Check that `transfer_from` would succeed, without touching state.
    pub fn check_transfer_from(&self, spender: &str, from: &str, amount: Amount) -> LedgerResult<()> {
        let approved = self.allowance(from, spender);
        if amount > approved {
            return Err(LedgerError::InsufficientAllowance { approved, requested: amount });
        }
        self.check_balance(from, amount)
    }

    /// Move funds out of `from` on the strength of an allowance held by `spender`.
    pub fn transfer_from(
        &mut self,
        spender: &str,
        from: &str,
        to: &str,
        amount: Amount,
    ) -> LedgerResult<()> {
        self.check_transfer_from(spender, from, amount)?;

        if let Some(remaining) = self
            .allowances
            .get_mut(from)
            .and_then(|spenders| spenders.get_mut(spender))
        {
            *remaining -= amount;
        }
        self.move_funds(from, to, amount);
        Ok(())
    }

    /// Pay several recipients out of one account as a single step.
    /// Either every payment lands or none does.
    pub fn transfer_batch(&mut self, from: &str, payments: &[(String, Amount)]) -> LedgerResult<Amount> {
        let total = payments
            .iter()
            .try_fold(0u64, |acc, (_, amount)| acc.checked_add(*amount))
            .ok_or(LedgerError::Overflow("summing batch payments"))?;
        self.check_balance(from, total)?;

        for (to, amount) in payments {
            self.move_funds(from, to, *amount);
        }
        Ok(total)
    }

    fn check_balance(&self, account: &str, amount: Amount) -> LedgerResult<()> {
        let available = self.balance_of(account);
        if amount > available {
            return Err(LedgerError::InsufficientBalance { available, requested: amount });
        }
        Ok(())
    }

    /// Caller must have checked the sender's balance.
    fn move_funds(&mut self, from: &str, to: &str, amount: Amount) {
        if amount == 0 || from == to {
            return;
        }
        if let Some(bal) = self.balances.get_mut(from) {
            *bal -= amount;
        }
        *self.balances.entry(to.to_string()).or_insert(0) += amount;
        debug!("💸 Transfer: {} -> {} ({})", short(from), short(to), amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn funded() -> TokenLedger {
        let mut token = TokenLedger::new("BettingToken", "BT", 1000);
        token.airdrop("alice").unwrap();
        token
    }

    #[test]
    fn test_airdrop_exactly_once() {
        let mut token = funded();
        assert_eq!(token.balance_of("alice"), 1000);
        assert!(token.has_claimed_airdrop("alice"));

        let err = token.airdrop("alice").unwrap_err();
        assert_eq!(err, LedgerError::AlreadyClaimed("alice".into()));
        assert_eq!(token.balance_of("alice"), 1000);
        assert_eq!(token.total_supply(), 1000);
    }

    #[test]
    fn test_transfer() {
        let mut token = funded();
        token.transfer("alice", "bob", 300).unwrap();
        assert_eq!(token.balance_of("alice"), 700);
        assert_eq!(token.balance_of("bob"), 300);

        let err = token.transfer("bob", "alice", 301).unwrap_err();
        assert_eq!(err, LedgerError::InsufficientBalance { available: 300, requested: 301 });
        assert_eq!(token.balance_of("bob"), 300);
    }

    #[test]
    fn test_self_transfer_keeps_balance() {
        let mut token = funded();
        token.transfer("alice", "alice", 400).unwrap();
        assert_eq!(token.balance_of("alice"), 1000);
    }

    #[test]
    fn test_transfer_from_spends_allowance() {
        let mut token = funded();
        token.approve("alice", "market", 250);

        token.transfer_from("market", "alice", "bob", 200).unwrap();
        assert_eq!(token.allowance("alice", "market"), 50);
        assert_eq!(token.balance_of("bob"), 200);

        let err = token.transfer_from("market", "alice", "bob", 51).unwrap_err();
        assert_eq!(err, LedgerError::InsufficientAllowance { approved: 50, requested: 51 });
        assert_eq!(token.balance_of("alice"), 800);
        assert_eq!(token.allowance("alice", "market"), 50);
    }

    #[test]
    fn test_transfer_from_without_funds_keeps_allowance() {
        let mut token = funded();
        token.approve("carol", "market", 500);
        let err = token.transfer_from("market", "carol", "bob", 10).unwrap_err();
        assert_eq!(err, LedgerError::InsufficientBalance { available: 0, requested: 10 });
        assert_eq!(token.allowance("carol", "market"), 500);
    }

    #[test]
    fn test_approve_overwrites() {
        let mut token = funded();
        token.approve("alice", "market", 100);
        token.approve("alice", "market", 30);
        assert_eq!(token.allowance("alice", "market"), 30);
    }

    #[test]
    fn test_batch_is_all_or_nothing() {
        let mut token = funded();
        let payments = vec![("bob".to_string(), 600), ("carol".to_string(), 600)];
        assert!(token.transfer_batch("alice", &payments).is_err());
        assert_eq!(token.balance_of("alice"), 1000);
        assert_eq!(token.balance_of("bob"), 0);

        let payments = vec![("bob".to_string(), 600), ("carol".to_string(), 400)];
        assert_eq!(token.transfer_batch("alice", &payments).unwrap(), 1000);
        assert_eq!(token.balance_of("alice"), 0);
        assert_eq!(token.balance_of("carol"), 400);
    }
}
