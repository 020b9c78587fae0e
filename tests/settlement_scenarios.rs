/// End-to-end ledger scenarios run directly against the library
///
/// Covers the settlement arithmetic, the betting window, double settlement
/// and the value-conservation / stake-tracking invariants.

use std::sync::Arc;

use betticket_ledger::{BettingSystem, ErrorKind, LedgerError, ManualClock, ProjectId};
use tokio_test::{assert_err, assert_ok};

// ============================================================================
// TEST ACCOUNTS
// ============================================================================

const MANAGER: &str = "0xMANAGER";
const X: &str = "0xACCOUNT_X";
const Y: &str = "0xACCOUNT_Y";
const Z: &str = "0xACCOUNT_Z";
const AIRDROP: u64 = 10_000;
const START: u64 = 1_700_000_000;

// ============================================================================
// HELPERS
// ============================================================================

fn setup() -> (BettingSystem, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(START));
    let mut sys = BettingSystem::with_clock(MANAGER, "BettingToken", "BT", AIRDROP, clock.clone());
    for account in [MANAGER, X, Y, Z] {
        assert_ok!(sys.airdrop(account));
    }
    (sys, clock)
}

fn bet(sys: &mut BettingSystem, who: &str, project: ProjectId, option: usize, amount: u64) -> u64 {
    let spender = sys.address().to_string();
    let current = sys.allowance(who, &spender);
    assert_ok!(sys.approve(who, &spender, current + amount));
    assert_ok!(sys.place_bet(who, project, option, amount))
}

fn match_a(sys: &mut BettingSystem) -> ProjectId {
    assert_ok!(sys.create_project(MANAGER, "Match A", vec!["Home".into(), "Away".into()], 1000, 3600))
}

/// Every token ever airdropped is somewhere: an account or escrow
fn assert_supply_conserved(sys: &BettingSystem) {
    let held: u64 = [MANAGER, X, Y, Z, sys.address()]
        .iter()
        .map(|a| sys.balance_of(a))
        .sum();
    assert_eq!(held, sys.total_supply());
}

fn assert_bet_totals_match_tickets(sys: &BettingSystem) {
    for project in sys.get_projects() {
        let ticket_total: u64 = (0..project.options.len())
            .flat_map(|opt| sys.get_betting_tickets(project.id, opt))
            .map(|id| sys.ticket_infos(id).unwrap().amount)
            .sum();
        assert_eq!(project.total_bet_amount, ticket_total, "project {}", project.id);
    }
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn test_winner_takes_whole_pot() {
    let (mut sys, _) = setup();
    let id = match_a(&mut sys);
    assert_eq!(id, 1);

    bet(&mut sys, X, id, 0, 300);
    bet(&mut sys, Y, id, 1, 100);
    assert_bet_totals_match_tickets(&sys);

    let manager_before = sys.balance_of(MANAGER);
    let report = assert_ok!(sys.settle_project(MANAGER, id, 0));

    assert_eq!(report.pot, 1400);
    assert_eq!(report.payouts.len(), 1);
    assert_eq!(report.payouts[0].owner, X);
    assert_eq!(report.payouts[0].amount, 1400);
    assert_eq!(report.manager_remainder, 0);
    assert_eq!(sys.balance_of(X), AIRDROP - 300 + 1400);
    assert_eq!(sys.balance_of(Y), AIRDROP - 100);
    assert_eq!(sys.balance_of(MANAGER), manager_before);
    assert_eq!(sys.balance_of(sys.address()), 0);
    assert_supply_conserved(&sys);
}

#[test]
fn test_unbacked_winner_sends_pot_to_manager() {
    let (mut sys, _) = setup();
    let id = assert_ok!(sys.create_project(
        MANAGER,
        "Match A",
        vec!["Home".into(), "Away".into(), "Draw".into()],
        1000,
        3600
    ));
    bet(&mut sys, X, id, 0, 300);
    bet(&mut sys, Y, id, 1, 100);

    let manager_before = sys.balance_of(MANAGER);
    let report = assert_ok!(sys.settle_project(MANAGER, id, 2));

    assert!(report.payouts.is_empty());
    assert_eq!(report.winning_stake, 0);
    assert_eq!(report.manager_remainder, 1400);
    assert_eq!(sys.balance_of(MANAGER), manager_before + 1400);
    assert_eq!(sys.get_project(id).unwrap().winner_option_id, Some(2));
    assert_supply_conserved(&sys);
}

#[test]
fn test_rounding_dust_goes_to_manager() {
    let (mut sys, _) = setup();
    let id = assert_ok!(sys.create_project(MANAGER, "Odd pot", vec!["A".into(), "B".into()], 1, 3600));
    bet(&mut sys, X, id, 0, 1);
    bet(&mut sys, Y, id, 0, 1);
    bet(&mut sys, Z, id, 0, 1);

    // pot 4 over three equal stakes: 1 each, 1 left over
    let report = assert_ok!(sys.settle_project(MANAGER, id, 0));
    assert!(report.payouts.iter().all(|p| p.amount == 1));
    assert_eq!(report.manager_remainder, 1);
    assert_eq!(report.total_paid(), report.pot);
    assert_supply_conserved(&sys);
}

#[test]
fn test_proportional_split() {
    let (mut sys, _) = setup();
    let id = match_a(&mut sys);
    bet(&mut sys, X, id, 0, 300);
    bet(&mut sys, Z, id, 0, 100);
    bet(&mut sys, Y, id, 1, 600);

    // pot 2000, X holds 3/4 of the winning stake, Z 1/4
    let report = assert_ok!(sys.settle_project(MANAGER, id, 0));
    assert_eq!(report.pot, 2000);
    assert_eq!(sys.balance_of(X), AIRDROP - 300 + 1500);
    assert_eq!(sys.balance_of(Z), AIRDROP - 100 + 500);
    assert_eq!(report.manager_remainder, 0);
    assert_supply_conserved(&sys);
}

#[test]
fn test_bet_after_end_time_is_rejected() {
    let (mut sys, clock) = setup();
    let id = match_a(&mut sys);
    clock.advance(3600);

    let spender = sys.address().to_string();
    assert_ok!(sys.approve(X, &spender, 100));
    let err = assert_err!(sys.place_bet(X, id, 0, 100));
    assert_eq!(err.kind(), ErrorKind::StateConflict);
    assert!(matches!(err, LedgerError::BettingClosed { .. }));
    assert_eq!(sys.balance_of(X), AIRDROP);
    assert_eq!(sys.get_project(id).unwrap().total_bet_amount, 0);
}

#[test]
fn test_double_settlement_is_rejected() {
    let (mut sys, _) = setup();
    let id = match_a(&mut sys);
    bet(&mut sys, X, id, 0, 300);
    bet(&mut sys, Y, id, 1, 100);

    assert_ok!(sys.settle_project(MANAGER, id, 0));
    let balances: Vec<u64> = [MANAGER, X, Y].iter().map(|a| sys.balance_of(a)).collect();
    let project = sys.get_project(id).unwrap().clone();

    let err = assert_err!(sys.settle_project(MANAGER, id, 1));
    assert_eq!(err, LedgerError::AlreadySettled(id));
    assert_eq!(err.kind(), ErrorKind::StateConflict);

    assert_eq!(sys.get_project(id).unwrap(), &project);
    let after: Vec<u64> = [MANAGER, X, Y].iter().map(|a| sys.balance_of(a)).collect();
    assert_eq!(balances, after);
}

#[test]
fn test_unapproved_purchase_keeps_listing() {
    let (mut sys, _) = setup();
    let id = match_a(&mut sys);
    let ticket = bet(&mut sys, X, id, 0, 300);
    assert_ok!(sys.list_ticket(X, ticket, 50));

    let err = assert_err!(sys.buy_ticket(Y, ticket));
    assert_eq!(err.kind(), ErrorKind::InsufficientFunds);

    let info = sys.ticket_infos(ticket).unwrap();
    assert!(info.is_listed);
    assert_eq!(info.list_price, 50);
    assert_eq!(info.owner, X);
    assert_eq!(sys.balance_of(Y), AIRDROP);
}

#[test]
fn test_underfunded_purchase_is_atomic() {
    let (mut sys, _) = setup();
    let id = match_a(&mut sys);
    let ticket = bet(&mut sys, X, id, 0, 300);
    assert_ok!(sys.list_ticket(X, ticket, AIRDROP + 1));

    let market = sys.get_lottery_ticket_address().to_string();
    assert_ok!(sys.approve(Y, &market, AIRDROP + 1));
    let err = assert_err!(sys.buy_ticket(Y, ticket));
    assert!(matches!(err, LedgerError::InsufficientBalance { .. }));

    assert_eq!(sys.ticket_infos(ticket).unwrap().owner, X);
    assert_eq!(sys.allowance(Y, &market), AIRDROP + 1);
    assert_eq!(sys.balance_of(X), AIRDROP - 300);
}

#[test]
fn test_resold_ticket_keeps_stake_fields() {
    let (mut sys, _) = setup();
    let id = match_a(&mut sys);
    let ticket = bet(&mut sys, X, id, 1, 250);
    let market = sys.get_lottery_ticket_address().to_string();

    assert_ok!(sys.list_ticket(X, ticket, 40));
    assert_ok!(sys.approve(Y, &market, 40));
    assert_ok!(sys.buy_ticket(Y, ticket));
    assert_ok!(sys.list_ticket(Y, ticket, 90));
    assert_ok!(sys.approve(Z, &market, 90));
    assert_ok!(sys.buy_ticket(Z, ticket));

    let info = sys.ticket_infos(ticket).unwrap();
    assert_eq!((info.betting_id, info.option_id, info.amount), (id, 1, 250));
    assert_eq!(info.owner, Z);
    assert_eq!(sys.balance_of(Y), AIRDROP - 40 + 90);
    assert_bet_totals_match_tickets(&sys);
    assert_supply_conserved(&sys);
}

#[test]
fn test_airdrop_claimed_once_regardless_of_order() {
    let (mut sys, _) = setup();
    for _ in 0..3 {
        let err = assert_err!(sys.airdrop(X));
        assert_eq!(err.kind(), ErrorKind::StateConflict);
    }
    assert_eq!(sys.balance_of(X), AIRDROP);
    assert_eq!(sys.total_supply(), AIRDROP * 4);
}

#[test]
fn test_non_manager_cannot_create_or_settle() {
    let (mut sys, _) = setup();
    let err = assert_err!(sys.create_project(X, "Mine", vec!["A".into(), "B".into()], 0, 60));
    assert_eq!(err.kind(), ErrorKind::Authorization);

    let id = match_a(&mut sys);
    let err = assert_err!(sys.settle_project(X, id, 0));
    assert_eq!(err.kind(), ErrorKind::Authorization);
    assert!(sys.get_project(id).unwrap().is_active);
}

#[test]
fn test_many_projects_keep_invariants() {
    let (mut sys, clock) = setup();
    let mut ids = Vec::new();
    for round in 0..4u64 {
        let id = assert_ok!(sys.create_project(
            MANAGER,
            &format!("Round {}", round),
            vec!["A".into(), "B".into(), "C".into()],
            round * 7,
            100 + round as i64
        ));
        ids.push(id);
        bet(&mut sys, X, id, (round % 3) as usize, 11 + round);
        bet(&mut sys, Y, id, ((round + 1) % 3) as usize, 13);
        bet(&mut sys, Z, id, (round % 3) as usize, 17);
    }
    assert_eq!(ids, vec![1, 2, 3, 4]);
    assert_eq!(sys.get_project_count(), 4);
    assert_bet_totals_match_tickets(&sys);

    clock.advance(1_000);
    for (i, id) in ids.iter().enumerate() {
        let report = assert_ok!(sys.settle_project(MANAGER, *id, i % 3));
        assert_eq!(report.total_paid(), report.pot);
    }
    assert_bet_totals_match_tickets(&sys);
    assert_supply_conserved(&sys);
    assert_eq!(sys.balance_of(sys.address()), 0);
}

#[test]
fn test_ledger_accounts_cannot_issue_commands() {
    let (mut sys, _) = setup();
    let id = match_a(&mut sys);
    bet(&mut sys, X, id, 0, 300);

    let escrow = sys.address().to_string();
    let market = sys.get_lottery_ticket_address().to_string();
    let escrow_before = sys.balance_of(&escrow);

    // Draining escrow directly
    let err = assert_err!(sys.transfer(&escrow, Y, 1000));
    assert_eq!(err, LedgerError::ReservedAccount { caller: escrow.clone() });
    assert_eq!(err.kind(), ErrorKind::Authorization);

    // Betting with escrow's own funds
    assert_err!(sys.approve(&escrow, &escrow, 1300));
    assert_eq!(sys.allowance(&escrow, &escrow), 0);
    assert_err!(sys.place_bet(&escrow, id, 1, 1300));

    for caller in [escrow.as_str(), market.as_str()] {
        let err = assert_err!(sys.airdrop(caller));
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert_err!(sys.buy_ticket(caller, 1));
        assert_err!(sys.list_ticket(caller, 1, 10));
        assert_err!(sys.unlist_ticket(caller, 1));
        assert_err!(sys.create_project(caller, "Spoof", vec!["A".into(), "B".into()], 0, 60));
    }

    assert_eq!(sys.balance_of(&escrow), escrow_before);
    assert_eq!(sys.get_project(id).unwrap().total_bet_amount, 300);
    assert_bet_totals_match_tickets(&sys);

    let report = assert_ok!(sys.settle_project(MANAGER, id, 0));
    assert_eq!(report.pot, 1300);
    assert_eq!(sys.balance_of(X), AIRDROP - 300 + 1300);
    assert_supply_conserved(&sys);
}
