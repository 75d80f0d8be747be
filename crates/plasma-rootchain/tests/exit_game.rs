//! Exit game scenarios driven through the root chain facade.
//!
//! Each test deposits real cards through the card registry, moves coins
//! off-ledger by committing operator blocks, and then plays out exits,
//! challenges, finalization and withdrawal.

mod common;

use chrono::Duration;
use common::{Harness, bond, genesis, maturity, t0, transfer, transfer_claim};
use plasma_merkle::MerkleProof;
use plasma_rootchain::{
    AssetRegistry, ExitClaim, FinalizeOutcome, IncludedTransaction, Provenance,
};
use plasma_types::{BlockNumber, CoinState, ExitState, MaturityPhase, PlasmaError, Slot};
use rust_decimal::Decimal;

// ---------------------------------------------------------------------------
// Happy paths
// ---------------------------------------------------------------------------

#[test]
fn deposit_exit_full_lifecycle() {
    let (mut h, cast) = Harness::new();
    let coin = h.deposit(&cast.alice, 1)[0];
    assert_eq!(coin.block, BlockNumber(1));
    assert_eq!(h.cards.owner_of(coin.asset_id), Some(h.chain.address()));
    assert_eq!(h.cards.balance_of(&h.chain.address()), 1);
    assert_eq!(h.cards.balance_of(&cast.alice.address()), 0);

    let filed = h.start_exit(&cast.alice, coin.slot, &ExitClaim::Deposit).unwrap();
    assert_eq!(filed, t0());
    assert_eq!(h.chain.coin_state(coin.slot), CoinState::Exiting);
    assert_eq!(h.chain.bond_balance(&cast.alice.address()).escrowed, bond());

    // Challenge window over, still observing.
    h.advance(Duration::days(3));
    let outcome = h.finalize(coin.slot).unwrap();
    assert!(matches!(
        outcome,
        FinalizeOutcome::NotMatured {
            phase: MaturityPhase::ObservationWindow,
            ..
        }
    ));
    assert_eq!(h.chain.coin_state(coin.slot), CoinState::Exiting);

    h.advance(Duration::days(5));
    let outcome = h.finalize(coin.slot).unwrap();
    assert_eq!(
        outcome,
        FinalizeOutcome::Finalized {
            owner: cast.alice.address(),
            bond: bond(),
        }
    );
    assert_eq!(h.chain.coin_state(coin.slot), CoinState::Exited);

    h.withdraw(&cast.alice, coin.slot).unwrap();
    assert_eq!(h.cards.owner_of(coin.asset_id), Some(cast.alice.address()));
    assert_eq!(h.cards.balance_of(&h.chain.address()), 0);
    assert_eq!(h.cards.balance_of(&cast.alice.address()), 1);

    let ctx = h.ctx(&cast.alice);
    assert_eq!(h.chain.withdraw_bonds(ctx).unwrap(), bond());
    assert!(h.chain.bond_balance(&cast.alice.address()).is_zero());
    h.chain.verify_bond_conservation().unwrap();

    let kinds: Vec<_> = h.chain.events().iter().map(|e| e.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            "DEPOSIT",
            "STARTED_EXIT",
            "FINALIZED_EXIT",
            "WITHDREW",
            "WITHDREW_BONDS"
        ]
    );
}

#[test]
fn transfer_exit_with_genesis_prior() {
    let (mut h, cast) = Harness::new();
    let coin = h.deposit(&cast.alice, 1)[0];
    let to_bob = h.submit_one(1000, transfer(&cast.alice, coin.slot, coin.block, &cast.bob));

    let claim = transfer_claim(to_bob, genesis(&cast.alice, coin.slot));
    h.start_exit(&cast.bob, coin.slot, &claim).unwrap();

    let exit = h.chain.exit(coin.slot).unwrap();
    assert_eq!(exit.owner, cast.bob.address());
    assert_eq!(exit.prev_owner, cast.alice.address());
    assert_eq!(exit.prior_block, coin.block);
    assert_eq!(exit.exit_block, BlockNumber(1000));

    h.advance(maturity());
    assert!(h.finalize(coin.slot).unwrap().is_finalized());
    assert_eq!(h.chain.coin(coin.slot).unwrap().owner, cast.bob.address());

    h.withdraw(&cast.bob, coin.slot).unwrap();
    assert_eq!(h.cards.owner_of(coin.asset_id), Some(cast.bob.address()));
}

#[test]
fn exit_after_two_transfers() {
    let (mut h, cast) = Harness::new();
    let coin = h.deposit(&cast.alice, 1)[0];
    let to_bob = h.submit_one(1000, transfer(&cast.alice, coin.slot, coin.block, &cast.bob));
    let to_charlie = h.submit_one(
        2000,
        transfer(&cast.bob, coin.slot, BlockNumber(1000), &cast.charlie),
    );

    let claim = transfer_claim(to_charlie, Provenance::Transfer(to_bob));
    h.start_exit(&cast.charlie, coin.slot, &claim).unwrap();

    let exit = h.chain.exit(coin.slot).unwrap();
    assert_eq!(exit.prev_owner, cast.bob.address());
    assert_eq!(exit.prior_block, BlockNumber(1000));
    assert_eq!(exit.exit_block, BlockNumber(2000));

    h.advance(maturity());
    assert!(h.finalize(coin.slot).unwrap().is_finalized());
    h.withdraw(&cast.charlie, coin.slot).unwrap();
    assert_eq!(h.cards.owner_of(coin.asset_id), Some(cast.charlie.address()));
}

// ---------------------------------------------------------------------------
// Rejected exits
// ---------------------------------------------------------------------------

#[test]
fn exit_by_non_recipient_rejected() {
    let (mut h, cast) = Harness::new();
    let coin = h.deposit(&cast.alice, 1)[0];
    let to_bob = h.submit_one(1000, transfer(&cast.alice, coin.slot, coin.block, &cast.bob));

    let claim = transfer_claim(to_bob, genesis(&cast.alice, coin.slot));
    let err = h.start_exit(&cast.charlie, coin.slot, &claim).unwrap_err();
    assert!(matches!(err, PlasmaError::NotOwner { .. }));

    let err = h
        .start_exit(&cast.bob, coin.slot, &ExitClaim::Deposit)
        .unwrap_err();
    assert!(matches!(err, PlasmaError::NotOwner { .. }));
    assert_eq!(h.chain.coin_state(coin.slot), CoinState::Deposited);
}

#[test]
fn skipped_hop_is_broken_history() {
    let (mut h, cast) = Harness::new();
    let coin = h.deposit(&cast.alice, 1)[0];
    h.submit_one(1000, transfer(&cast.alice, coin.slot, coin.block, &cast.bob));
    let to_charlie = h.submit_one(
        2000,
        transfer(&cast.bob, coin.slot, BlockNumber(1000), &cast.charlie),
    );

    let claim = transfer_claim(to_charlie, genesis(&cast.alice, coin.slot));
    let err = h.start_exit(&cast.charlie, coin.slot, &claim).unwrap_err();
    assert!(matches!(err, PlasmaError::BrokenHistory { .. }));
}

#[test]
fn only_one_active_exit_per_coin() {
    let (mut h, cast) = Harness::new();
    let coin = h.deposit(&cast.alice, 1)[0];
    h.start_exit(&cast.alice, coin.slot, &ExitClaim::Deposit).unwrap();

    let err = h
        .start_exit(&cast.alice, coin.slot, &ExitClaim::Deposit)
        .unwrap_err();
    assert!(matches!(err, PlasmaError::AlreadyExiting(_)));
    assert_eq!(
        h.chain.bond_balance(&cast.alice.address()).escrowed,
        bond(),
        "second bond not taken"
    );
}

#[test]
fn bond_must_be_exact() {
    let (mut h, cast) = Harness::new();
    let coin = h.deposit(&cast.alice, 1)[0];

    for posted in [Decimal::ZERO, Decimal::new(5, 2), Decimal::new(2, 1)] {
        let ctx = h.ctx(&cast.alice).with_value(posted);
        let err = h
            .chain
            .start_exit(ctx, coin.slot, &ExitClaim::Deposit)
            .unwrap_err();
        assert!(matches!(err, PlasmaError::InsufficientBond { .. }));
    }
    assert_eq!(h.chain.coin_state(coin.slot), CoinState::Deposited);
    assert!(h.chain.exit(coin.slot).is_none());
    assert_eq!(h.chain.events().len(), 1);
}

#[test]
fn exit_of_unknown_coin_rejected() {
    let (mut h, cast) = Harness::new();
    let err = h
        .start_exit(&cast.alice, Slot(42), &ExitClaim::Deposit)
        .unwrap_err();
    assert!(matches!(err, PlasmaError::CoinNotFound(_)));
}

// ---------------------------------------------------------------------------
// Challenges
// ---------------------------------------------------------------------------

#[test]
fn spent_deposit_exit_is_challenged() {
    let (mut h, cast) = Harness::new();
    let coin = h.deposit(&cast.alice, 1)[0];
    let to_bob = h.submit_one(1000, transfer(&cast.alice, coin.slot, coin.block, &cast.bob));

    // Alice already sent the coin to Bob and tries to exit anyway.
    h.start_exit(&cast.alice, coin.slot, &ExitClaim::Deposit).unwrap();
    h.advance(Duration::days(1));
    let ctx = h.ctx(&cast.bob);
    h.chain.challenge_after(ctx, coin.slot, &to_bob).unwrap();

    assert_eq!(h.chain.coin_state(coin.slot), CoinState::Deposited);
    assert_eq!(h.chain.exit(coin.slot).unwrap().state, ExitState::Challenged);
    assert!(h.chain.exit_game().queue().is_empty());
    assert!(h.chain.bond_balance(&cast.alice.address()).is_zero());
    assert_eq!(h.chain.bond_balance(&cast.bob.address()).withdrawable, bond());

    // Bob now exits with the real history.
    let claim = transfer_claim(to_bob, genesis(&cast.alice, coin.slot));
    h.start_exit(&cast.bob, coin.slot, &claim).unwrap();
    h.advance(maturity());
    assert!(h.finalize(coin.slot).unwrap().is_finalized());
    h.withdraw(&cast.bob, coin.slot).unwrap();

    let ctx = h.ctx(&cast.bob);
    assert_eq!(h.chain.withdraw_bonds(ctx).unwrap(), Decimal::new(2, 1));
    h.chain.verify_bond_conservation().unwrap();
}

#[test]
fn double_spend_exit_is_challenged() {
    let (mut h, cast) = Harness::new();
    let coin = h.deposit(&cast.alice, 1)[0];
    let to_bob = h.submit_one(1000, transfer(&cast.alice, coin.slot, coin.block, &cast.bob));
    // Alice spends the same deposit again, to Charlie.
    let to_charlie = h.submit_one(
        2000,
        transfer(&cast.alice, coin.slot, coin.block, &cast.charlie),
    );

    let claim = transfer_claim(to_charlie, genesis(&cast.alice, coin.slot));
    h.start_exit(&cast.charlie, coin.slot, &claim).unwrap();

    let ctx = h.ctx(&cast.bob);
    h.chain.challenge_between(ctx, coin.slot, &to_bob).unwrap();
    assert_eq!(h.chain.coin_state(coin.slot), CoinState::Deposited);
    assert_eq!(h.chain.bond_balance(&cast.bob.address()).withdrawable, bond());

    let kinds: Vec<_> = h.chain.events().iter().map(|e| e.kind()).collect();
    assert_eq!(kinds.last(), Some(&"CHALLENGED_EXIT"));
}

#[test]
fn invalid_challenges_leave_exit_pending() {
    let (mut h, cast) = Harness::new();
    let coin = h.deposit(&cast.alice, 1)[0];
    let to_bob = h.submit_one(1000, transfer(&cast.alice, coin.slot, coin.block, &cast.bob));
    let claim = transfer_claim(to_bob.clone(), genesis(&cast.alice, coin.slot));
    h.start_exit(&cast.bob, coin.slot, &claim).unwrap();

    // The exiting transaction itself is not between prior and exit.
    let ctx = h.ctx(&cast.charlie);
    let err = h.chain.challenge_between(ctx, coin.slot, &to_bob).unwrap_err();
    assert!(matches!(err, PlasmaError::InvalidChallenge { .. }));

    // A later spend not signed by the exitor.
    let forged = h.submit_one(
        2000,
        transfer(&cast.alice, coin.slot, BlockNumber(1000), &cast.charlie),
    );
    let err = h.chain.challenge_after(ctx, coin.slot, &forged).unwrap_err();
    assert!(matches!(err, PlasmaError::InvalidChallenge { .. }));

    // A genuine spend with no valid inclusion.
    let ctx = h.ctx(&h.authority);
    h.chain
        .submit_block(ctx, BlockNumber(3000), [7; 32])
        .unwrap();
    let unproven = IncludedTransaction::new(
        transfer(&cast.bob, coin.slot, BlockNumber(1000), &cast.charlie),
        BlockNumber(3000),
        MerkleProof::default(),
    );
    let ctx = h.ctx(&cast.charlie);
    let err = h.chain.challenge_after(ctx, coin.slot, &unproven).unwrap_err();
    assert!(matches!(err, PlasmaError::InvalidProof { .. }));

    assert_eq!(h.chain.coin_state(coin.slot), CoinState::Exiting);
    assert!(h.chain.exit(coin.slot).unwrap().is_pending());
    h.advance(maturity());
    assert!(h.finalize(coin.slot).unwrap().is_finalized());
}

#[test]
fn challenge_without_exit_rejected() {
    let (mut h, cast) = Harness::new();
    let coin = h.deposit(&cast.alice, 1)[0];
    let to_bob = h.submit_one(1000, transfer(&cast.alice, coin.slot, coin.block, &cast.bob));
    let ctx = h.ctx(&cast.charlie);
    let err = h.chain.challenge_after(ctx, coin.slot, &to_bob).unwrap_err();
    assert!(matches!(err, PlasmaError::ExitNotFound(_)));
}

#[test]
fn challenge_during_observation_window_is_upheld() {
    let (mut h, cast) = Harness::new();
    let coin = h.deposit(&cast.alice, 1)[0];
    let to_bob = h.submit_one(1000, transfer(&cast.alice, coin.slot, coin.block, &cast.bob));
    h.start_exit(&cast.alice, coin.slot, &ExitClaim::Deposit).unwrap();

    h.advance(Duration::days(4));
    let ctx = h.ctx(&cast.bob);
    h.chain.challenge_after(ctx, coin.slot, &to_bob).unwrap();

    h.advance(Duration::days(10));
    assert_eq!(
        h.finalize(coin.slot).unwrap(),
        FinalizeOutcome::NoPendingExit
    );
}

// ---------------------------------------------------------------------------
// Finalization ordering
// ---------------------------------------------------------------------------

#[test]
fn matured_exits_finalize_in_priority_order() {
    let (mut h, cast) = Harness::new();
    let a = h.deposit(&cast.alice, 1)[0];
    let b = h.deposit(&cast.bob, 1)[0];
    let c = h.deposit(&cast.charlie, 1)[0];

    // Filed newest coin first; priority follows the exit block.
    h.start_exit(&cast.charlie, c.slot, &ExitClaim::Deposit).unwrap();
    h.advance(Duration::hours(1));
    h.start_exit(&cast.bob, b.slot, &ExitClaim::Deposit).unwrap();
    h.advance(Duration::hours(1));
    h.start_exit(&cast.alice, a.slot, &ExitClaim::Deposit).unwrap();

    h.advance(Duration::days(9));
    let ctx = h.ctx(&cast.dylan);
    let outcomes = h.chain.finalize_matured(ctx).unwrap();
    let order: Vec<_> = outcomes.iter().map(|o| o.slot).collect();
    assert_eq!(order, vec![a.slot, b.slot, c.slot]);
    assert!(outcomes.iter().all(|o| matches!(&o.result, Ok(r) if r.is_finalized())));
}

#[test]
fn batch_finalization_isolates_slots() {
    let (mut h, cast) = Harness::new();
    let early = h.deposit(&cast.alice, 1)[0];
    let late = h.deposit(&cast.bob, 1)[0];

    h.start_exit(&cast.alice, early.slot, &ExitClaim::Deposit).unwrap();
    h.advance(Duration::days(2));
    h.start_exit(&cast.bob, late.slot, &ExitClaim::Deposit).unwrap();
    h.advance(Duration::days(6));

    let ctx = h.ctx(&cast.dylan);
    let outcomes = h
        .chain
        .finalize_exits(ctx, &[Slot(99), late.slot, early.slot])
        .unwrap();
    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].slot, early.slot);
    assert!(matches!(&outcomes[0].result, Ok(r) if r.is_finalized()));
    assert_eq!(outcomes[1].slot, late.slot);
    assert!(matches!(
        &outcomes[1].result,
        Ok(FinalizeOutcome::NotMatured { .. })
    ));
    assert!(matches!(
        &outcomes[2].result,
        Ok(FinalizeOutcome::NoPendingExit)
    ));

    assert_eq!(h.chain.coin_state(early.slot), CoinState::Exited);
    assert_eq!(h.chain.coin_state(late.slot), CoinState::Exiting);
}

#[test]
fn finalize_is_idempotent() {
    let (mut h, cast) = Harness::new();
    let coin = h.deposit(&cast.alice, 1)[0];
    h.start_exit(&cast.alice, coin.slot, &ExitClaim::Deposit).unwrap();
    h.advance(maturity());
    assert!(h.finalize(coin.slot).unwrap().is_finalized());
    assert_eq!(h.finalize(coin.slot).unwrap(), FinalizeOutcome::NoPendingExit);
    assert_eq!(
        h.chain.bond_balance(&cast.alice.address()).withdrawable,
        bond(),
        "bond released once"
    );
    let err = h
        .start_exit(&cast.alice, coin.slot, &ExitClaim::Deposit)
        .unwrap_err();
    assert!(matches!(err, PlasmaError::InvalidExit { .. }));
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

#[test]
fn clock_regression_rejected() {
    let (mut h, cast) = Harness::new();
    h.advance(Duration::days(1));
    let coin = h.deposit(&cast.alice, 1)[0];

    h.now = t0();
    let err = h
        .start_exit(&cast.alice, coin.slot, &ExitClaim::Deposit)
        .unwrap_err();
    assert!(matches!(err, PlasmaError::ClockRegression { .. }));
    assert_eq!(h.chain.coin_state(coin.slot), CoinState::Deposited);
}
