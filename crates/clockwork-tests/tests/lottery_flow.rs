//! End-to-end commit-reveal and open lottery rounds on a full ledger.

use clockwork_core::constants::{LOTTERY_DURATION, MIN_STAKE};
use clockwork_core::error::{ClockworkError, ErrorKind, LotteryError};
use clockwork_core::types::{Hash256, Identity, Secret};
use clockwork_ledger::{Ledger, Operation, Outcome};
use clockwork_lottery::Phase;
use clockwork_tests::helpers::*;

/// Enter players `0..n` with secrets `12345 + i`, funding each stake.
fn enter_all(ledger: &mut Ledger, n: usize) {
    for i in 0..n {
        let p = player(i);
        ledger.fund(p, MIN_STAKE).unwrap();
        let c = commitment(ledger, &p, 12_345 + i as u64);
        ledger.submit(p, Operation::Enter { commitment: c, stake: MIN_STAKE }).unwrap();
    }
}

fn reveal_all(ledger: &mut Ledger, n: usize) {
    for i in 0..n {
        ledger
            .submit(player(i), Operation::Reveal { secret: Secret::from(12_345 + i as u64) })
            .unwrap();
    }
}

#[test]
fn full_round_with_late_entry_and_late_reveal() {
    // Windows of 3 blocks: commit [0, 3), reveal [3, 6).
    let mut ledger = ledger_with_lottery_duration(3);
    enter_all(&mut ledger, 3);
    assert_eq!(ledger.balance_of(&Identity::LOTTERY_ESCROW), 3 * MIN_STAKE);
    assert_eq!(ledger.lottery().round().entries(), 3);

    // A fourth player arrives at height 3: too late.
    let late = player(3);
    ledger.fund(late, MIN_STAKE).unwrap();
    let c = commitment(&ledger, &late, 1);
    let err = ledger.submit(late, Operation::Enter { commitment: c, stake: MIN_STAKE }).unwrap_err();
    assert_eq!(err, ClockworkError::Lottery(LotteryError::CommitClosed { now: 3, commit_closes: 3 }));
    assert_eq!(ledger.balance_of(&late), MIN_STAKE);

    // Reveals at heights 4 and 5.
    assert!(!ledger.is_revealed(&player(0)));
    ledger.submit(player(0), Operation::Reveal { secret: Secret::from(12_345) }).unwrap();
    assert!(ledger.is_revealed(&player(0)));
    let err = ledger.submit(player(0), Operation::Reveal { secret: Secret::from(12_345) }).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StateConflict);

    // Height 6: reveal window closed.
    let err = ledger.submit(player(1), Operation::Reveal { secret: Secret::from(12_346) }).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Window);
    assert_eq!(ledger.lottery().round().players(), &[player(0)]);
    assert_eq!(ledger.lottery().phase(ledger.height()), Phase::AwaitingDraw);

    // Only one revealed player, so the draw is forced.
    let receipt = ledger.submit(id("anyone"), Operation::PickWinner).unwrap();
    assert_eq!(receipt.outcome, Outcome::WinnerPicked { lottery_id: 1, winner: player(0) });
    assert_eq!(ledger.lottery().winner_of(0), Some(player(0)));

    // Unrevealed stakes stay in the pot.
    let receipt = ledger.submit(player(0), Operation::WithdrawPrize).unwrap();
    let Outcome::PrizeWithdrawn { amount, .. } = receipt.outcome else { panic!("unexpected outcome") };
    assert_eq!(amount, 3 * MIN_STAKE);
    assert_eq!(ledger.balance_of(&player(0)), 3 * MIN_STAKE);
}

#[test]
fn reset_opens_strictly_later_windows() {
    let mut ledger = fresh_ledger();
    enter_all(&mut ledger, 2);
    let height = ledger.lottery().round().commit_closes();
    advance_to(&mut ledger, height);
    reveal_all(&mut ledger, 2);
    let old = ledger.lottery().round().clone();
    advance_to(&mut ledger, old.reveal_closes());

    let receipt = ledger.submit(id("keeper"), Operation::PickWinner).unwrap();
    let Outcome::WinnerPicked { winner, .. } = receipt.outcome else { panic!("unexpected outcome") };
    assert!(old.players().contains(&winner));

    let loser = if winner == player(0) { player(1) } else { player(0) };
    let err = ledger.submit(loser, Operation::WithdrawPrize).unwrap_err();
    assert_eq!(err, ClockworkError::Lottery(LotteryError::NotWinner(loser)));

    let now = ledger.height();
    ledger.submit(winner, Operation::WithdrawPrize).unwrap();
    let round = ledger.lottery().round();
    assert!(round.is_blank());
    assert!(round.commit_closes() > old.reveal_closes());
    assert_eq!(round.commit_closes(), now + LOTTERY_DURATION);
    assert_eq!(round.reveal_closes(), round.commit_closes() + LOTTERY_DURATION);
    assert_eq!(ledger.balance_of(&Identity::LOTTERY_ESCROW), 0);
}

#[test]
fn consecutive_rounds_extend_history() {
    let mut ledger = fresh_ledger();
    for round in 0..3u64 {
        enter_all(&mut ledger, 3);
        let height = ledger.lottery().round().commit_closes();
        advance_to(&mut ledger, height);
        reveal_all(&mut ledger, 3);
        let height = ledger.lottery().round().reveal_closes();
        advance_to(&mut ledger, height);
        let receipt = ledger.submit(id("keeper"), Operation::PickWinner).unwrap();
        let Outcome::WinnerPicked { lottery_id, winner } = receipt.outcome else { panic!("unexpected outcome") };
        assert_eq!(lottery_id, round + 1);
        assert_eq!(ledger.lottery().history()[round as usize], winner);
        ledger.submit(winner, Operation::WithdrawPrize).unwrap();
    }
    assert_eq!(ledger.lottery().lottery_id(), 3);
}

#[test]
fn pick_winner_twice_is_rejected() {
    let mut ledger = fresh_ledger();
    enter_all(&mut ledger, 1);
    let height = ledger.lottery().round().commit_closes();
    advance_to(&mut ledger, height);
    reveal_all(&mut ledger, 1);
    let height = ledger.lottery().round().reveal_closes();
    advance_to(&mut ledger, height);
    ledger.submit(id("keeper"), Operation::PickWinner).unwrap();
    let err = ledger.submit(id("keeper"), Operation::PickWinner).unwrap_err();
    assert_eq!(err, ClockworkError::Lottery(LotteryError::WinnerAlreadyPicked));
    assert_eq!(ledger.lottery().lottery_id(), 1);
}

#[test]
fn no_reveals_means_no_draw() {
    let mut ledger = fresh_ledger();
    enter_all(&mut ledger, 2);
    let height = ledger.lottery().round().reveal_closes();
    advance_to(&mut ledger, height);
    let err = ledger.submit(id("keeper"), Operation::PickWinner).unwrap_err();
    assert_eq!(err, ClockworkError::Lottery(LotteryError::NoRevealedPlayers));
    assert_eq!(ledger.lottery().round().pot(), 2 * MIN_STAKE);

    // The round can never close: retries fail the same way and nobody can
    // enter again, so the stakes stay locked.
    ledger.advance(100);
    let err = ledger.submit(id("keeper"), Operation::PickWinner).unwrap_err();
    assert_eq!(err, ClockworkError::Lottery(LotteryError::NoRevealedPlayers));
    let late = player(5);
    ledger.fund(late, MIN_STAKE).unwrap();
    let c = commitment(&ledger, &late, 1);
    let err = ledger.submit(late, Operation::Enter { commitment: c, stake: MIN_STAKE }).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Window);
    assert_eq!(ledger.balance_of(&Identity::LOTTERY_ESCROW), 2 * MIN_STAKE);
}

#[test]
fn entry_below_minimum_stake_keeps_funds() {
    let mut ledger = fresh_ledger();
    let p = player(0);
    ledger.fund(p, MIN_STAKE).unwrap();
    let err = ledger
        .submit(p, Operation::Enter { commitment: Hash256([7; 32]), stake: MIN_STAKE - 1 })
        .unwrap_err();
    assert_eq!(err, ClockworkError::Lottery(LotteryError::InsufficientStake { stake: MIN_STAKE - 1, min: MIN_STAKE }));
    assert_eq!(ledger.balance_of(&p), MIN_STAKE);
    assert_eq!(ledger.balance_of(&Identity::LOTTERY_ESCROW), 0);
}

#[test]
fn open_lottery_round() {
    let mut ledger = fresh_ledger();
    for i in 0..5 {
        ledger.fund(player(i), MIN_STAKE).unwrap();
        ledger.submit(player(i), Operation::JoinDraw { stake: MIN_STAKE }).unwrap();
    }
    assert_eq!(ledger.draw().players().len(), 5);

    let err = ledger.submit(player(1), Operation::Draw).unwrap_err();
    assert_eq!(err, ClockworkError::Lottery(LotteryError::NotOwner(player(1))));

    let receipt = ledger.submit(id("owner"), Operation::Draw).unwrap();
    let Outcome::Drawn { lottery_id, winner, prize } = receipt.outcome else { panic!("unexpected outcome") };
    assert_eq!(lottery_id, 1);
    assert_eq!(prize, 5 * MIN_STAKE);
    assert_eq!(ledger.balance_of(&winner), 5 * MIN_STAKE);
    assert!(ledger.draw().players().is_empty());

    let err = ledger.submit(id("owner"), Operation::Draw).unwrap_err();
    assert_eq!(err, ClockworkError::Lottery(LotteryError::NoPlayers));
}
