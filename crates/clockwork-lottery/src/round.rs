//! A single commit-reveal round and its phase windows.
//!
//! ```text
//!  opened_at        commit_closes        reveal_closes
//!      |---- Commit ----|----- Reveal -----|---- AwaitingDraw ---> WinnerPicked
//! ```
//!
//! Both windows are half-open: a commit at `commit_closes` is late, a reveal
//! at `commit_closes` is on time.

use std::collections::{BTreeMap, BTreeSet};

use clockwork_core::error::LotteryError;
use clockwork_core::types::{Hash256, Identity};
use serde::{Deserialize, Serialize};

/// Where a round stands at a given clock value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// `now < commit_closes`: entries accepted.
    Commit,
    /// `commit_closes <= now < reveal_closes`: reveals accepted.
    Reveal,
    /// Reveal window over, no winner yet.
    AwaitingDraw,
    /// Winner picked, prize not yet withdrawn.
    WinnerPicked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryRound {
    commitments: BTreeMap<Identity, Hash256>,
    /// Revealed players, in reveal order.
    players: Vec<Identity>,
    revealed: BTreeSet<Identity>,
    commit_closes: u64,
    reveal_closes: u64,
    winner: Option<Identity>,
    pot: u64,
}

impl LotteryRound {
    /// Open a fresh round at `now`: each window lasts `duration`.
    pub fn open(now: u64, duration: u64) -> Result<Self, LotteryError> {
        if duration == 0 {
            return Err(LotteryError::InvalidDuration);
        }
        let commit_closes = now.checked_add(duration).ok_or(LotteryError::ArithmeticOverflow)?;
        let reveal_closes = commit_closes
            .checked_add(duration)
            .ok_or(LotteryError::ArithmeticOverflow)?;
        Ok(Self {
            commitments: BTreeMap::new(),
            players: Vec::new(),
            revealed: BTreeSet::new(),
            commit_closes,
            reveal_closes,
            winner: None,
            pot: 0,
        })
    }

    pub fn phase(&self, now: u64) -> Phase {
        if self.winner.is_some() {
            Phase::WinnerPicked
        } else if now < self.commit_closes {
            Phase::Commit
        } else if now < self.reveal_closes {
            Phase::Reveal
        } else {
            Phase::AwaitingDraw
        }
    }

    pub fn commit_closes(&self) -> u64 {
        self.commit_closes
    }

    pub fn reveal_closes(&self) -> u64 {
        self.reveal_closes
    }

    pub fn winner(&self) -> Option<Identity> {
        self.winner
    }

    pub fn pot(&self) -> u64 {
        self.pot
    }

    pub fn players(&self) -> &[Identity] {
        &self.players
    }

    pub fn commitment_of(&self, who: &Identity) -> Option<Hash256> {
        self.commitments.get(who).copied()
    }

    pub fn has_entered(&self, who: &Identity) -> bool {
        self.commitments.contains_key(who)
    }

    pub fn is_revealed(&self, who: &Identity) -> bool {
        self.revealed.contains(who)
    }

    /// Number of committed entries.
    pub fn entries(&self) -> usize {
        self.commitments.len()
    }

    /// True when no commitment, player, reveal, winner or pot is recorded.
    pub fn is_blank(&self) -> bool {
        self.commitments.is_empty()
            && self.players.is_empty()
            && self.revealed.is_empty()
            && self.winner.is_none()
            && self.pot == 0
    }

    // Mutators are crate-private; the lottery validates before calling them.

    pub(crate) fn record_entry(&mut self, who: Identity, commitment: Hash256, pot: u64) {
        self.commitments.insert(who, commitment);
        self.pot = pot;
    }

    pub(crate) fn record_reveal(&mut self, who: Identity) {
        self.revealed.insert(who);
        self.players.push(who);
    }

    pub(crate) fn set_winner(&mut self, who: Identity) {
        self.winner = Some(who);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_follow_duration() {
        let r = LotteryRound::open(10, 4).unwrap();
        assert_eq!(r.commit_closes(), 14);
        assert_eq!(r.reveal_closes(), 18);
        assert!(r.is_blank());
    }

    #[test]
    fn zero_duration_rejected() {
        assert_eq!(LotteryRound::open(0, 0), Err(LotteryError::InvalidDuration));
    }

    #[test]
    fn overflowing_windows_rejected() {
        assert_eq!(
            LotteryRound::open(u64::MAX - 5, 4),
            Err(LotteryError::ArithmeticOverflow)
        );
    }

    #[test]
    fn phases_are_half_open() {
        let mut r = LotteryRound::open(0, 4).unwrap();
        assert_eq!(r.phase(0), Phase::Commit);
        assert_eq!(r.phase(3), Phase::Commit);
        assert_eq!(r.phase(4), Phase::Reveal);
        assert_eq!(r.phase(7), Phase::Reveal);
        assert_eq!(r.phase(8), Phase::AwaitingDraw);
        r.set_winner(Identity::derive("w"));
        assert_eq!(r.phase(8), Phase::WinnerPicked);
        assert_eq!(r.phase(100), Phase::WinnerPicked);
    }

    #[test]
    fn reveal_appends_in_order() {
        let mut r = LotteryRound::open(0, 4).unwrap();
        let (a, b) = (Identity::derive("a"), Identity::derive("b"));
        r.record_entry(a, Hash256([1; 32]), 5);
        r.record_entry(b, Hash256([2; 32]), 10);
        r.record_reveal(b);
        r.record_reveal(a);
        assert_eq!(r.players(), &[b, a]);
        assert!(r.is_revealed(&a));
        assert_eq!(r.entries(), 2);
        assert_eq!(r.pot(), 10);
        assert_eq!(r.commitment_of(&a), Some(Hash256([1; 32])));
    }
}
