//! Commit-reveal lottery.
//!
//! Stakes are held in [`Identity::LOTTERY_ESCROW`]; the host moves each stake
//! there before [`CommitRevealLottery::enter`] runs. Only the prize payout in
//! [`CommitRevealLottery::withdraw_prize`] moves value out, and it is the
//! last step of that operation.

use clockwork_core::constants::{LOTTERY_DURATION, MIN_STAKE};
use clockwork_core::crypto::{CommitmentScheme, Sha256Commitment, index_from_entropy};
use clockwork_core::error::{BankError, LotteryError};
use clockwork_core::guard::OpGuard;
use clockwork_core::traits::{EntropySource, ValueTransfer};
use clockwork_core::types::{Hash256, Identity, Secret};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::round::{LotteryRound, Phase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryConfig {
    /// Length of each of the commit and reveal windows.
    pub duration: u64,
    /// Minimum stake per entry.
    pub min_stake: u64,
}

impl Default for LotteryConfig {
    fn default() -> Self {
        Self { duration: LOTTERY_DURATION, min_stake: MIN_STAKE }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(serialize = "", deserialize = "C: Default"))]
pub struct CommitRevealLottery<C = Sha256Commitment> {
    #[serde(skip)]
    scheme: C,
    config: LotteryConfig,
    round: LotteryRound,
    /// Winner of every completed draw; index is the lottery id.
    history: Vec<Identity>,
    #[serde(skip)]
    guard: OpGuard,
}

impl CommitRevealLottery<Sha256Commitment> {
    /// Open the first round at `now` with SHA-256 commitments.
    pub fn new(config: LotteryConfig, now: u64) -> Result<Self, LotteryError> {
        Self::with_scheme(Sha256Commitment, config, now)
    }
}

impl<C: CommitmentScheme> CommitRevealLottery<C> {
    pub fn with_scheme(scheme: C, config: LotteryConfig, now: u64) -> Result<Self, LotteryError> {
        Ok(Self {
            scheme,
            round: LotteryRound::open(now, config.duration)?,
            config,
            history: Vec::new(),
            guard: OpGuard::default(),
        })
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn config(&self) -> &LotteryConfig {
        &self.config
    }

    pub fn round(&self) -> &LotteryRound {
        &self.round
    }

    pub fn phase(&self, now: u64) -> Phase {
        self.round.phase(now)
    }

    /// Number of completed draws.
    pub fn lottery_id(&self) -> u64 {
        self.history.len() as u64
    }

    pub fn history(&self) -> &[Identity] {
        &self.history
    }

    /// Winner of draw `lottery_id`, if it has happened.
    pub fn winner_of(&self, lottery_id: u64) -> Option<Identity> {
        usize::try_from(lottery_id).ok().and_then(|i| self.history.get(i)).copied()
    }

    /// Commitment `identity` would submit for `secret`.
    pub fn create_commitment(&self, identity: &Identity, secret: &Secret) -> Hash256 {
        self.scheme.commit(identity, secret)
    }

    pub fn commitment_of(&self, who: &Identity) -> Option<Hash256> {
        self.round.commitment_of(who)
    }

    pub fn is_revealed(&self, who: &Identity) -> bool {
        self.round.is_revealed(who)
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Enter the current round with `commitment`.
    ///
    /// The host must already have moved `stake` into
    /// [`Identity::LOTTERY_ESCROW`].
    ///
    /// # Errors
    ///
    /// - [`LotteryError::CommitClosed`] if `now >= commit_closes`
    /// - [`LotteryError::InsufficientStake`] below the minimum stake
    /// - [`LotteryError::AlreadyEntered`] on a second entry
    pub fn enter(
        &mut self,
        caller: Identity,
        commitment: Hash256,
        stake: u64,
        now: u64,
    ) -> Result<(), LotteryError> {
        self.guarded(|lottery| {
            let round = &lottery.round;
            if now >= round.commit_closes() {
                return Err(LotteryError::CommitClosed { now, commit_closes: round.commit_closes() });
            }
            if stake < lottery.config.min_stake {
                return Err(LotteryError::InsufficientStake { stake, min: lottery.config.min_stake });
            }
            if round.has_entered(&caller) {
                return Err(LotteryError::AlreadyEntered(caller));
            }
            let pot = round.pot().checked_add(stake).ok_or(LotteryError::ArithmeticOverflow)?;

            lottery.round.record_entry(caller, commitment, pot);
            info!(player = %caller, stake, pot, "lottery entry");
            Ok(())
        })
    }

    /// Reveal the secret behind the caller's commitment.
    ///
    /// # Errors
    ///
    /// - [`LotteryError::RevealClosed`] outside `[commit_closes, reveal_closes)`
    /// - [`LotteryError::NoCommitment`] if the caller never entered
    /// - [`LotteryError::AlreadyRevealed`] on a second reveal
    /// - [`LotteryError::CommitmentMismatch`] if the secret does not match
    pub fn reveal(&mut self, caller: Identity, secret: &Secret, now: u64) -> Result<(), LotteryError> {
        self.guarded(|lottery| {
            let round = &lottery.round;
            if round.phase(now) != Phase::Reveal {
                return Err(LotteryError::RevealClosed {
                    now,
                    opens: round.commit_closes(),
                    closes: round.reveal_closes(),
                });
            }
            let commitment = round.commitment_of(&caller).ok_or(LotteryError::NoCommitment(caller))?;
            if round.is_revealed(&caller) {
                return Err(LotteryError::AlreadyRevealed(caller));
            }
            if !lottery.scheme.verify(&caller, secret, &commitment) {
                return Err(LotteryError::CommitmentMismatch(caller));
            }

            lottery.round.record_reveal(caller);
            info!(player = %caller, players = lottery.round.players().len(), "lottery reveal");
            Ok(())
        })
    }

    /// Draw the winner among revealed players. Callable by anyone.
    ///
    /// # Errors
    ///
    /// - [`LotteryError::RevealStillOpen`] if `now < reveal_closes`
    /// - [`LotteryError::WinnerAlreadyPicked`] while a winner is pending
    /// - [`LotteryError::NoRevealedPlayers`] if nobody revealed. This is
    ///   final for the round: no winner can withdraw, so no new round opens
    ///   and the stakes stay locked in escrow.
    pub fn pick_winner(&mut self, now: u64, entropy: &dyn EntropySource) -> Result<Identity, LotteryError> {
        self.guarded(|lottery| {
            let round = &lottery.round;
            if now < round.reveal_closes() {
                return Err(LotteryError::RevealStillOpen { now, reveal_closes: round.reveal_closes() });
            }
            if round.winner().is_some() {
                return Err(LotteryError::WinnerAlreadyPicked);
            }
            let players = round.players();
            let count = players.len();
            let index = index_from_entropy(&entropy.entropy(), count)
                .ok_or(LotteryError::NoRevealedPlayers)?;
            let winner = players[index];

            lottery.round.set_winner(winner);
            lottery.history.push(winner);
            info!(
                %winner, lottery_id = lottery.history.len(), players = count,
                pot = lottery.round.pot(), "lottery winner picked"
            );
            Ok(winner)
        })
    }

    /// Pay the pot to the winner and open the next round at `now`.
    ///
    /// # Errors
    ///
    /// - [`LotteryError::NotWinner`] unless `caller` is the pending winner
    /// - [`BankError::Overflow`] if the winner cannot receive the pot; the
    ///   round is left as it was
    pub fn withdraw_prize(
        &mut self,
        caller: Identity,
        now: u64,
        bank: &mut dyn ValueTransfer,
    ) -> Result<u64, LotteryError> {
        self.guarded(|lottery| {
            if lottery.round.winner() != Some(caller) {
                return Err(LotteryError::NotWinner(caller));
            }
            let prize = lottery.round.pot();
            let escrow = bank.balance_of(&Identity::LOTTERY_ESCROW);
            if escrow < prize {
                return Err(BankError::InsufficientFunds {
                    who: Identity::LOTTERY_ESCROW,
                    have: escrow,
                    need: prize,
                }
                .into());
            }
            bank.ensure_credit(&caller, prize)?;
            let next = LotteryRound::open(now, lottery.config.duration)?;

            lottery.round = next;
            bank.transfer(&Identity::LOTTERY_ESCROW, &caller, prize)?;
            info!(
                winner = %caller, prize, commit_closes = lottery.round.commit_closes(),
                reveal_closes = lottery.round.reveal_closes(), "lottery prize withdrawn"
            );
            Ok(prize)
        })
    }

    fn guarded<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T, LotteryError>,
    ) -> Result<T, LotteryError> {
        if !self.guard.try_enter() {
            return Err(LotteryError::Reentrant);
        }
        let result = op(self);
        self.guard.exit();
        result
    }
}
