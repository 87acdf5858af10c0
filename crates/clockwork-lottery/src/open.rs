//! Open lottery: no commitments, the owner draws whenever they like.
//!
//! Stakes are held in [`Identity::DRAW_ESCROW`]. The draw pays the whole pot
//! to the winner in the same operation and starts a fresh player list.

use clockwork_core::constants::MIN_STAKE;
use clockwork_core::crypto::index_from_entropy;
use clockwork_core::error::{BankError, LotteryError};
use clockwork_core::guard::OpGuard;
use clockwork_core::traits::{EntropySource, ValueTransfer};
use clockwork_core::types::Identity;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenLottery {
    owner: Identity,
    min_stake: u64,
    /// Entries in join order; a player may appear more than once.
    players: Vec<Identity>,
    pot: u64,
    history: Vec<Identity>,
    #[serde(skip)]
    guard: OpGuard,
}

impl OpenLottery {
    pub fn new(owner: Identity) -> Self {
        Self::with_min_stake(owner, MIN_STAKE)
    }

    pub fn with_min_stake(owner: Identity, min_stake: u64) -> Self {
        Self {
            owner,
            min_stake,
            players: Vec::new(),
            pot: 0,
            history: Vec::new(),
            guard: OpGuard::default(),
        }
    }

    pub fn owner(&self) -> Identity {
        self.owner
    }

    pub fn players(&self) -> &[Identity] {
        &self.players
    }

    pub fn pot(&self) -> u64 {
        self.pot
    }

    pub fn lottery_id(&self) -> u64 {
        self.history.len() as u64
    }

    pub fn history(&self) -> &[Identity] {
        &self.history
    }

    pub fn winner_of(&self, lottery_id: u64) -> Option<Identity> {
        usize::try_from(lottery_id).ok().and_then(|i| self.history.get(i)).copied()
    }

    /// Join the next draw. The host has already escrowed `stake`.
    pub fn enter(&mut self, caller: Identity, stake: u64) -> Result<(), LotteryError> {
        self.guarded(|lottery| {
            if stake < lottery.min_stake {
                return Err(LotteryError::InsufficientStake { stake, min: lottery.min_stake });
            }
            let pot = lottery.pot.checked_add(stake).ok_or(LotteryError::ArithmeticOverflow)?;
            lottery.players.push(caller);
            lottery.pot = pot;
            info!(player = %caller, stake, pot, "open lottery entry");
            Ok(())
        })
    }

    /// Draw a winner and pay out the pot. Owner only.
    ///
    /// Returns the winner and the amount paid.
    ///
    /// # Errors
    ///
    /// - [`LotteryError::NotOwner`] if `caller` is not the owner
    /// - [`LotteryError::NoPlayers`] with an empty player list
    pub fn pick_winner(
        &mut self,
        caller: Identity,
        entropy: &dyn EntropySource,
        bank: &mut dyn ValueTransfer,
    ) -> Result<(Identity, u64), LotteryError> {
        self.guarded(|lottery| {
            if caller != lottery.owner {
                return Err(LotteryError::NotOwner(caller));
            }
            let index = index_from_entropy(&entropy.entropy(), lottery.players.len())
                .ok_or(LotteryError::NoPlayers)?;
            let winner = lottery.players[index];
            let prize = lottery.pot;
            let escrow = bank.balance_of(&Identity::DRAW_ESCROW);
            if escrow < prize {
                return Err(BankError::InsufficientFunds {
                    who: Identity::DRAW_ESCROW,
                    have: escrow,
                    need: prize,
                }
                .into());
            }
            bank.ensure_credit(&winner, prize)?;

            let entries = lottery.players.len();
            lottery.history.push(winner);
            lottery.players.clear();
            lottery.pot = 0;

            bank.transfer(&Identity::DRAW_ESCROW, &winner, prize)?;
            info!(%winner, prize, entries, lottery_id = lottery.history.len(), "open lottery drawn");
            Ok((winner, prize))
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
