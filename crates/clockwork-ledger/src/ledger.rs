//! Ledger composition: one clock, one registry, one bank, and the engines.
//!
//! [`Ledger::submit`] runs exactly one [`Operation`] at the current height.
//! Attached value (bid payment, lottery stake) is moved into the engine's
//! escrow first, then the engine runs. If anything fails the whole state is
//! restored from a snapshot taken before the operation. Either way one block
//! is sealed, so the height advances on every submission.

use std::sync::Arc;

use clockwork_auction::{Auction, AuctionEngine, Settlement};
use clockwork_core::bank::MemoryBank;
use clockwork_core::clock::BlockClock;
use clockwork_core::error::ClockworkError;
use clockwork_core::registry::MemoryRegistry;
use clockwork_core::traits::{AssetRegistry, Clock, ValueTransfer};
use clockwork_core::types::{AssetId, Hash256, Identity, Secret};
use clockwork_lottery::{CommitRevealLottery, OpenLottery};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::LedgerConfig;
use crate::label;

/// A state transition submitted by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    CreateAuction { asset: AssetId, starting_price: u64, ending_price: u64, duration: u64 },
    CreateGen0Auction { asset: AssetId },
    /// `payment` is debited from the caller.
    Bid { asset: AssetId, payment: u64 },
    CancelAuction { asset: AssetId },
    SweepFees {
        #[serde(deserialize_with = "label::deserialize")]
        beneficiary: Identity,
    },
    Pause,
    Unpause,
    /// Commit-reveal entry; `stake` is debited from the caller.
    Enter { commitment: Hash256, stake: u64 },
    Reveal { secret: Secret },
    PickWinner,
    WithdrawPrize,
    /// Open-lottery entry; `stake` is debited from the caller.
    JoinDraw { stake: u64 },
    Draw,
}

impl Operation {
    /// Digest sealed into the block that carries this operation.
    pub fn digest(&self, caller: &Identity) -> Hash256 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(caller.as_bytes());
        // Plain data with string keys; encoding cannot fail.
        hasher.update(&serde_json::to_vec(self).unwrap_or_default());
        Hash256(*hasher.finalize().as_bytes())
    }
}

/// What a committed operation did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Outcome {
    AuctionCreated { asset: AssetId, auction: Auction },
    AuctionSettled(Settlement),
    AuctionCancelled { asset: AssetId },
    FeesSwept { beneficiary: Identity, amount: u64 },
    PauseSet { paused: bool },
    Entered { stake: u64, pot: u64 },
    Revealed { players: usize },
    WinnerPicked { lottery_id: u64, winner: Identity },
    PrizeWithdrawn { amount: u64, commit_closes: u64, reveal_closes: u64 },
    JoinedDraw { pot: u64 },
    Drawn { lottery_id: u64, winner: Identity, prize: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Height the operation executed at.
    pub height: u64,
    /// Hash of the block that carried it.
    pub block_hash: Hash256,
    pub caller: Identity,
    pub outcome: Outcome,
}

/// Everything the ledger owns. Serializable as a whole for the state file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    pub clock: BlockClock,
    pub registry: MemoryRegistry,
    pub bank: MemoryBank,
    pub auctions: AuctionEngine,
    pub lottery: CommitRevealLottery,
    pub draw: OpenLottery,
}

impl LedgerState {
    /// Fresh state at height 0.
    pub fn genesis(config: &LedgerConfig) -> Result<Self, ClockworkError> {
        let clock = BlockClock::new();
        Ok(Self {
            lottery: CommitRevealLottery::new(config.lottery_config(), clock.now())?,
            draw: OpenLottery::with_min_stake(config.lottery.owner, config.lottery.min_stake),
            auctions: AuctionEngine::new(config.auction_config()),
            registry: MemoryRegistry::new(),
            bank: MemoryBank::new(),
            clock,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Ledger {
    state: LedgerState,
}

impl Ledger {
    pub fn new(config: &LedgerConfig) -> Result<Self, ClockworkError> {
        Ok(Self { state: LedgerState::genesis(config)? })
    }

    pub fn from_state(state: LedgerState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn into_state(self) -> LedgerState {
        self.state
    }

    // ------------------------------------------------------------------
    // Host glue (no block sealed)
    // ------------------------------------------------------------------

    /// Mint a new asset to `owner` in the registry.
    pub fn mint(&mut self, owner: Identity) -> Result<AssetId, ClockworkError> {
        let asset = self.state.registry.mint(owner)?;
        debug!(%asset, %owner, "minted asset");
        Ok(asset)
    }

    /// Credit `amount` of fresh value to `who`.
    pub fn fund(&mut self, who: Identity, amount: u64) -> Result<(), ClockworkError> {
        self.state.bank.credit(&who, amount)?;
        debug!(%who, amount, "funded account");
        Ok(())
    }

    /// Seal `blocks` empty blocks.
    pub fn advance(&mut self, blocks: u64) {
        self.state.clock.advance(blocks);
        debug!(height = self.height(), "advanced clock");
    }

    // ------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------

    /// Execute `op` for `caller` at the current height.
    ///
    /// On error every effect is rolled back. A block is sealed in both cases.
    pub fn submit(&mut self, caller: Identity, op: Operation) -> Result<Receipt, ClockworkError> {
        let height = self.height();
        let digest = op.digest(&caller);

        let snapshot = self.state.clone();
        let result = if caller.is_reserved() {
            Err(ClockworkError::ReservedCaller(caller))
        } else {
            Self::execute(&mut self.state, caller, &op, height)
        };
        if result.is_err() {
            self.state = snapshot;
        }

        let block_hash = self.state.clock.seal(digest.as_bytes());
        match result {
            Ok(outcome) => {
                info!(height, %caller, %block_hash, ?outcome, "operation committed");
                Ok(Receipt { height, block_hash, caller, outcome })
            }
            Err(e) => {
                debug!(height, %caller, kind = ?e.kind(), error = %e, "operation reverted");
                Err(e)
            }
        }
    }

    fn execute(
        state: &mut LedgerState,
        caller: Identity,
        op: &Operation,
        now: u64,
    ) -> Result<Outcome, ClockworkError> {
        let outcome = match *op {
            Operation::CreateAuction { asset, starting_price, ending_price, duration } => {
                let auction = state.auctions.create_auction(
                    asset,
                    caller,
                    starting_price,
                    ending_price,
                    duration,
                    now,
                    &mut state.registry,
                )?;
                Outcome::AuctionCreated { asset, auction }
            }
            Operation::CreateGen0Auction { asset } => {
                let auction = state.auctions.create_gen0_auction(caller, asset, now, &mut state.registry)?;
                Outcome::AuctionCreated { asset, auction }
            }
            Operation::Bid { asset, payment } => {
                state.bank.transfer(&caller, &Identity::AUCTION_ESCROW, payment)?;
                let settlement =
                    state.auctions.bid(asset, caller, payment, now, &mut state.registry, &mut state.bank)?;
                Outcome::AuctionSettled(settlement)
            }
            Operation::CancelAuction { asset } => {
                state.auctions.cancel_auction(asset, caller, &mut state.registry)?;
                Outcome::AuctionCancelled { asset }
            }
            Operation::SweepFees { beneficiary } => {
                let amount = state.auctions.sweep_fees(caller, beneficiary, &mut state.bank)?;
                Outcome::FeesSwept { beneficiary, amount }
            }
            Operation::Pause => {
                state.auctions.pause(caller)?;
                Outcome::PauseSet { paused: true }
            }
            Operation::Unpause => {
                state.auctions.unpause(caller)?;
                Outcome::PauseSet { paused: false }
            }
            Operation::Enter { commitment, stake } => {
                state.bank.transfer(&caller, &Identity::LOTTERY_ESCROW, stake)?;
                state.lottery.enter(caller, commitment, stake, now)?;
                Outcome::Entered { stake, pot: state.lottery.round().pot() }
            }
            Operation::Reveal { secret } => {
                state.lottery.reveal(caller, &secret, now)?;
                Outcome::Revealed { players: state.lottery.round().players().len() }
            }
            Operation::PickWinner => {
                let winner = state.lottery.pick_winner(now, &state.clock)?;
                Outcome::WinnerPicked { lottery_id: state.lottery.lottery_id(), winner }
            }
            Operation::WithdrawPrize => {
                let amount = state.lottery.withdraw_prize(caller, now, &mut state.bank)?;
                let round = state.lottery.round();
                Outcome::PrizeWithdrawn {
                    amount,
                    commit_closes: round.commit_closes(),
                    reveal_closes: round.reveal_closes(),
                }
            }
            Operation::JoinDraw { stake } => {
                state.bank.transfer(&caller, &Identity::DRAW_ESCROW, stake)?;
                state.draw.enter(caller, stake)?;
                Outcome::JoinedDraw { pot: state.draw.pot() }
            }
            Operation::Draw => {
                let (winner, prize) = state.draw.pick_winner(caller, &state.clock, &mut state.bank)?;
                Outcome::Drawn { lottery_id: state.draw.lottery_id(), winner, prize }
            }
        };
        Ok(outcome)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn height(&self) -> u64 {
        self.state.clock.now()
    }

    /// Hash of the last sealed block.
    pub fn tip(&self) -> Hash256 {
        self.state.clock.tip()
    }

    pub fn balance_of(&self, who: &Identity) -> u64 {
        self.state.bank.balance_of(who)
    }

    /// Sum of every account balance, escrows included.
    pub fn total_value(&self) -> u128 {
        self.state.bank.total()
    }

    pub fn owner_of(&self, asset: AssetId) -> Result<Identity, ClockworkError> {
        Ok(self.state.registry.owner_of(asset)?)
    }

    pub fn auctions(&self) -> &AuctionEngine {
        &self.state.auctions
    }

    pub fn auction(&self, asset: AssetId) -> Option<&Auction> {
        self.state.auctions.auction(asset)
    }

    /// Price of `asset` for an operation executing at the current height.
    pub fn current_price(&self, asset: AssetId) -> Result<u64, ClockworkError> {
        Ok(self.state.auctions.current_price(asset, self.height())?)
    }

    pub fn fee_balance(&self, beneficiary: &Identity) -> u64 {
        self.state.auctions.fee_balance(beneficiary)
    }

    pub fn lottery(&self) -> &CommitRevealLottery {
        &self.state.lottery
    }

    pub fn draw(&self) -> &OpenLottery {
        &self.state.draw
    }

    pub fn create_commitment(&self, identity: &Identity, secret: &Secret) -> Hash256 {
        self.state.lottery.create_commitment(identity, secret)
    }

    pub fn is_revealed(&self, who: &Identity) -> bool {
        self.state.lottery.is_revealed(who)
    }
}

/// A ledger shared between threads. Submissions are serialized by the lock.
#[derive(Debug, Clone)]
pub struct SharedLedger {
    inner: Arc<Mutex<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self { inner: Arc::new(Mutex::new(ledger)) }
    }

    pub fn submit(&self, caller: Identity, op: Operation) -> Result<Receipt, ClockworkError> {
        self.inner.lock().submit(caller, op)
    }

    pub fn advance(&self, blocks: u64) {
        self.inner.lock().advance(blocks);
    }

    /// Run `f` with exclusive access to the ledger.
    pub fn with<R>(&self, f: impl FnOnce(&mut Ledger) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> LedgerState {
        self.inner.lock().state().clone()
    }
}
