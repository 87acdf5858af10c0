//! Error types for the Clockwork ledger.
//!
//! Every component error maps onto one [`ErrorKind`] so callers can react to
//! the class of failure without matching individual variants. A failed
//! operation never leaves a partial effect behind, whatever its kind.
use thiserror::Error;

use crate::types::{AssetId, Identity};

/// Failure classes shared by every component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad parameters: zero duration, insufficient payment or stake.
    Validation,
    /// Conflicts with existing state: already listed, entered, revealed.
    StateConflict,
    /// Attempted outside the valid phase window.
    Window,
    /// Wrong seller, winner, owner or role.
    Authorization,
    /// No such auction, commitment or asset.
    NotFound,
    /// Commitment does not match the revealed secret.
    Integrity,
    /// Internal inconsistency: overflow, negative balance, reentrancy.
    Internal,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown asset: {0}")] UnknownAsset(AssetId),
    #[error("asset {asset} held by {actual}, not {expected}")] NotHolder { asset: AssetId, expected: Identity, actual: Identity },
    #[error("asset id space exhausted")] Exhausted,
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownAsset(_) => ErrorKind::NotFound,
            Self::NotHolder { .. } => ErrorKind::Authorization,
            Self::Exhausted => ErrorKind::Internal,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BankError {
    #[error("insufficient funds for {who}: have {have}, need {need}")] InsufficientFunds { who: Identity, have: u64, need: u64 },
    #[error("balance overflow")] Overflow,
}

impl BankError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientFunds { .. } => ErrorKind::Validation,
            Self::Overflow => ErrorKind::Internal,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeeError {
    #[error("{0} is not authorized to sweep fees")] NotAuthorized(Identity),
    #[error("fee balance overflow")] Overflow,
    #[error("fee balance of {who} would go negative: have {have}, debit {debit}")] NegativeBalance { who: Identity, have: u64, debit: u64 },
}

impl FeeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotAuthorized(_) => ErrorKind::Authorization,
            Self::Overflow | Self::NegativeBalance { .. } => ErrorKind::Internal,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuctionError {
    #[error("asset {0} is already listed")] AssetAlreadyListed(AssetId),
    #[error("auction duration must be positive")] InvalidDuration,
    #[error("no auction for asset {0}")] AuctionNotFound(AssetId),
    #[error("insufficient payment: got {payment}, price {price}")] InsufficientPayment { payment: u64, price: u64 },
    #[error("{caller} is not the seller of {asset}")] NotSeller { asset: AssetId, caller: Identity },
    #[error("{caller} does not own asset {asset}")] NotOwner { asset: AssetId, caller: Identity },
    #[error("{0} is not the auction admin")] NotAuthorized(Identity),
    #[error("auction house is paused")] Paused,
    #[error("gen0 creation limit {0} reached")] Gen0LimitReached(u64),
    #[error("arithmetic overflow")] ArithmeticOverflow,
    #[error("auction engine re-entered during an operation")] Reentrant,
    #[error(transparent)] Fee(#[from] FeeError),
    #[error(transparent)] Registry(#[from] RegistryError),
    #[error(transparent)] Bank(#[from] BankError),
}

impl AuctionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidDuration | Self::InsufficientPayment { .. } | Self::Gen0LimitReached(_) => {
                ErrorKind::Validation
            }
            Self::AssetAlreadyListed(_) => ErrorKind::StateConflict,
            Self::Paused => ErrorKind::Window,
            Self::AuctionNotFound(_) => ErrorKind::NotFound,
            Self::NotSeller { .. } | Self::NotOwner { .. } | Self::NotAuthorized(_) => {
                ErrorKind::Authorization
            }
            Self::ArithmeticOverflow | Self::Reentrant => ErrorKind::Internal,
            Self::Fee(e) => e.kind(),
            Self::Registry(e) => e.kind(),
            Self::Bank(e) => e.kind(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LotteryError {
    #[error("commit phase closed at {commit_closes} (now {now})")] CommitClosed { now: u64, commit_closes: u64 },
    #[error("reveal window is [{opens}, {closes}) (now {now})")] RevealClosed { now: u64, opens: u64, closes: u64 },
    #[error("reveal phase open until {reveal_closes} (now {now})")] RevealStillOpen { now: u64, reveal_closes: u64 },
    #[error("stake {stake} below minimum {min}")] InsufficientStake { stake: u64, min: u64 },
    #[error("{0} already entered this round")] AlreadyEntered(Identity),
    #[error("{0} already revealed")] AlreadyRevealed(Identity),
    #[error("winner already picked for this round")] WinnerAlreadyPicked,
    #[error("{0} has no commitment this round")] NoCommitment(Identity),
    #[error("no revealed players")] NoRevealedPlayers,
    #[error("no players")] NoPlayers,
    #[error("secret does not match the commitment of {0}")] CommitmentMismatch(Identity),
    #[error("{0} is not the winner")] NotWinner(Identity),
    #[error("{0} is not the lottery owner")] NotOwner(Identity),
    #[error("lottery duration must be positive")] InvalidDuration,
    #[error("arithmetic overflow")] ArithmeticOverflow,
    #[error("lottery re-entered during an operation")] Reentrant,
    #[error(transparent)] Bank(#[from] BankError),
}

impl LotteryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientStake { .. } | Self::InvalidDuration => ErrorKind::Validation,
            Self::AlreadyEntered(_) | Self::AlreadyRevealed(_) | Self::WinnerAlreadyPicked => {
                ErrorKind::StateConflict
            }
            Self::CommitClosed { .. } | Self::RevealClosed { .. } | Self::RevealStillOpen { .. } => {
                ErrorKind::Window
            }
            Self::NoCommitment(_) | Self::NoRevealedPlayers | Self::NoPlayers => ErrorKind::NotFound,
            Self::CommitmentMismatch(_) => ErrorKind::Integrity,
            Self::NotWinner(_) | Self::NotOwner(_) => ErrorKind::Authorization,
            Self::ArithmeticOverflow | Self::Reentrant => ErrorKind::Internal,
            Self::Bank(e) => e.kind(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClockworkError {
    #[error(transparent)] Auction(#[from] AuctionError),
    #[error(transparent)] Lottery(#[from] LotteryError),
    #[error(transparent)] Fee(#[from] FeeError),
    #[error(transparent)] Registry(#[from] RegistryError),
    #[error(transparent)] Bank(#[from] BankError),
    #[error("{0} is a reserved identity and cannot submit operations")] ReservedCaller(Identity),
}

impl ClockworkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ReservedCaller(_) => ErrorKind::Authorization,
            Self::Auction(e) => e.kind(),
            Self::Lottery(e) => e.kind(),
            Self::Fee(e) => e.kind(),
            Self::Registry(e) => e.kind(),
            Self::Bank(e) => e.kind(),
        }
    }
}
