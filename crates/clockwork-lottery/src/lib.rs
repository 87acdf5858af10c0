//! # clockwork-lottery
//! Trustless winner selection.
//!
//! Two lotteries share the ledger's entropy source:
//!
//! - [`CommitRevealLottery`]: players commit to a secret while the commit
//!   window is open, reveal it in the following window, and anyone may draw
//!   once the reveal window has closed. The winner withdraws the pot, which
//!   opens the next round.
//! - [`OpenLottery`]: players join with a stake and the owner draws at will,
//!   paying the pot out immediately.
//!
//! Winner selection reduces block-derived entropy modulo the player count.
//! Whoever orders operations can bias it; the result is reproducible, not
//! unpredictable.

pub mod commit_reveal;
pub mod open;
pub mod round;

pub use commit_reveal::{CommitRevealLottery, LotteryConfig};
pub use open::OpenLottery;
pub use round::{LotteryRound, Phase};
