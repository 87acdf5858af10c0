//! Protocol constants. All monetary values in units (1 COIN = 10^8 units).

pub const COIN: u64 = 100_000_000;

/// Denominator for every basis-point rate (auction cut, etc.).
pub const BPS_PRECISION: u64 = 10_000;

/// Default auction cut retained by the fee ledger: 3.75%.
///
/// # Examples
///
/// ```
/// use clockwork_core::constants::{BPS_PRECISION, DEFAULT_CUT_BPS};
/// assert_eq!(1000 * DEFAULT_CUT_BPS / BPS_PRECISION, 37);
/// ```
pub const DEFAULT_CUT_BPS: u64 = 375;

/// Number of recent first-generation sale prices kept for price seeding.
pub const GEN0_HISTORY_LEN: usize = 5;

/// Floor for the starting price of a first-generation auction.
pub const GEN0_STARTING_PRICE: u64 = COIN / 100;

/// Duration of a first-generation auction, in clock units (one day of seconds).
pub const GEN0_AUCTION_DURATION: u64 = 86_400;

/// Maximum number of first-generation auctions that may ever be created.
pub const GEN0_CREATION_LIMIT: u64 = 45_000;

/// Length of each lottery phase (commit, then reveal) in clock units.
pub const LOTTERY_DURATION: u64 = 4;

/// Smallest stake accepted by either lottery.
pub const MIN_STAKE: u64 = COIN / 100;

/// Domain tag hashed into the genesis block hash of the ledger clock.
pub const GENESIS_TAG: &[u8] = b"clockwork genesis";
