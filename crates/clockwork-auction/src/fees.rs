//! Fee ledger: the auction house's cut of each sale.
//!
//! Fees stay in [`Identity::AUCTION_ESCROW`] until swept; this ledger is the
//! book of who may claim how much of that escrow. Credits and sweeps use
//! checked arithmetic and fail instead of clamping.

use std::collections::{BTreeMap, BTreeSet};

use clockwork_core::constants::BPS_PRECISION;
use clockwork_core::error::FeeError;
use clockwork_core::types::Identity;
use serde::{Deserialize, Serialize};

/// Split a sale `price` into `(seller_proceeds, fee)` at `cut_bps`.
///
/// The fee is `price * cut_bps / BPS_PRECISION` truncated; the seller gets the
/// remainder, so the two always sum to `price` and any rounding dust goes to
/// the seller. `cut_bps` above [`BPS_PRECISION`] is treated as 100%.
///
/// # Examples
///
/// ```
/// use clockwork_auction::fees::split_sale;
/// assert_eq!(split_sale(1000, 375), (963, 37));
/// ```
pub fn split_sale(price: u64, cut_bps: u64) -> (u64, u64) {
    let cut = cut_bps.min(BPS_PRECISION) as u128;
    let fee = (price as u128 * cut / BPS_PRECISION as u128) as u64;
    (price - fee, fee)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeLedger {
    balances: BTreeMap<Identity, u64>,
    /// Identities allowed to sweep.
    sweepers: BTreeSet<Identity>,
    /// Lifetime total credited, for the conservation check.
    total_credited: u128,
    total_swept: u128,
}

impl FeeLedger {
    /// Create a ledger whose balances may be swept by `sweepers`.
    pub fn new(sweepers: impl IntoIterator<Item = Identity>) -> Self {
        Self { sweepers: sweepers.into_iter().collect(), ..Self::default() }
    }

    pub fn balance_of(&self, beneficiary: &Identity) -> u64 {
        self.balances.get(beneficiary).copied().unwrap_or(0)
    }

    /// Sum of every unswept balance.
    pub fn outstanding(&self) -> u128 {
        self.balances.values().map(|&v| v as u128).sum()
    }

    pub fn total_credited(&self) -> u128 {
        self.total_credited
    }

    pub fn total_swept(&self) -> u128 {
        self.total_swept
    }

    pub fn is_sweeper(&self, who: &Identity) -> bool {
        self.sweepers.contains(who)
    }

    /// Credit `amount` to `beneficiary`.
    pub fn credit(&mut self, beneficiary: &Identity, amount: u64) -> Result<(), FeeError> {
        if amount == 0 {
            return Ok(());
        }
        let next = self.balance_of(beneficiary).checked_add(amount).ok_or(FeeError::Overflow)?;
        self.balances.insert(*beneficiary, next);
        self.total_credited += amount as u128;
        Ok(())
    }

    /// Zero the balance of `beneficiary` and return the amount to pay out.
    ///
    /// Only the book entry changes here; the caller moves the value.
    ///
    /// # Errors
    ///
    /// - [`FeeError::NotAuthorized`] if `caller` is not a sweeper
    pub fn sweep(&mut self, caller: &Identity, beneficiary: &Identity) -> Result<u64, FeeError> {
        if !self.is_sweeper(caller) {
            return Err(FeeError::NotAuthorized(*caller));
        }
        let amount = self.balance_of(beneficiary);
        let swept = self.total_swept + amount as u128;
        if swept > self.total_credited {
            return Err(FeeError::NegativeBalance {
                who: *beneficiary,
                have: (self.total_credited - self.total_swept) as u64,
                debit: amount,
            });
        }
        self.balances.remove(beneficiary);
        self.total_swept = swept;
        Ok(amount)
    }
}
