//! Trait interfaces for the Clockwork ledger.
//!
//! These traits define the seams between the engines and their host:
//! - [`Clock`]: monotonically increasing ledger height (read-only)
//! - [`EntropySource`]: per-block entropy for winner selection
//! - [`AssetRegistry`]: custody of transferable assets
//! - [`ValueTransfer`]: balances and value movement
//!
//! The in-memory implementations live in [`crate::clock`],
//! [`crate::registry`] and [`crate::bank`].

use crate::error::{BankError, RegistryError};
use crate::types::{AssetId, Hash256, Identity};

/// Read-only view of ledger time.
///
/// Time is a height advanced by processed operations, never wall-clock.
pub trait Clock {
    /// Current height. Operations execute "at" this value.
    fn now(&self) -> u64;
}

/// Source of entropy for winner selection.
///
/// Must be unpredictable to players at commit time and available at draw
/// time. The block-derived implementation is manipulable by whoever orders
/// operations; see [`crate::crypto`].
pub trait EntropySource {
    /// 256 bits of entropy for the operation currently executing.
    fn entropy(&self) -> Hash256;
}

/// Custody registry for transferable assets.
///
/// The auction engine holds listed assets under
/// [`Identity::AUCTION_ESCROW`] as an intermediate custodian.
pub trait AssetRegistry {
    /// Current holder of `asset`.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::UnknownAsset`] if the asset was never minted
    fn owner_of(&self, asset: AssetId) -> Result<Identity, RegistryError>;

    /// Move `asset` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::UnknownAsset`] if the asset was never minted
    /// - [`RegistryError::NotHolder`] if `from` does not hold the asset
    fn transfer_custody(
        &mut self,
        asset: AssetId,
        from: &Identity,
        to: &Identity,
    ) -> Result<(), RegistryError>;

    /// Whether `who` currently holds `asset`.
    ///
    /// Default implementation delegates to [`owner_of`](Self::owner_of).
    fn is_held_by(&self, asset: AssetId, who: &Identity) -> Result<bool, RegistryError> {
        Ok(self.owner_of(asset)? == *who)
    }
}

/// Value balances and transfers.
///
/// Implementations must fail without side effects: a failed `debit` or
/// `transfer` leaves every balance unchanged.
pub trait ValueTransfer {
    /// Balance held by `who`. Unknown identities hold 0.
    fn balance_of(&self, who: &Identity) -> u64;

    /// Add `amount` to `who`.
    ///
    /// # Errors
    ///
    /// - [`BankError::Overflow`] if the balance would exceed `u64::MAX`
    fn credit(&mut self, who: &Identity, amount: u64) -> Result<(), BankError>;

    /// Remove `amount` from `who`.
    ///
    /// # Errors
    ///
    /// - [`BankError::InsufficientFunds`] if the balance is too small
    fn debit(&mut self, who: &Identity, amount: u64) -> Result<(), BankError>;

    /// Check that `who` can receive `amount` without overflowing.
    ///
    /// # Errors
    ///
    /// - [`BankError::Overflow`] if the balance would exceed `u64::MAX`
    fn ensure_credit(&self, who: &Identity, amount: u64) -> Result<(), BankError> {
        self.balance_of(who).checked_add(amount).map(|_| ()).ok_or(BankError::Overflow)
    }

    /// Move `amount` from `from` to `to`.
    ///
    /// Default implementation checks the credit side first so that a failed
    /// transfer never leaves the debit applied.
    fn transfer(&mut self, from: &Identity, to: &Identity, amount: u64) -> Result<(), BankError> {
        if amount == 0 || from == to {
            return Ok(());
        }
        let have = self.balance_of(from);
        if have < amount {
            return Err(BankError::InsufficientFunds { who: *from, have, need: amount });
        }
        self.ensure_credit(to, amount)?;
        self.debit(from, amount)?;
        self.credit(to, amount)
    }
}
