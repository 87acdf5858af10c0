//! In-memory value ledger.
//!
//! Stands in for the external payment layer. Balances are plain `u64`
//! amounts; a debit that would go negative is refused, never clamped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::BankError;
use crate::traits::ValueTransfer;
use crate::types::Identity;

/// Balance table keyed by identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryBank {
    balances: BTreeMap<Identity, u64>,
}

impl MemoryBank {
    /// Create an empty bank.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of every balance. Value is conserved by every operation except
    /// host funding, so this only changes through [`credit`](ValueTransfer::credit).
    pub fn total(&self) -> u128 {
        self.balances.values().map(|&v| v as u128).sum()
    }

    /// Iterate over non-zero balances in identity order.
    pub fn iter(&self) -> impl Iterator<Item = (&Identity, &u64)> {
        self.balances.iter()
    }
}

impl ValueTransfer for MemoryBank {
    fn balance_of(&self, who: &Identity) -> u64 {
        self.balances.get(who).copied().unwrap_or(0)
    }

    fn credit(&mut self, who: &Identity, amount: u64) -> Result<(), BankError> {
        if amount == 0 {
            return Ok(());
        }
        let next = self.balance_of(who).checked_add(amount).ok_or(BankError::Overflow)?;
        self.balances.insert(*who, next);
        Ok(())
    }

    fn debit(&mut self, who: &Identity, amount: u64) -> Result<(), BankError> {
        if amount == 0 {
            return Ok(());
        }
        let have = self.balance_of(who);
        let next = have
            .checked_sub(amount)
            .ok_or(BankError::InsufficientFunds { who: *who, have, need: amount })?;
        if next == 0 {
            self.balances.remove(who);
        } else {
            self.balances.insert(*who, next);
        }
        Ok(())
    }
}
