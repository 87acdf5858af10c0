//! Rolling history of first-generation sale prices.
//!
//! The last [`GEN0_HISTORY_LEN`] prices are kept in a fixed ring. Slot
//! `sale_count % GEN0_HISTORY_LEN` is overwritten by each sale, so the oldest
//! entry goes first. Before the ring fills, only populated slots count toward
//! the average.

use clockwork_core::constants::GEN0_HISTORY_LEN;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gen0SaleHistory {
    prices: [u64; GEN0_HISTORY_LEN],
    sale_count: u64,
}

impl Gen0SaleHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a gen0 sale price.
    pub fn record(&mut self, price: u64) {
        let slot = (self.sale_count % GEN0_HISTORY_LEN as u64) as usize;
        self.prices[slot] = price;
        self.sale_count = self.sale_count.saturating_add(1);
    }

    /// Total gen0 sales ever recorded.
    pub fn sale_count(&self) -> u64 {
        self.sale_count
    }

    /// Raw ring contents, including unpopulated (zero) slots.
    pub fn prices(&self) -> &[u64; GEN0_HISTORY_LEN] {
        &self.prices
    }

    /// Number of populated slots.
    pub fn populated(&self) -> usize {
        self.sale_count.min(GEN0_HISTORY_LEN as u64) as usize
    }

    /// Average of the populated slots, truncated. `None` before any sale.
    pub fn average(&self) -> Option<u64> {
        let n = self.populated();
        if n == 0 {
            return None;
        }
        let sum: u128 = self.prices[..n].iter().map(|&p| p as u128).sum();
        Some((sum / n as u128) as u64)
    }

    /// Starting price for the next gen0 auction: the average, never below `floor`.
    pub fn next_starting_price(&self, floor: u64) -> u64 {
        self.average().map_or(floor, |avg| avg.max(floor))
    }
}
