//! # clockwork-auction
//! Decaying-price auctions.
//!
//! All price and fee calculations use integer arithmetic only.
//!
//! - **Linear pricing**: the price moves from the starting to the ending price
//!   over the auction's duration and is held at the ending price afterwards.
//! - **Escrow**: listed assets and bid payments sit in the auction escrow
//!   until settlement or cancellation.
//! - **Fee ledger**: a basis-point cut of every sale is booked to the fee
//!   beneficiary and swept out by an authorized sweeper.
//! - **Gen0 pricing**: first-generation auctions start at the average of the
//!   last five gen0 sale prices.

pub mod engine;
pub mod fees;
pub mod gen0;
pub mod pricing;

pub use engine::{Auction, AuctionConfig, AuctionEngine, Settlement};
pub use fees::{FeeLedger, split_sale};
pub use gen0::Gen0SaleHistory;
pub use pricing::current_price;
