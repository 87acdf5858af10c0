//! End-to-end and adversarial test suite for Clockwork.
//!
//! Integration tests drive a full [`Ledger`](clockwork_ledger::Ledger)
//! through auctions and lottery rounds and check that failed operations
//! leave no trace beyond the sealed block.

pub mod helpers;
