//! # clockwork-ledger
//! Single-ledger composition of the Clockwork engines.
//!
//! - [`ledger::Ledger`]: clock, registry, bank, auction house and lotteries
//!   behind one atomic `submit`
//! - [`ledger::SharedLedger`]: the same, serialized behind a mutex
//! - [`store::StateFile`]: JSON state file persistence
//! - [`config::LedgerConfig`]: layered configuration

pub mod config;
pub mod label;
pub mod ledger;
pub mod store;

pub use config::{ConfigError, LedgerConfig, LogFormat};
pub use ledger::{Ledger, LedgerState, Operation, Outcome, Receipt, SharedLedger};
pub use store::{StateFile, StoreError};
