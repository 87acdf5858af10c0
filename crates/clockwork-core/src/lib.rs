//! # clockwork-core
//! Foundation types, errors and collaborator traits for the Clockwork ledger.

pub mod bank;
pub mod clock;
pub mod constants;
pub mod crypto;
pub mod error;
pub mod guard;
pub mod registry;
pub mod traits;
pub mod types;
