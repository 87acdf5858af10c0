//! Shared test helpers for end-to-end and adversarial tests.

use clockwork_core::types::{AssetId, Hash256, Identity, Secret};
use clockwork_ledger::{Ledger, LedgerConfig, LedgerState, Operation, Outcome, Receipt};

/// Identity derived from a label.
pub fn id(label: &str) -> Identity {
    Identity::derive(label)
}

/// Numbered participant.
pub fn player(i: usize) -> Identity {
    Identity::derive(&format!("player-{i}"))
}

pub fn admin() -> Identity {
    id("admin")
}

pub fn cfo() -> Identity {
    id("cfo")
}

/// Ledger with default configuration at height 0.
pub fn fresh_ledger() -> Ledger {
    Ledger::new(&LedgerConfig::default()).unwrap()
}

/// Ledger whose lottery windows last `duration` blocks.
pub fn ledger_with_lottery_duration(duration: u64) -> Ledger {
    let mut config = LedgerConfig::default();
    config.lottery.duration = duration;
    Ledger::new(&config).unwrap()
}

/// Mint an asset to `seller` and list it. The listing starts at the height
/// the create operation executes at, which is returned with the asset.
pub fn list(ledger: &mut Ledger, seller: Identity, start: u64, end: u64, duration: u64) -> (AssetId, u64) {
    let asset = ledger.mint(seller).unwrap();
    let receipt = ledger
        .submit(seller, Operation::CreateAuction { asset, starting_price: start, ending_price: end, duration })
        .unwrap();
    (asset, receipt.height)
}

/// Commitment for `who` revealing `secret`.
pub fn commitment(ledger: &Ledger, who: &Identity, secret: u64) -> Hash256 {
    ledger.create_commitment(who, &Secret::from(secret))
}

/// Seal empty blocks until the next operation executes at `height`.
pub fn advance_to(ledger: &mut Ledger, height: u64) {
    let now = ledger.height();
    assert!(height >= now, "cannot rewind from {now} to {height}");
    ledger.advance(height - now);
}

/// Everything but the clock, for "no partial effect" comparisons.
pub fn without_clock(state: &LedgerState) -> LedgerState {
    LedgerState { clock: Default::default(), ..state.clone() }
}

/// Unwrap a settlement from a receipt.
pub fn settled(receipt: &Receipt) -> &clockwork_auction::Settlement {
    match &receipt.outcome {
        Outcome::AuctionSettled(s) => s,
        other => panic!("expected a settlement, got {other:?}"),
    }
}
