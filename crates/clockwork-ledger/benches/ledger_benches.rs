//! Criterion benchmarks for clockwork-ledger submissions.
//!
//! Covers: a committed submission and a reverted one (snapshot restore).

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use clockwork_core::types::{AssetId, Identity};
use clockwork_ledger::{Ledger, LedgerConfig, Operation};

fn populated_ledger(assets: u64) -> Ledger {
    let mut ledger = Ledger::new(&LedgerConfig::default()).unwrap();
    let seller = Identity::derive("seller");
    for _ in 0..assets {
        let asset = ledger.mint(seller).unwrap();
        ledger
            .submit(seller, Operation::CreateAuction { asset, starting_price: 1_000, ending_price: 0, duration: 100 })
            .unwrap();
    }
    ledger
}

fn bench_committed_bid(c: &mut Criterion) {
    let base = populated_ledger(100);
    let bidder = Identity::derive("bidder");

    c.bench_function("submit_committed_bid", |b| {
        b.iter(|| {
            let mut ledger = base.clone();
            ledger.fund(bidder, 1_000).unwrap();
            ledger.submit(bidder, black_box(Operation::Bid { asset: AssetId(50), payment: 1_000 }))
        })
    });
}

fn bench_reverted_bid(c: &mut Criterion) {
    let mut ledger = populated_ledger(100);
    let bidder = Identity::derive("broke");

    c.bench_function("submit_reverted_bid", |b| {
        b.iter(|| ledger.submit(bidder, black_box(Operation::Bid { asset: AssetId(50), payment: 1_000 })))
    });
}

criterion_group!(benches, bench_committed_bid, bench_reverted_bid);
criterion_main!(benches);
