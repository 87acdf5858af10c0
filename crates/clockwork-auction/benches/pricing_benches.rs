//! Criterion benchmarks for clockwork-auction hot paths.
//!
//! Covers: price interpolation, fee split, and a full list-then-bid cycle.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use clockwork_auction::engine::{AuctionConfig, AuctionEngine};
use clockwork_auction::fees::split_sale;
use clockwork_auction::pricing::current_price;
use clockwork_core::bank::MemoryBank;
use clockwork_core::constants::{COIN, DEFAULT_CUT_BPS};
use clockwork_core::registry::MemoryRegistry;
use clockwork_core::traits::ValueTransfer;
use clockwork_core::types::Identity;

fn bench_current_price(c: &mut Criterion) {
    c.bench_function("current_price", |b| {
        b.iter(|| {
            current_price(
                black_box(1_000 * COIN),
                black_box(0),
                black_box(86_400),
                black_box(43_201),
            )
        })
    });
}

fn bench_split_sale(c: &mut Criterion) {
    c.bench_function("split_sale", |b| {
        b.iter(|| split_sale(black_box(123_456_789), black_box(DEFAULT_CUT_BPS)))
    });
}

fn bench_list_and_bid(c: &mut Criterion) {
    let seller = Identity::derive("seller");
    let bidder = Identity::derive("bidder");

    c.bench_function("list_and_bid", |b| {
        b.iter(|| {
            let mut engine = AuctionEngine::new(AuctionConfig::default());
            let mut registry = MemoryRegistry::new();
            let mut bank = MemoryBank::new();
            let asset = registry.mint(seller).unwrap();
            engine
                .create_auction(asset, seller, COIN, 0, 100, 0, &mut registry)
                .unwrap();
            bank.credit(&Identity::AUCTION_ESCROW, COIN).unwrap();
            engine
                .bid(asset, bidder, COIN, black_box(40), &mut registry, &mut bank)
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_current_price, bench_split_sale, bench_list_and_bid);
criterion_main!(benches);
