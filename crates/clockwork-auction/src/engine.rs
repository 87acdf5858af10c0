//! Decaying-price auction engine.
//!
//! Owns the auction table, the fee ledger and the gen0 sale history. Listed
//! assets sit in [`Identity::AUCTION_ESCROW`] custody; bid payments are moved
//! into the same escrow by the host before [`AuctionEngine::bid`] runs.
//!
//! Every operation validates first, then finalizes its own bookkeeping, and
//! only then issues external transfers (registry custody, value). An
//! [`OpGuard`] marks the operation in progress for its whole duration.

use std::collections::BTreeMap;

use clockwork_core::constants::{
    DEFAULT_CUT_BPS, GEN0_AUCTION_DURATION, GEN0_CREATION_LIMIT, GEN0_STARTING_PRICE,
};
use clockwork_core::error::{AuctionError, BankError, FeeError, RegistryError};
use clockwork_core::guard::OpGuard;
use clockwork_core::traits::{AssetRegistry, ValueTransfer};
use clockwork_core::types::{AssetId, Identity};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::fees::{FeeLedger, split_sale};
use crate::gen0::Gen0SaleHistory;
use crate::pricing::current_price;

/// Static parameters of an auction house.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionConfig {
    /// Cut retained on every sale, in basis points.
    pub cut_bps: u64,
    /// May pause/unpause and create gen0 auctions.
    pub admin: Identity,
    /// Receives the fee cut of every sale.
    pub fee_beneficiary: Identity,
    /// May sweep fee balances.
    pub fee_sweepers: Vec<Identity>,
    /// Floor for a gen0 starting price.
    pub gen0_starting_price: u64,
    /// Duration of a gen0 auction.
    pub gen0_duration: u64,
    /// Lifetime cap on gen0 auctions.
    pub gen0_creation_limit: u64,
    /// Start with user listings paused.
    pub start_paused: bool,
}

impl Default for AuctionConfig {
    fn default() -> Self {
        let cfo = Identity::derive("cfo");
        Self {
            cut_bps: DEFAULT_CUT_BPS,
            admin: Identity::derive("admin"),
            fee_beneficiary: cfo,
            fee_sweepers: vec![cfo],
            gen0_starting_price: GEN0_STARTING_PRICE,
            gen0_duration: GEN0_AUCTION_DURATION,
            gen0_creation_limit: GEN0_CREATION_LIMIT,
            start_paused: false,
        }
    }
}

/// An active listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auction {
    pub seller: Identity,
    pub starting_price: u64,
    pub ending_price: u64,
    pub duration: u64,
    /// Clock value at creation.
    pub started_at: u64,
    /// First-generation listing; its sale price feeds the gen0 history.
    pub gen0: bool,
}

impl Auction {
    /// Price at clock value `now`. Before `started_at` the starting price applies.
    pub fn price_at(&self, now: u64) -> u64 {
        current_price(
            self.starting_price,
            self.ending_price,
            self.duration,
            now.saturating_sub(self.started_at),
        )
    }

    /// Clock value from which the ending price is held.
    pub fn ends_at(&self) -> u64 {
        self.started_at.saturating_add(self.duration)
    }
}

/// Outcome of a successful bid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub asset: AssetId,
    pub seller: Identity,
    pub bidder: Identity,
    pub price: u64,
    pub seller_proceeds: u64,
    pub fee: u64,
    pub refund: u64,
    pub gen0: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionEngine {
    config: AuctionConfig,
    auctions: BTreeMap<AssetId, Auction>,
    fees: FeeLedger,
    gen0: Gen0SaleHistory,
    gen0_created: u64,
    paused: bool,
    #[serde(skip)]
    guard: OpGuard,
}

impl AuctionEngine {
    pub fn new(config: AuctionConfig) -> Self {
        Self {
            fees: FeeLedger::new(config.fee_sweepers.iter().copied()),
            paused: config.start_paused,
            config,
            auctions: BTreeMap::new(),
            gen0: Gen0SaleHistory::new(),
            gen0_created: 0,
            guard: OpGuard::default(),
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn config(&self) -> &AuctionConfig {
        &self.config
    }

    pub fn auction(&self, asset: AssetId) -> Option<&Auction> {
        self.auctions.get(&asset)
    }

    /// Active listings in asset order.
    pub fn auctions(&self) -> impl Iterator<Item = (&AssetId, &Auction)> {
        self.auctions.iter()
    }

    pub fn len(&self) -> usize {
        self.auctions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.auctions.is_empty()
    }

    /// Current price of the auction for `asset` at clock value `now`.
    pub fn current_price(&self, asset: AssetId, now: u64) -> Result<u64, AuctionError> {
        self.auctions
            .get(&asset)
            .map(|a| a.price_at(now))
            .ok_or(AuctionError::AuctionNotFound(asset))
    }

    pub fn fees(&self) -> &FeeLedger {
        &self.fees
    }

    pub fn fee_balance(&self, beneficiary: &Identity) -> u64 {
        self.fees.balance_of(beneficiary)
    }

    pub fn gen0_history(&self) -> &Gen0SaleHistory {
        &self.gen0
    }

    pub fn gen0_created_count(&self) -> u64 {
        self.gen0_created
    }

    /// Starting price the next gen0 auction would use.
    pub fn next_gen0_price(&self) -> u64 {
        self.gen0.next_starting_price(self.config.gen0_starting_price)
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// List `asset` for sale by `seller`, taking custody of it.
    ///
    /// # Errors
    ///
    /// - [`AuctionError::AssetAlreadyListed`] if the asset has an auction
    /// - [`AuctionError::InvalidDuration`] if `duration == 0`
    /// - [`AuctionError::Paused`] while the house is paused
    /// - [`AuctionError::NotOwner`] if `seller` does not hold the asset
    #[allow(clippy::too_many_arguments)]
    pub fn create_auction(
        &mut self,
        asset: AssetId,
        seller: Identity,
        starting_price: u64,
        ending_price: u64,
        duration: u64,
        now: u64,
        registry: &mut dyn AssetRegistry,
    ) -> Result<Auction, AuctionError> {
        self.guarded(|engine| {
            if engine.paused {
                // Listed-check first so a duplicate still reports the conflict.
                engine.check_listable(asset, duration)?;
                return Err(AuctionError::Paused);
            }
            let auction = Auction {
                seller,
                starting_price,
                ending_price,
                duration,
                started_at: now,
                gen0: false,
            };
            engine.list(asset, auction, registry)
        })
    }

    /// List a freshly minted first-generation asset held by the admin.
    ///
    /// Starting price is the gen0 average (floored), ending price 0. Allowed
    /// while paused.
    ///
    /// # Errors
    ///
    /// - [`AuctionError::NotAuthorized`] if `caller` is not the admin
    /// - [`AuctionError::Gen0LimitReached`] past the creation cap
    /// - plus the listing errors of [`create_auction`](Self::create_auction)
    pub fn create_gen0_auction(
        &mut self,
        caller: Identity,
        asset: AssetId,
        now: u64,
        registry: &mut dyn AssetRegistry,
    ) -> Result<Auction, AuctionError> {
        self.guarded(|engine| {
            if caller != engine.config.admin {
                return Err(AuctionError::NotAuthorized(caller));
            }
            if engine.gen0_created >= engine.config.gen0_creation_limit {
                return Err(AuctionError::Gen0LimitReached(engine.config.gen0_creation_limit));
            }
            let created = engine.gen0_created.checked_add(1).ok_or(AuctionError::ArithmeticOverflow)?;
            let auction = Auction {
                seller: caller,
                starting_price: engine.next_gen0_price(),
                ending_price: 0,
                duration: engine.config.gen0_duration,
                started_at: now,
                gen0: true,
            };
            let auction = engine.list(asset, auction, registry)?;
            engine.gen0_created = created;
            Ok(auction)
        })
    }

    /// Buy `asset` at its current price.
    ///
    /// The host must already have moved `payment` from `bidder` into
    /// [`Identity::AUCTION_ESCROW`]. On success the seller is paid
    /// `price - fee`, the fee is booked to the fee beneficiary (and stays in
    /// escrow), `payment - price` is refunded, and the asset goes to `bidder`.
    ///
    /// # Errors
    ///
    /// - [`AuctionError::AuctionNotFound`] if the asset is not listed
    /// - [`AuctionError::InsufficientPayment`] if `payment < price`
    /// - [`BankError::Overflow`] if the seller or the bidder cannot receive
    ///   their share; nothing is changed
    pub fn bid(
        &mut self,
        asset: AssetId,
        bidder: Identity,
        payment: u64,
        now: u64,
        registry: &mut dyn AssetRegistry,
        bank: &mut dyn ValueTransfer,
    ) -> Result<Settlement, AuctionError> {
        self.guarded(|engine| {
            let auction = engine
                .auctions
                .get(&asset)
                .cloned()
                .ok_or(AuctionError::AuctionNotFound(asset))?;
            let price = auction.price_at(now);
            if payment < price {
                return Err(AuctionError::InsufficientPayment { payment, price });
            }
            let (seller_proceeds, fee) = split_sale(price, engine.config.cut_bps);
            let refund = payment - price;

            // The escrow must hold this payment on top of every unswept fee.
            let escrow = bank.balance_of(&Identity::AUCTION_ESCROW);
            let owed = engine.fees.outstanding() + payment as u128;
            if (escrow as u128) < owed {
                return Err(BankError::InsufficientFunds {
                    who: Identity::AUCTION_ESCROW,
                    have: escrow,
                    need: u64::try_from(owed).unwrap_or(u64::MAX),
                }
                .into());
            }
            let holder = registry.owner_of(asset)?;
            if holder != Identity::AUCTION_ESCROW {
                return Err(RegistryError::NotHolder {
                    asset,
                    expected: Identity::AUCTION_ESCROW,
                    actual: holder,
                }
                .into());
            }

            // Payouts must fit before any bookkeeping changes.
            if auction.seller == bidder {
                let total = seller_proceeds.checked_add(refund).ok_or(BankError::Overflow)?;
                bank.ensure_credit(&bidder, total)?;
            } else {
                bank.ensure_credit(&auction.seller, seller_proceeds)?;
                bank.ensure_credit(&bidder, refund)?;
            }

            // Effects.
            let beneficiary = engine.config.fee_beneficiary;
            engine.fees.credit(&beneficiary, fee)?;
            engine.auctions.remove(&asset);
            if auction.gen0 {
                engine.gen0.record(price);
            }

            // Transfers, last.
            bank.transfer(&Identity::AUCTION_ESCROW, &auction.seller, seller_proceeds)?;
            bank.transfer(&Identity::AUCTION_ESCROW, &bidder, refund)?;
            registry.transfer_custody(asset, &Identity::AUCTION_ESCROW, &bidder)?;

            info!(
                %asset, %bidder, seller = %auction.seller, price, fee, refund,
                gen0 = auction.gen0, "auction settled"
            );
            Ok(Settlement {
                asset,
                seller: auction.seller,
                bidder,
                price,
                seller_proceeds,
                fee,
                refund,
                gen0: auction.gen0,
            })
        })
    }

    /// Withdraw a listing and return the asset to its seller.
    ///
    /// # Errors
    ///
    /// - [`AuctionError::AuctionNotFound`] if the asset is not listed
    /// - [`AuctionError::NotSeller`] if `caller` is not the seller
    pub fn cancel_auction(
        &mut self,
        asset: AssetId,
        caller: Identity,
        registry: &mut dyn AssetRegistry,
    ) -> Result<Auction, AuctionError> {
        self.guarded(|engine| {
            let auction = engine.auctions.get(&asset).ok_or(AuctionError::AuctionNotFound(asset))?;
            if auction.seller != caller {
                return Err(AuctionError::NotSeller { asset, caller });
            }
            let auction = engine
                .auctions
                .remove(&asset)
                .ok_or(AuctionError::AuctionNotFound(asset))?;
            if let Err(e) = registry.transfer_custody(asset, &Identity::AUCTION_ESCROW, &auction.seller) {
                engine.auctions.insert(asset, auction);
                return Err(e.into());
            }
            info!(%asset, seller = %caller, "auction cancelled");
            Ok(auction)
        })
    }

    /// Pay out the whole fee balance of `beneficiary` from escrow.
    ///
    /// # Errors
    ///
    /// - [`FeeError::NotAuthorized`]
    ///   if `caller` is not a fee sweeper
    pub fn sweep_fees(
        &mut self,
        caller: Identity,
        beneficiary: Identity,
        bank: &mut dyn ValueTransfer,
    ) -> Result<u64, AuctionError> {
        self.guarded(|engine| {
            if !engine.fees.is_sweeper(&caller) {
                return Err(FeeError::NotAuthorized(caller).into());
            }
            let owed = engine.fees.balance_of(&beneficiary);
            let escrow = bank.balance_of(&Identity::AUCTION_ESCROW);
            if escrow < owed {
                return Err(BankError::InsufficientFunds {
                    who: Identity::AUCTION_ESCROW,
                    have: escrow,
                    need: owed,
                }
                .into());
            }
            bank.ensure_credit(&beneficiary, owed)?;
            let amount = engine.fees.sweep(&caller, &beneficiary)?;
            bank.transfer(&Identity::AUCTION_ESCROW, &beneficiary, amount)?;
            info!(%beneficiary, amount, "fees swept");
            Ok(amount)
        })
    }

    /// Stop user listings. Admin only.
    pub fn pause(&mut self, caller: Identity) -> Result<(), AuctionError> {
        self.set_paused(caller, true)
    }

    /// Resume user listings. Admin only.
    pub fn unpause(&mut self, caller: Identity) -> Result<(), AuctionError> {
        self.set_paused(caller, false)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn set_paused(&mut self, caller: Identity, paused: bool) -> Result<(), AuctionError> {
        self.guarded(|engine| {
            if caller != engine.config.admin {
                return Err(AuctionError::NotAuthorized(caller));
            }
            engine.paused = paused;
            info!(paused, "auction house pause flag set");
            Ok(())
        })
    }

    fn check_listable(&self, asset: AssetId, duration: u64) -> Result<(), AuctionError> {
        if self.auctions.contains_key(&asset) {
            return Err(AuctionError::AssetAlreadyListed(asset));
        }
        if duration == 0 {
            return Err(AuctionError::InvalidDuration);
        }
        Ok(())
    }

    /// Validate, store the record, then take custody.
    fn list(
        &mut self,
        asset: AssetId,
        auction: Auction,
        registry: &mut dyn AssetRegistry,
    ) -> Result<Auction, AuctionError> {
        self.check_listable(asset, auction.duration)?;
        let seller = auction.seller;
        if registry.owner_of(asset)? != seller {
            return Err(AuctionError::NotOwner { asset, caller: seller });
        }

        self.auctions.insert(asset, auction.clone());
        if let Err(e) = registry.transfer_custody(asset, &seller, &Identity::AUCTION_ESCROW) {
            self.auctions.remove(&asset);
            return Err(e.into());
        }

        info!(
            %asset, %seller, starting_price = auction.starting_price,
            ending_price = auction.ending_price, duration = auction.duration,
            gen0 = auction.gen0, "auction created"
        );
        Ok(auction)
    }

    fn guarded<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T, AuctionError>,
    ) -> Result<T, AuctionError> {
        if !self.guard.try_enter() {
            return Err(AuctionError::Reentrant);
        }
        let result = op(self);
        self.guard.exit();
        result
    }
}
