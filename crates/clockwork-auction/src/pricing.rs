//! Linear price interpolation for decaying-price auctions.
//!
//! All computation uses integer arithmetic only, with `u128` intermediates.
//!
//! # Rounding
//!
//! The distance moved from `starting_price` is `span * elapsed / duration`
//! rounded **up**, so the price is rounded toward `ending_price`. On a
//! descending auction the buyer gets the benefit of rounding; on a rising
//! auction the seller does. The price is never outside
//! `[min(start, end), max(start, end)]`.

/// Current price of an auction `elapsed` clock units after it started.
///
/// - `elapsed >= duration` → `ending_price` (held from then on).
/// - otherwise `starting_price ± ceil(|end - start| * elapsed / duration)`.
///
/// A zero `duration` is rejected at auction creation; here it is treated as
/// already expired and returns `ending_price`.
///
/// # Examples
///
/// ```
/// use clockwork_auction::pricing::current_price;
/// assert_eq!(current_price(1000, 0, 100, 50), 500);
/// assert_eq!(current_price(1000, 0, 100, 0), 1000);
/// assert_eq!(current_price(1000, 0, 100, 250), 0);
/// ```
pub fn current_price(starting_price: u64, ending_price: u64, duration: u64, elapsed: u64) -> u64 {
    if elapsed >= duration {
        return ending_price;
    }

    // Max span ≈ 1.8e19, max elapsed < duration ≤ 1.8e19, product < 3.4e38, fits u128.
    let span = starting_price.abs_diff(ending_price) as u128;
    let moved = (span * elapsed as u128).div_ceil(duration as u128) as u64;

    if ending_price <= starting_price {
        starting_price - moved
    } else {
        starting_price + moved
    }
}
