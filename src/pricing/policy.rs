use serde::{Deserialize, Serialize};

use crate::models::{MarketRange, PriceQuote};

/// Model year that car age is measured from
pub const REFERENCE_YEAR: i32 = 2025;

/// Mileage strictly below this counts as low
pub const LOW_MILEAGE_THRESHOLD_KM: u32 = 50_000;

/// Cars at most this many years old count as new
pub const NEW_CAR_MAX_AGE: i32 = 2;

/// Upper edge of the market band relative to the base price
pub const MARKET_HEADROOM_FACTOR: f64 = 1.10;

/// Lower edge of the three-band market range
pub const EASY_SALE_FACTOR: f64 = 0.90;

/// Flat markdown applied to the base price for dealer offers
pub const DEALER_OFFER_FACTOR: f64 = 0.85;

/// Banding used when no configuration overrides it
pub const DEFAULT_MARKET_POLICY: MarketBandPolicy = MarketBandPolicy::TwoBand;

/// How a base price is spread into a market value range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketBandPolicy {
    /// `base` up to `base * 1.10`
    #[default]
    TwoBand,
    /// Easy sale at `base * 0.90`, fair at `base`, hard sale at `base * 1.10`
    ThreeBand,
}

pub fn quote_market_value(base_price: f64, policy: MarketBandPolicy) -> PriceQuote {
    let range = match policy {
        MarketBandPolicy::TwoBand => MarketRange {
            low: base_price,
            fair: None,
            high: base_price * MARKET_HEADROOM_FACTOR,
        },
        MarketBandPolicy::ThreeBand => MarketRange {
            low: base_price * EASY_SALE_FACTOR,
            fair: Some(base_price),
            high: base_price * MARKET_HEADROOM_FACTOR,
        },
    };
    PriceQuote::MarketValue(range)
}

pub fn quote_dealer_offer(base_price: f64) -> PriceQuote {
    PriceQuote::DealerOffer {
        price: base_price * DEALER_OFFER_FACTOR,
    }
}
