//! Currency rendering for quotes.
//!
//! Market values are shown in whole euros, dealer offers to the cent.

use std::fmt;

use crate::models::{MarketRange, PriceQuote};

pub const MARKET_VALUE_DECIMALS: usize = 0;
pub const DEALER_OFFER_DECIMALS: usize = 2;

/// `€` prefix, `,` thousands separators, fixed decimals
pub fn format_euros(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return format!("€{value}");
    }

    let rendered = format!("{value:.decimals$}");
    let (sign, unsigned) = match rendered.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rendered.as_str()),
    };
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };

    let mut out = format!("€{sign}{}", group_thousands(whole));
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

impl fmt::Display for PriceQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let euros = |v: f64| format_euros(v, MARKET_VALUE_DECIMALS);
        match self {
            PriceQuote::MarketValue(MarketRange {
                low,
                fair: None,
                high,
            }) => write!(f, "Estimated price range: {} - {}", euros(*low), euros(*high)),
            PriceQuote::MarketValue(MarketRange {
                low,
                fair: Some(fair),
                high,
            }) => write!(
                f,
                "Easy sale: {} | Fair price: {} | Hard sale: {}",
                euros(*low),
                euros(*fair),
                euros(*high)
            ),
            PriceQuote::DealerOffer { price } => write!(
                f,
                "Dealer offer: {}",
                format_euros(*price, DEALER_OFFER_DECIMALS)
            ),
        }
    }
}
