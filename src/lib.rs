//! Used-car price estimation.
//!
//! Turns form selections into model features, asks a trained regression
//! model for a base price, and applies a market-value or dealer-offer policy.

pub mod catalog;
pub mod config;
pub mod error;
pub mod format;
pub mod models;
pub mod pricing;

pub use catalog::{Catalog, JsonListingSource, Listing, ListingSource};
pub use config::PricingConfig;
pub use error::{ModelInferenceError, PricingError, SelectorField, ValidationError};
pub use models::{
    FeatureRecord, FuelType, MarketRange, PriceQuote, Quotation, QuoteMode, RawSelection,
    Selection, Transmission, VehicleSpec,
};
pub use pricing::{LinearPriceModel, MarketBandPolicy, PricePredictor, PricingEngine};
