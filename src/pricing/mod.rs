pub mod engine;
pub mod linear;
pub mod policy;
pub mod traits;

pub use engine::{derive_features, estimate_price, validate_selection, PricingEngine};
pub use linear::LinearPriceModel;
pub use policy::{quote_dealer_offer, quote_market_value, MarketBandPolicy};
pub use traits::PricePredictor;
