//! Pricing configuration with layered loading

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::pricing::policy::{MarketBandPolicy, DEFAULT_MARKET_POLICY, REFERENCE_YEAR};

/// Environment variables with this prefix override file values
pub const ENV_PREFIX: &str = "CAR_PRICER_";

/// Knobs that differ between deployments of the pricer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Year car age is measured from
    pub reference_year: i32,
    /// Banding used for market value quotes
    pub market_policy: MarketBandPolicy,
    /// Reject power, year, and mileage outside the form's ranges
    pub strict_ranges: bool,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            reference_year: REFERENCE_YEAR,
            market_policy: DEFAULT_MARKET_POLICY,
            strict_ranges: true,
        }
    }
}

impl PricingConfig {
    /// Load configuration from all sources.
    ///
    /// Priority (highest to lowest):
    /// 1. `CAR_PRICER_*` environment variables
    /// 2. Explicit TOML file (if provided)
    /// 3. Default values
    pub fn load(config_path: Option<&Path>) -> Result<Self, Box<figment::Error>> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = config_path {
            if !path.exists() {
                return Err(Box::new(figment::Error::from(format!(
                    "config file {} does not exist",
                    path.display()
                ))));
            }
            figment = figment.merge(Toml::file(path));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .map_err(Box::new)
    }

    /// Defaults overlaid with an inline TOML document
    pub fn from_toml_str(toml: &str) -> Result<Self, Box<figment::Error>> {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::string(toml))
            .extract()
            .map_err(Box::new)
    }
}
