use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseLabelError;

/// A form selector that may still be sitting on its placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T> {
    Unselected,
    Selected(T),
}

impl<T> Selection<T> {
    pub fn as_selected(&self) -> Option<&T> {
        match self {
            Selection::Selected(value) => Some(value),
            Selection::Unselected => None,
        }
    }

    pub fn is_selected(&self) -> bool {
        matches!(self, Selection::Selected(_))
    }
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::Unselected
    }
}

impl<T> From<Option<T>> for Selection<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Selection::Selected(value),
            None => Selection::Unselected,
        }
    }
}

/// Fuel types the price model was trained on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelType {
    Petrol,
    Diesel,
    Electric,
    Hybrid,
    Other,
    Unknown,
}

impl FuelType {
    pub const ALL: [FuelType; 6] = [
        FuelType::Petrol,
        FuelType::Diesel,
        FuelType::Electric,
        FuelType::Hybrid,
        FuelType::Other,
        FuelType::Unknown,
    ];

    /// Offered when the dataset has no usable fuel type for a brand/model
    pub const FALLBACK: [FuelType; 5] = [
        FuelType::Petrol,
        FuelType::Diesel,
        FuelType::Electric,
        FuelType::Hybrid,
        FuelType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Petrol => "Petrol",
            FuelType::Diesel => "Diesel",
            FuelType::Electric => "Electric",
            FuelType::Hybrid => "Hybrid",
            FuelType::Other => "Other",
            FuelType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FuelType {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        FuelType::ALL
            .into_iter()
            .find(|fuel| fuel.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseLabelError::new("fuel type", s))
    }
}

/// Gearbox types the price model was trained on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transmission {
    Manual,
    Automatic,
    #[serde(rename = "Semi-automatic")]
    SemiAutomatic,
}

impl Transmission {
    pub const ALL: [Transmission; 3] = [
        Transmission::Manual,
        Transmission::Automatic,
        Transmission::SemiAutomatic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Transmission::Manual => "Manual",
            Transmission::Automatic => "Automatic",
            Transmission::SemiAutomatic => "Semi-automatic",
        }
    }
}

impl fmt::Display for Transmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Transmission {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "semi automatic" and "semi_automatic" show up in hand-typed input
        let wanted = s.trim().replace([' ', '_'], "-");
        Transmission::ALL
            .into_iter()
            .find(|gear| gear.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| ParseLabelError::new("transmission type", s))
    }
}

/// What the seller typed or picked on the pricing form
#[derive(Debug, Clone, PartialEq)]
pub struct RawSelection {
    pub brand: Selection<String>,
    pub model: Selection<String>,
    pub fuel_type: Selection<FuelType>,
    pub transmission: Selection<Transmission>,
    pub power_ps: u32,
    pub year: i32,
    pub mileage_km: u32,
    pub color: Selection<String>,
}

impl Default for RawSelection {
    fn default() -> Self {
        Self {
            brand: Selection::Unselected,
            model: Selection::Unselected,
            fuel_type: Selection::Unselected,
            transmission: Selection::Unselected,
            power_ps: 100,
            year: 2018,
            mileage_km: 100_000,
            color: Selection::Unselected,
        }
    }
}

/// A selection with every selector resolved to a concrete value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSpec {
    pub brand: String,
    pub model: String,
    pub fuel_type: FuelType,
    pub transmission: Transmission,
    pub power_ps: u32,
    pub year: i32,
    pub mileage_km: u32,
    pub color: String,
}

/// Model input: the vehicle plus engineered features.
///
/// Serialized names follow the columns the regression model was fitted on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub brand: String,
    pub model: String,
    pub fuel_type: FuelType,
    #[serde(rename = "transmission_type")]
    pub transmission: Transmission,
    pub color: String,
    pub year: i32,
    pub power_ps: u32,
    #[serde(rename = "mileage_in_km")]
    pub mileage_km: u32,
    pub car_age: i64,
    pub km_per_year: f64,
    pub is_low_mileage: u8,
    pub is_new_car: u8,
}

impl FeatureRecord {
    pub const NUMERIC_FEATURES: [&'static str; 7] = [
        "year",
        "power_ps",
        "mileage_in_km",
        "car_age",
        "km_per_year",
        "is_low_mileage",
        "is_new_car",
    ];

    pub const CATEGORICAL_FEATURES: [&'static str; 5] =
        ["brand", "model", "fuel_type", "transmission_type", "color"];

    /// Look up a numeric column by its model-facing name
    pub fn numeric_feature(&self, name: &str) -> Option<f64> {
        let value = match name {
            "year" => f64::from(self.year),
            "power_ps" => f64::from(self.power_ps),
            "mileage_in_km" => f64::from(self.mileage_km),
            "car_age" => self.car_age as f64,
            "km_per_year" => self.km_per_year,
            "is_low_mileage" => f64::from(self.is_low_mileage),
            "is_new_car" => f64::from(self.is_new_car),
            _ => return None,
        };
        Some(value)
    }

    /// Look up a categorical column by its model-facing name
    pub fn categorical_feature(&self, name: &str) -> Option<&str> {
        match name {
            "brand" => Some(&self.brand),
            "model" => Some(&self.model),
            "fuel_type" => Some(self.fuel_type.as_str()),
            "transmission_type" => Some(self.transmission.as_str()),
            "color" => Some(&self.color),
            _ => None,
        }
    }
}

/// Which figure the seller asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteMode {
    MarketValue,
    DealerOffer,
}

impl FromStr for QuoteMode {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "market" | "market-value" => Ok(QuoteMode::MarketValue),
            "dealer" | "dealer-offer" => Ok(QuoteMode::DealerOffer),
            _ => Err(ParseLabelError::new("quote mode", s)),
        }
    }
}

/// Market value band. `fair` is only set under the three-band policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketRange {
    pub low: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fair: Option<f64>,
    pub high: f64,
}

/// Display-ready price figure(s)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PriceQuote {
    MarketValue(MarketRange),
    DealerOffer { price: f64 },
}

impl PriceQuote {
    pub fn mode(&self) -> QuoteMode {
        match self {
            PriceQuote::MarketValue(_) => QuoteMode::MarketValue,
            PriceQuote::DealerOffer { .. } => QuoteMode::DealerOffer,
        }
    }
}

/// Outcome of one pricing request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quotation {
    pub features: FeatureRecord,
    pub base_price: f64,
    pub quote: PriceQuote,
    pub quoted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fuel_type_parses_case_insensitively() {
        assert_eq!("diesel".parse::<FuelType>().unwrap(), FuelType::Diesel);
        assert_eq!(" PETROL ".parse::<FuelType>().unwrap(), FuelType::Petrol);
        assert!("LPG".parse::<FuelType>().is_err());
    }

    #[test]
    fn transmission_accepts_spelling_variants() {
        for raw in ["Semi-automatic", "semi automatic", "SEMI_AUTOMATIC"] {
            assert_eq!(raw.parse::<Transmission>().unwrap(), Transmission::SemiAutomatic);
        }
        assert_eq!("manual".parse::<Transmission>().unwrap(), Transmission::Manual);
        assert!("cvt".parse::<Transmission>().is_err());
    }

    #[test]
    fn selection_from_option() {
        assert_eq!(Selection::from(Some("BMW")), Selection::Selected("BMW"));
        assert!(!Selection::<String>::from(None).is_selected());
    }

    #[test]
    fn feature_record_uses_model_column_names() {
        let record = FeatureRecord {
            brand: "audi".to_string(),
            model: "A4".to_string(),
            fuel_type: FuelType::Diesel,
            transmission: Transmission::SemiAutomatic,
            color: "black".to_string(),
            year: 2018,
            power_ps: 150,
            mileage_km: 90_000,
            car_age: 7,
            km_per_year: 11_250.0,
            is_low_mileage: 0,
            is_new_car: 0,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["transmission_type"], "Semi-automatic");
        assert_eq!(json["mileage_in_km"], 90_000);
        assert_eq!(json["fuel_type"], "Diesel");

        for name in FeatureRecord::NUMERIC_FEATURES {
            assert!(record.numeric_feature(name).is_some(), "{name}");
        }
        for name in FeatureRecord::CATEGORICAL_FEATURES {
            assert!(record.categorical_feature(name).is_some(), "{name}");
        }
        assert_eq!(record.numeric_feature("brand"), None);
    }

    #[test]
    fn quote_mode_from_cli_labels() {
        assert_eq!("market".parse::<QuoteMode>().unwrap(), QuoteMode::MarketValue);
        assert_eq!("dealer_offer".parse::<QuoteMode>().unwrap(), QuoteMode::DealerOffer);
        assert!("auction".parse::<QuoteMode>().is_err());
    }
}
