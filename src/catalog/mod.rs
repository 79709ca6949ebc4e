pub mod source;

pub use source::{JsonListingSource, ListingSource};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;

use crate::models::{FuelType, Transmission};
use crate::pricing::engine::POWER_PS_RANGE;

/// Power suggested when the dataset has nothing for a brand/model
pub const DEFAULT_POWER_PS: u32 = 100;

/// One historical listing. Every column may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Listing {
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub fuel_type: Option<String>,
    #[serde(default)]
    pub transmission_type: Option<String>,
    /// Raw value as scraped: a number, or text such as `"120,5"`
    #[serde(default)]
    pub power_ps: Option<serde_json::Value>,
    #[serde(default)]
    pub color: Option<String>,
}

impl Listing {
    fn matches_car(&self, brand: &str, model: &str) -> bool {
        self.brand.as_deref() == Some(brand) && self.model.as_deref() == Some(model)
    }
}

/// Turn a scraped power value into whole PS, truncating any fraction.
pub fn clean_power(raw: &serde_json::Value) -> Option<i64> {
    let value = match raw {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.replace(',', ".").trim().parse::<f64>().ok()?,
        _ => return None,
    };
    value.is_finite().then(|| value.trunc() as i64)
}

fn sorted_unique<'a>(values: impl Iterator<Item = Option<&'a String>>) -> Vec<String> {
    values
        .flatten()
        .filter(|v| !v.trim().is_empty())
        .map(String::as_str)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Read-only option sets for the pricing form, built from past listings
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    listings: Vec<Listing>,
}

impl Catalog {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self { listings }
    }

    /// Load listings from a source and index them
    pub async fn from_source(source: &dyn ListingSource) -> Result<Self> {
        let listings = source.load().await?;
        info!(
            source = source.source_name(),
            listings = listings.len(),
            "Catalog loaded"
        );
        Ok(Self::new(listings))
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn brands(&self) -> Vec<String> {
        sorted_unique(self.listings.iter().map(|l| l.brand.as_ref()))
    }

    pub fn models_for(&self, brand: &str) -> Vec<String> {
        sorted_unique(
            self.listings
                .iter()
                .filter(|l| l.brand.as_deref() == Some(brand))
                .map(|l| l.model.as_ref()),
        )
    }

    pub fn colors(&self) -> Vec<String> {
        sorted_unique(self.listings.iter().map(|l| l.color.as_ref()))
    }

    /// Known fuel types seen for this car, or the generic list if none are usable
    pub fn fuel_types_for(&self, brand: &str, model: &str) -> Vec<FuelType> {
        let mut fuels: Vec<FuelType> = self
            .listings
            .iter()
            .filter(|l| l.matches_car(brand, model))
            .filter_map(|l| l.fuel_type.as_deref()?.parse().ok())
            .collect();
        if fuels.is_empty() {
            fuels = FuelType::FALLBACK.to_vec();
        }
        fuels.sort_by_key(|f| f.as_str());
        fuels.dedup();
        fuels
    }

    /// Known gearboxes seen for this car, or all of them if none are usable
    pub fn transmissions_for(&self, brand: &str, model: &str) -> Vec<Transmission> {
        let mut gears: Vec<Transmission> = self
            .listings
            .iter()
            .filter(|l| l.matches_car(brand, model))
            .filter_map(|l| l.transmission_type.as_deref()?.parse().ok())
            .collect();
        if gears.is_empty() {
            gears = Transmission::ALL.to_vec();
        }
        gears.sort_by_key(|g| g.as_str());
        gears.dedup();
        gears
    }

    /// Median cleaned power for this car, truncated and kept inside the form's range
    pub fn suggested_power(&self, brand: &str, model: &str) -> u32 {
        let mut powers: Vec<i64> = self
            .listings
            .iter()
            .filter(|l| l.matches_car(brand, model))
            .filter_map(|l| l.power_ps.as_ref().and_then(clean_power))
            .collect();
        if powers.is_empty() {
            return DEFAULT_POWER_PS;
        }

        powers.sort_unstable();
        let mid = powers.len() / 2;
        let median = if powers.len() % 2 == 0 {
            (powers[mid - 1] as f64 + powers[mid] as f64) / 2.0
        } else {
            powers[mid] as f64
        };

        let (min, max) = (*POWER_PS_RANGE.start(), *POWER_PS_RANGE.end());
        (median.trunc() as i64).clamp(i64::from(min), i64::from(max)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn listing(brand: &str, model: &str, fuel: &str, gear: &str, power: serde_json::Value, color: &str) -> Listing {
        Listing {
            brand: Some(brand.to_string()),
            model: Some(model.to_string()),
            fuel_type: Some(fuel.to_string()),
            transmission_type: Some(gear.to_string()),
            power_ps: Some(power),
            color: Some(color.to_string()),
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            listing("bmw", "320", "diesel", "Automatic", json!("190"), "black"),
            listing("bmw", "320", "Petrol", "automatic", json!(184), "white"),
            listing("bmw", "320", "Diesel", "Manual", json!("150,7"), "black"),
            listing("bmw", "X5", "LPG", "cvt", json!("n/a"), "blue"),
            listing("audi", "A3", "Petrol", "Manual", json!(110.9), "red"),
            Listing {
                brand: Some("audi".to_string()),
                ..Default::default()
            },
        ])
    }

    #[test]
    fn brands_models_and_colors_are_sorted_and_unique() {
        let catalog = catalog();
        assert_eq!(catalog.brands(), vec!["audi", "bmw"]);
        assert_eq!(catalog.models_for("bmw"), vec!["320", "X5"]);
        assert!(catalog.models_for("tesla").is_empty());
        assert_eq!(catalog.colors(), vec!["black", "blue", "red", "white"]);
    }

    #[test]
    fn fuel_types_are_filtered_and_deduplicated() {
        let catalog = catalog();
        assert_eq!(catalog.fuel_types_for("bmw", "320"), vec![FuelType::Diesel, FuelType::Petrol]);
    }

    #[test]
    fn fuel_types_fall_back_when_nothing_is_usable() {
        let catalog = catalog();
        let expected = vec![
            FuelType::Diesel,
            FuelType::Electric,
            FuelType::Hybrid,
            FuelType::Other,
            FuelType::Petrol,
        ];
        assert_eq!(catalog.fuel_types_for("bmw", "X5"), expected);
        assert_eq!(catalog.fuel_types_for("tesla", "Model 3"), expected);
    }

    #[test]
    fn transmissions_filter_and_fall_back() {
        let catalog = catalog();
        assert_eq!(
            catalog.transmissions_for("bmw", "320"),
            vec![Transmission::Automatic, Transmission::Manual]
        );
        assert_eq!(
            catalog.transmissions_for("bmw", "X5"),
            vec![Transmission::Automatic, Transmission::Manual, Transmission::SemiAutomatic]
        );
    }

    #[test]
    fn clean_power_handles_scraped_values() {
        assert_eq!(clean_power(&json!(184)), Some(184));
        assert_eq!(clean_power(&json!(110.9)), Some(110));
        assert_eq!(clean_power(&json!("150,7")), Some(150));
        assert_eq!(clean_power(&json!(" 75 ")), Some(75));
        assert_eq!(clean_power(&json!("n/a")), None);
        assert_eq!(clean_power(&json!("nan")), None);
        assert_eq!(clean_power(&json!(null)), None);
        assert_eq!(clean_power(&json!(true)), None);
    }

    #[test]
    fn suggested_power_is_truncated_median() {
        let catalog = catalog();
        // 150, 184, 190
        assert_eq!(catalog.suggested_power("bmw", "320"), 184);
        assert_eq!(catalog.suggested_power("audi", "A3"), 110);
    }

    #[test]
    fn suggested_power_even_count_averages_middle_values() {
        let catalog = Catalog::new(vec![
            listing("fiat", "500", "Petrol", "Manual", json!(69), "red"),
            listing("fiat", "500", "Petrol", "Manual", json!(70), "red"),
        ]);
        assert_eq!(catalog.suggested_power("fiat", "500"), 69);
    }

    #[test]
    fn suggested_power_defaults_without_data() {
        let catalog = catalog();
        assert_eq!(catalog.suggested_power("bmw", "X5"), DEFAULT_POWER_PS);
        assert_eq!(catalog.suggested_power("tesla", "Model 3"), DEFAULT_POWER_PS);
    }
}
