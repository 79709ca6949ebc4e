use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use crate::error::ModelInferenceError;
use crate::models::FeatureRecord;
use crate::pricing::traits::PricePredictor;

/// Linear regression over numeric features plus one-hot categorical weights.
///
/// Categories the model never saw contribute nothing, matching an encoder
/// fitted with `handle_unknown = "ignore"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearPriceModel {
    pub name: String,
    pub intercept: f64,
    #[serde(default)]
    pub numeric: BTreeMap<String, f64>,
    #[serde(default)]
    pub categorical: BTreeMap<String, BTreeMap<String, f64>>,
}

impl LinearPriceModel {
    /// Parse a model document and check it only names known features
    pub fn from_json_str(json: &str) -> Result<Self, ModelInferenceError> {
        let model: Self = serde_json::from_str(json)
            .map_err(|e| ModelInferenceError::Schema(format!("invalid model document: {e}")))?;
        model.check_schema()?;
        Ok(model)
    }

    /// Load a model file from disk
    pub async fn load(path: &Path) -> Result<Self> {
        info!(path = %path.display(), "Loading price model");

        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read price model at {}", path.display()))?;
        let model = Self::from_json_str(&json)
            .with_context(|| format!("Failed to load price model from {}", path.display()))?;

        debug!(
            name = %model.name,
            numeric = model.numeric.len(),
            categorical = model.categorical.len(),
            "Price model ready"
        );
        Ok(model)
    }

    fn check_schema(&self) -> Result<(), ModelInferenceError> {
        for feature in self.numeric.keys() {
            if !FeatureRecord::NUMERIC_FEATURES.contains(&feature.as_str()) {
                return Err(ModelInferenceError::Schema(format!(
                    "'{feature}' is not a numeric feature"
                )));
            }
        }
        for feature in self.categorical.keys() {
            if !FeatureRecord::CATEGORICAL_FEATURES.contains(&feature.as_str()) {
                return Err(ModelInferenceError::Schema(format!(
                    "'{feature}' is not a categorical feature"
                )));
            }
        }
        Ok(())
    }
}

impl PricePredictor for LinearPriceModel {
    fn predict(&self, features: &FeatureRecord) -> Result<f64, ModelInferenceError> {
        let mut price = self.intercept;

        for (name, coefficient) in &self.numeric {
            let value = features
                .numeric_feature(name)
                .ok_or_else(|| ModelInferenceError::Schema(format!("missing numeric feature '{name}'")))?;
            price += coefficient * value;
        }

        for (name, weights) in &self.categorical {
            let value = features.categorical_feature(name).ok_or_else(|| {
                ModelInferenceError::Schema(format!("missing categorical feature '{name}'"))
            })?;
            price += weights.get(value).copied().unwrap_or(0.0);
        }

        if !price.is_finite() {
            return Err(ModelInferenceError::Runtime(format!(
                "prediction is not a finite number ({price})"
            )));
        }
        Ok(price)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FuelType, Transmission};

    const MODEL: &str = r#"{
        "name": "golf-linear",
        "intercept": 20000.0,
        "numeric": { "car_age": -1000.0, "is_low_mileage": 500.0 },
        "categorical": {
            "fuel_type": { "Diesel": 1500.0 },
            "transmission_type": { "Semi-automatic": 250.0 }
        }
    }"#;

    fn features(fuel_type: FuelType, km_per_year: f64) -> FeatureRecord {
        FeatureRecord {
            brand: "volkswagen".to_string(),
            model: "Golf".to_string(),
            fuel_type,
            transmission: Transmission::SemiAutomatic,
            color: "white".to_string(),
            year: 2020,
            power_ps: 150,
            mileage_km: 40_000,
            car_age: 5,
            km_per_year,
            is_low_mileage: 1,
            is_new_car: 0,
        }
    }

    #[test]
    fn scores_numeric_and_categorical_terms() {
        let model = LinearPriceModel::from_json_str(MODEL).unwrap();
        let price = model.predict(&features(FuelType::Diesel, 6_666.0)).unwrap();
        assert_eq!(price, 20_000.0 - 5_000.0 + 500.0 + 1_500.0 + 250.0);
        assert_eq!(model.name(), "golf-linear");
    }

    #[test]
    fn unseen_category_contributes_nothing() {
        let model = LinearPriceModel::from_json_str(MODEL).unwrap();
        let price = model.predict(&features(FuelType::Electric, 6_666.0)).unwrap();
        assert_eq!(price, 20_000.0 - 5_000.0 + 500.0 + 250.0);
    }

    #[test]
    fn unknown_feature_is_a_schema_error() {
        let err = LinearPriceModel::from_json_str(
            r#"{ "name": "bad", "intercept": 0.0, "numeric": { "doors": 10.0 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ModelInferenceError::Schema(_)));

        let err = LinearPriceModel::from_json_str(
            r#"{ "name": "bad", "intercept": 0.0, "categorical": { "car_age": {} } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ModelInferenceError::Schema(_)));
    }

    #[test]
    fn malformed_document_is_a_schema_error() {
        let err = LinearPriceModel::from_json_str("{ \"name\": 3 }").unwrap_err();
        assert!(matches!(err, ModelInferenceError::Schema(_)));
    }

    #[test]
    fn non_finite_prediction_is_a_runtime_error() {
        let model = LinearPriceModel::from_json_str(
            r#"{ "name": "kmpy", "intercept": 0.0, "numeric": { "km_per_year": 1.0 } }"#,
        )
        .unwrap();
        let err = model.predict(&features(FuelType::Petrol, f64::INFINITY)).unwrap_err();
        assert!(matches!(err, ModelInferenceError::Runtime(_)));
    }

    #[tokio::test]
    async fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        tokio::fs::write(&path, MODEL).await.unwrap();

        let model = LinearPriceModel::load(&path).await.unwrap();
        assert_eq!(model.intercept, 20_000.0);

        assert!(LinearPriceModel::load(&dir.path().join("missing.json")).await.is_err());
    }
}
