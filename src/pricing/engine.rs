use chrono::Utc;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::config::PricingConfig;
use crate::error::{ModelInferenceError, PricingError, SelectorField, ValidationError};
use crate::models::{
    FeatureRecord, PriceQuote, Quotation, QuoteMode, RawSelection, Selection, VehicleSpec,
};
use crate::pricing::policy::{
    quote_dealer_offer, quote_market_value, LOW_MILEAGE_THRESHOLD_KM, NEW_CAR_MAX_AGE,
};
use crate::pricing::traits::PricePredictor;

pub const POWER_PS_RANGE: RangeInclusive<u32> = 1..=1000;
pub const MIN_YEAR: i32 = 1980;
pub const MAX_MILEAGE_KM: u32 = 500_000;

/// Derive the engineered model features for a resolved vehicle.
///
/// Total over its inputs: a model year after `reference_year` yields a
/// negative age and, at `-1`, an infinite `km_per_year`. Age is widened to
/// `i64` so any pair of `i32` years fits.
pub fn derive_features(spec: &VehicleSpec, reference_year: i32) -> FeatureRecord {
    let car_age = i64::from(reference_year) - i64::from(spec.year);
    let km_per_year = f64::from(spec.mileage_km) / (car_age as f64 + 1.0);

    FeatureRecord {
        brand: spec.brand.clone(),
        model: spec.model.clone(),
        fuel_type: spec.fuel_type,
        transmission: spec.transmission,
        color: spec.color.clone(),
        year: spec.year,
        power_ps: spec.power_ps,
        mileage_km: spec.mileage_km,
        car_age,
        km_per_year,
        is_low_mileage: u8::from(spec.mileage_km < LOW_MILEAGE_THRESHOLD_KM),
        is_new_car: u8::from(car_age <= i64::from(NEW_CAR_MAX_AGE)),
    }
}

/// Ask the model for a base price. Errors come back exactly as the model raised them.
pub fn estimate_price<P>(features: &FeatureRecord, predictor: &P) -> Result<f64, ModelInferenceError>
where
    P: PricePredictor + ?Sized,
{
    predictor.predict(features)
}

fn resolve<T: Clone>(selection: &Selection<T>, field: SelectorField) -> Result<T, ValidationError> {
    selection
        .as_selected()
        .cloned()
        .ok_or(ValidationError::Unselected { field })
}

fn resolve_text(selection: &Selection<String>, field: SelectorField) -> Result<String, ValidationError> {
    let value = resolve(selection, field)?;
    if value.trim().is_empty() {
        return Err(ValidationError::Unselected { field });
    }
    Ok(value)
}

fn check_range(field: &'static str, value: i64, min: i64, max: i64) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Resolve every selector, reporting the first unset one in form order.
pub fn validate_selection(
    selection: &RawSelection,
    config: &PricingConfig,
) -> Result<VehicleSpec, ValidationError> {
    let spec = VehicleSpec {
        brand: resolve_text(&selection.brand, SelectorField::Brand)?,
        model: resolve_text(&selection.model, SelectorField::Model)?,
        fuel_type: resolve(&selection.fuel_type, SelectorField::FuelType)?,
        transmission: resolve(&selection.transmission, SelectorField::Transmission)?,
        color: resolve_text(&selection.color, SelectorField::Color)?,
        power_ps: selection.power_ps,
        year: selection.year,
        mileage_km: selection.mileage_km,
    };

    if config.strict_ranges {
        check_range(
            "power_ps",
            i64::from(spec.power_ps),
            i64::from(*POWER_PS_RANGE.start()),
            i64::from(*POWER_PS_RANGE.end()),
        )?;
        check_range(
            "year",
            i64::from(spec.year),
            i64::from(MIN_YEAR),
            i64::from(config.reference_year),
        )?;
        check_range("mileage_in_km", i64::from(spec.mileage_km), 0, i64::from(MAX_MILEAGE_KM))?;
    }

    Ok(spec)
}

/// Turns form selections into price quotes using an injected model and dataset
pub struct PricingEngine {
    predictor: Arc<dyn PricePredictor>,
    catalog: Arc<Catalog>,
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(
        predictor: Arc<dyn PricePredictor>,
        catalog: Arc<Catalog>,
        config: PricingConfig,
    ) -> Self {
        Self {
            predictor,
            catalog,
            config,
        }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn validate(&self, selection: &RawSelection) -> Result<VehicleSpec, ValidationError> {
        validate_selection(selection, &self.config)
    }

    pub fn features_for(&self, selection: &RawSelection) -> Result<FeatureRecord, ValidationError> {
        let spec = self.validate(selection)?;
        Ok(derive_features(&spec, self.config.reference_year))
    }

    /// Apply the configured pricing policy to a base price
    pub fn quote_base_price(&self, base_price: f64, mode: QuoteMode) -> PriceQuote {
        match mode {
            QuoteMode::MarketValue => quote_market_value(base_price, self.config.market_policy),
            QuoteMode::DealerOffer => quote_dealer_offer(base_price),
        }
    }

    /// Validate, derive features, run the model, and apply the pricing policy
    pub fn quote(&self, selection: &RawSelection, mode: QuoteMode) -> Result<Quotation, PricingError> {
        let features = self.features_for(selection).map_err(|e| {
            warn!(error = %e, "Rejected pricing request");
            e
        })?;
        debug!(?features, "Derived model features");

        let base_price = estimate_price(&features, self.predictor.as_ref()).map_err(|e| {
            warn!(model = self.predictor.name(), error = %e, "Price model failed");
            e
        })?;

        let quote = self.quote_base_price(base_price, mode);
        info!(
            brand = %features.brand,
            model = %features.model,
            base_price,
            ?mode,
            "Priced vehicle"
        );

        Ok(Quotation {
            features,
            base_price,
            quote,
            quoted_at: Utc::now(),
        })
    }
}
