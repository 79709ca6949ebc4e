use crate::error::ModelInferenceError;
use crate::models::FeatureRecord;

/// Common trait for trained price models.
/// The engine only needs a feature record in and a price out.
pub trait PricePredictor: Send + Sync {
    /// Predict a base price (euros) for one vehicle
    fn predict(&self, features: &FeatureRecord) -> Result<f64, ModelInferenceError>;

    /// Human-readable model name for logs
    fn name(&self) -> &str {
        "anonymous"
    }
}

impl<F> PricePredictor for F
where
    F: Fn(&FeatureRecord) -> Result<f64, ModelInferenceError> + Send + Sync,
{
    fn predict(&self, features: &FeatureRecord) -> Result<f64, ModelInferenceError> {
        self(features)
    }
}
