//! Error types for the pricing pipeline

use std::fmt;
use thiserror::Error;

/// Selectors that must be resolved before pricing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorField {
    Brand,
    Model,
    FuelType,
    Transmission,
    Color,
}

impl fmt::Display for SelectorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SelectorField::Brand => "brand",
            SelectorField::Model => "model",
            SelectorField::FuelType => "fuel type",
            SelectorField::Transmission => "transmission type",
            SelectorField::Color => "color",
        };
        f.write_str(label)
    }
}

/// The selection cannot be priced as submitted
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("no {field} selected; fill in all selections before proceeding")]
    Unselected { field: SelectorField },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}

/// The price model could not produce an estimate
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelInferenceError {
    #[error("price model unavailable: {0}")]
    Unavailable(String),

    #[error("feature schema mismatch: {0}")]
    Schema(String),

    #[error("model inference failed: {0}")]
    Runtime(String),
}

/// Anything that stops a quote from being produced
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    ModelInference(#[from] ModelInferenceError),
}

/// A label that does not name a known fuel type, gearbox, or quote mode
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} '{value}'")]
pub struct ParseLabelError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseLabelError {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
