use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::Listing;

/// Common trait for historical listing datasets.
/// Lets the catalog be fed from a file today and another store later.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Load every listing the source holds
    async fn load(&self) -> Result<Vec<Listing>>;

    /// Get the name of the listing source
    fn source_name(&self) -> &'static str;
}

/// Listings stored as a JSON array on local disk
pub struct JsonListingSource {
    path: PathBuf,
}

impl JsonListingSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ListingSource for JsonListingSource {
    async fn load(&self) -> Result<Vec<Listing>> {
        info!(path = %self.path.display(), "Loading listings");

        let json = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read listings from {}", self.path.display()))?;

        debug!("Read {} bytes of listing data", json.len());

        let listings: Vec<Listing> = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse listings in {}", self.path.display()))?;

        if listings.is_empty() {
            warn!("Listing file is empty; selectors will only offer fallback values");
        }

        Ok(listings)
    }

    fn source_name(&self) -> &'static str {
        "json-file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[tokio::test]
    async fn loads_listings_and_ignores_extra_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listings.json");
        tokio::fs::write(
            &path,
            r#"[
                {"brand": "skoda", "model": "Octavia", "fuel_type": "Diesel",
                 "transmission_type": "Manual", "power_ps": "150", "color": "silver",
                 "price_in_euro": 18500},
                {"brand": "skoda", "model": "Fabia", "power_ps": null}
            ]"#,
        )
        .await
        .unwrap();

        let source = JsonListingSource::new(&path);
        let catalog = Catalog::from_source(&source).await.unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.models_for("skoda"), vec!["Fabia", "Octavia"]);
        assert_eq!(catalog.suggested_power("skoda", "Octavia"), 150);
        assert_eq!(source.source_name(), "json-file");
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonListingSource::new(dir.path().join("nope.json"));

        let err = source.load().await.unwrap_err();
        assert!(err.to_string().contains("Failed to read listings"));
    }

    #[tokio::test]
    async fn malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listings.json");
        tokio::fs::write(&path, "{\"brand\": \"bmw\"}").await.unwrap();

        let err = JsonListingSource::new(&path).load().await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse listings"));
    }
}
