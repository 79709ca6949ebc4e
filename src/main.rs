use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use car_price_estimator::catalog::DEFAULT_POWER_PS;
use car_price_estimator::{
    Catalog, FuelType, JsonListingSource, LinearPriceModel, PricingConfig, PricingEngine,
    PricingError, Quotation, QuoteMode, RawSelection, Selection, Transmission, ValidationError,
};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Car Price Estimator
#[derive(Parser)]
#[command(name = "car-pricer")]
#[command(about = "Estimate used-car market values and dealer offers")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Historical listings used to populate the selectors (JSON array)
    #[arg(short, long, global = true, default_value = "data.json")]
    listings: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the choices available for each selector
    Options {
        /// Narrow the output to one brand
        #[arg(long)]
        brand: Option<String>,

        /// Narrow the output to one model of the brand
        #[arg(long)]
        model: Option<String>,
    },

    /// Price a car
    Quote {
        /// Trained price model (JSON)
        #[arg(long, default_value = "final_model.json")]
        model_file: PathBuf,

        #[command(flatten)]
        car: CarArgs,

        /// `market` for a value range, `dealer` for a dealer offer
        #[arg(long, default_value = "market")]
        mode: QuoteMode,

        /// Print the full quotation as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Form fields for the car being priced
#[derive(Args, Debug)]
struct CarArgs {
    #[arg(long)]
    brand: Option<String>,

    #[arg(long)]
    model: Option<String>,

    #[arg(long)]
    fuel: Option<FuelType>,

    #[arg(long)]
    transmission: Option<Transmission>,

    /// Power in PS; defaults to the median for the brand and model
    #[arg(long)]
    power: Option<u32>,

    /// Year of manufacture
    #[arg(long, default_value = "2018")]
    year: i32,

    /// Mileage in km
    #[arg(long, default_value = "100000")]
    mileage: u32,

    #[arg(long)]
    color: Option<String>,
}

impl CarArgs {
    /// Fill in the form, suggesting power from the catalog when none was given
    fn into_selection(self, catalog: &Catalog) -> RawSelection {
        let power_ps = match (self.power, self.brand.as_deref(), self.model.as_deref()) {
            (Some(power), _, _) => power,
            (None, Some(brand), Some(model)) => {
                let suggested = catalog.suggested_power(brand, model);
                info!(suggested, "No power given, using the median for this model");
                suggested
            }
            (None, _, _) => DEFAULT_POWER_PS,
        };

        RawSelection {
            brand: Selection::from(self.brand),
            model: Selection::from(self.model),
            fuel_type: Selection::from(self.fuel),
            transmission: Selection::from(self.transmission),
            power_ps,
            year: self.year,
            mileage_km: self.mileage,
            color: Selection::from(self.color),
        }
    }
}

/// Prompt shown when the form is incomplete; range errors speak for themselves
fn validation_hint(err: &ValidationError) -> Option<&'static str> {
    match err {
        ValidationError::Unselected { .. } => Some("Please fill in all selections before proceeding."),
        ValidationError::OutOfRange { .. } => None,
    }
}

fn render_quotation(quotation: &Quotation, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(quotation)?);
    }
    Ok(quotation.quote.to_string())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

fn print_section(title: &str, values: &[String]) {
    println!("{title}:");
    if values.is_empty() {
        println!("   (none)");
    }
    for value in values {
        println!("   {value}");
    }
    println!();
}

fn show_options(catalog: &Catalog, brand: Option<&str>, model: Option<&str>) {
    match (brand, model) {
        (None, _) => print_section("Brands", &catalog.brands()),
        (Some(brand), None) => print_section(&format!("Models for {brand}"), &catalog.models_for(brand)),
        (Some(brand), Some(model)) => {
            let fuels: Vec<String> = catalog
                .fuel_types_for(brand, model)
                .iter()
                .map(ToString::to_string)
                .collect();
            let gears: Vec<String> = catalog
                .transmissions_for(brand, model)
                .iter()
                .map(ToString::to_string)
                .collect();
            print_section("Fuel types", &fuels);
            print_section("Transmission types", &gears);
            println!("Suggested power: {} PS\n", catalog.suggested_power(brand, model));
        }
    }
    print_section("Colors", &catalog.colors());
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = PricingConfig::load(cli.config.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {e}"))?;
    info!(?config, "🚗 Car Price Estimator");

    let source = JsonListingSource::new(&cli.listings);
    let catalog = Catalog::from_source(&source).await?;

    match cli.command {
        Commands::Options { brand, model } => {
            show_options(&catalog, brand.as_deref(), model.as_deref());
        }
        Commands::Quote {
            model_file,
            car,
            mode,
            json,
        } => {
            let selection = car.into_selection(&catalog);

            let predictor = LinearPriceModel::load(&model_file).await?;
            let engine = PricingEngine::new(Arc::new(predictor), Arc::new(catalog), config);

            let quotation = match engine.quote(&selection, mode) {
                Ok(quotation) => quotation,
                Err(PricingError::Validation(e)) => {
                    match validation_hint(&e) {
                        Some(hint) => warn!("{hint}"),
                        None => warn!(error = %e, "Input out of range"),
                    }
                    return Err(e.into());
                }
                Err(e) => return Err(e).context("Price estimate failed"),
            };

            println!("{}", render_quotation(&quotation, json)?);
        }
    }

    Ok(())
}
