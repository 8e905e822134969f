//! Read-only data sources backing the dashboard endpoints.
//!
//! A [`Dataset`] is built once at startup (either from the bundled fixtures or
//! from a JSON file) and then shared behind an `Arc`. Nothing mutates it after
//! construction.

mod fixtures;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;
use utoipa::ToSchema;

use crate::models::{DisruptionEvent, ForecastCatalog, WasteItem};
use crate::services::disruptions::parse_estimated_impact;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse dataset file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("dataset failed validation: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// The complete set of records served by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub disruptions: Vec<DisruptionEvent>,
    #[serde(default)]
    pub forecasts: ForecastCatalog,
    #[serde(default)]
    pub waste: Vec<WasteItem>,
    /// Day the waste snapshot was taken; `days_until_expiry` counts from here.
    #[serde(default = "fixtures::as_of")]
    pub as_of: NaiveDate,
}

/// Record counts, reported by the readiness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatasetCounts {
    pub disruptions: usize,
    pub forecast_skus: usize,
    pub forecast_series: usize,
    pub waste_items: usize,
}

impl Dataset {
    pub fn new(
        disruptions: Vec<DisruptionEvent>,
        forecasts: ForecastCatalog,
        waste: Vec<WasteItem>,
    ) -> Self {
        Self {
            disruptions,
            forecasts,
            waste,
            as_of: fixtures::AS_OF,
        }
    }

    /// The bundled sample data. Disruption timestamps are placed relative to `anchor`.
    pub fn builtin(anchor: DateTime<Utc>) -> Self {
        Self {
            disruptions: fixtures::disruptions(anchor),
            forecasts: fixtures::forecasts(),
            waste: fixtures::waste_items(),
            as_of: fixtures::AS_OF,
        }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let dataset: Dataset = serde_json::from_str(&raw)?;
        info!(
            path = %path.display(),
            disruptions = dataset.disruptions.len(),
            forecast_skus = dataset.forecasts.products.len(),
            waste_items = dataset.waste.len(),
            "Loaded dataset from file"
        );
        Ok(dataset)
    }

    pub fn counts(&self) -> DatasetCounts {
        DatasetCounts {
            disruptions: self.disruptions.len(),
            forecast_skus: self.forecasts.products.len(),
            forecast_series: self.forecasts.series_count(),
            waste_items: self.waste.len(),
        }
    }

    /// Checks every record for data-quality problems and reports all of them at once.
    pub fn validate(&self) -> Result<(), DatasetError> {
        let mut problems = Vec::new();

        for event in &self.disruptions {
            if event.id.trim().is_empty() {
                problems.push(format!("disruption '{}' has an empty id", event.title));
            }
            if let Err(err) = parse_estimated_impact(&event.estimated_impact) {
                problems.push(format!("disruption {}: {}", event.id, err));
            }
        }

        for (sku, product) in &self.forecasts.products {
            if product.regions.is_empty() {
                problems.push(format!("forecast {} has no regions", sku));
            }
            for (region, series) in &product.regions {
                if series.forecast.iter().any(|p| p.actual.is_some()) {
                    problems.push(format!(
                        "forecast {}/{} has a future point with an actual value",
                        sku, region
                    ));
                }
                if series.historical.iter().any(|p| p.actual.is_none()) {
                    problems.push(format!(
                        "forecast {}/{} has a historical point without an actual value",
                        sku, region
                    ));
                }
                if !(0.0..=100.0).contains(&series.accuracy) {
                    problems.push(format!(
                        "forecast {}/{} accuracy {} is outside 0..=100",
                        sku, region, series.accuracy
                    ));
                }
            }
        }

        for item in &self.waste {
            if item.id.trim().is_empty() {
                problems.push(format!("waste item '{}' has an empty id", item.product_name));
            }
            if item.historical_waste_rate < Decimal::ZERO
                || item.historical_waste_rate > Decimal::ONE
            {
                problems.push(format!(
                    "waste item {} has waste rate {} outside 0..=1",
                    item.id, item.historical_waste_rate
                ));
            }
            let expected_days = (item.expiry_date - self.as_of).num_days();
            if item.days_until_expiry != expected_days {
                problems.push(format!(
                    "waste item {} reports {} days until expiry but expires {} days after {}",
                    item.id, item.days_until_expiry, expected_days, self.as_of
                ));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(DatasetError::Invalid(problems))
        }
    }

    /// Loads the file at `path`, or the bundled fixtures when no path is set,
    /// and refuses a dataset that fails validation.
    pub fn load(path: Option<&Path>, anchor: DateTime<Utc>) -> Result<Self, DatasetError> {
        let dataset = match path {
            Some(path) => Self::from_json_file(path)?,
            None => Self::builtin(anchor),
        };
        dataset.validate()?;
        Ok(dataset)
    }
}
