use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Trend {
    Increasing,
    Stable,
    Decreasing,
}

/// One demand observation. `actual` stays `None` until the day has passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted: u32,
    pub actual: Option<u32>,
}

impl ForecastPoint {
    pub fn projected(date: NaiveDate, predicted: u32) -> Self {
        Self {
            date,
            predicted,
            actual: None,
        }
    }

    pub fn observed(date: NaiveDate, predicted: u32, actual: u32) -> Self {
        Self {
            date,
            predicted,
            actual: Some(actual),
        }
    }
}

/// Demand series for a single (product, region) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForecastSeries {
    pub current_stock: u32,
    /// Forward-looking points, no actuals yet
    pub forecast: Vec<ForecastPoint>,
    /// Backward-looking points with both predicted and actual values
    pub historical: Vec<ForecastPoint>,
    /// Model accuracy as a percentage
    #[schema(example = 94.2)]
    pub accuracy: f64,
    pub trend: Trend,
    #[schema(example = "summer_peak")]
    pub seasonality: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductForecast {
    pub regions: BTreeMap<String, ForecastSeries>,
}

/// Product identifier -> region -> series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForecastCatalog {
    pub products: BTreeMap<String, ProductForecast>,
}

impl ForecastCatalog {
    pub fn skus(&self) -> Vec<String> {
        self.products.keys().cloned().collect()
    }

    pub fn product(&self, sku: &str) -> Option<&ProductForecast> {
        self.products.get(sku)
    }

    pub fn series_count(&self) -> usize {
        self.products.values().map(|p| p.regions.len()).sum()
    }
}

impl ProductForecast {
    pub fn region_names(&self) -> Vec<String> {
        self.regions.keys().cloned().collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AvailableForecast {
    pub sku: String,
    pub regions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForecastListResponse {
    pub available: Vec<AvailableForecast>,
    pub total_skus: usize,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ResolveForecastRequest {
    #[schema(example = "SKU-12345-Milk")]
    pub sku: Option<String>,
    #[schema(example = "California")]
    pub region: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForecastMetadata {
    pub last_updated: DateTime<Utc>,
    #[schema(example = "2.1.3")]
    pub model_version: String,
    /// Echo of the series accuracy
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ForecastResponse {
    pub sku: String,
    pub region: String,
    pub data: ForecastSeries,
    pub metadata: ForecastMetadata,
}
