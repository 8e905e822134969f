use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::{
    datasets::Dataset,
    errors::ServiceError,
    models::{
        AvailableForecast, ForecastListResponse, ForecastMetadata, ForecastResponse,
        ResolveForecastRequest,
    },
};

pub const DEFAULT_MODEL_VERSION: &str = "2.1.3";

/// Read-only lookup over the product -> region -> series catalog.
#[derive(Debug, Clone)]
pub struct ForecastService {
    dataset: Arc<Dataset>,
    model_version: String,
}

/// A key that is absent or blank counts as missing; anything else is looked up verbatim.
fn required(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

impl ForecastService {
    pub fn new(dataset: Arc<Dataset>, model_version: impl Into<String>) -> Self {
        Self {
            dataset,
            model_version: model_version.into(),
        }
    }

    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    /// Every SKU with the regions it has a series for, in lexicographic order.
    #[instrument(skip(self))]
    pub fn list_available(&self) -> ForecastListResponse {
        let available: Vec<AvailableForecast> = self
            .dataset
            .forecasts
            .products
            .iter()
            .map(|(sku, product)| AvailableForecast {
                sku: sku.clone(),
                regions: product.region_names(),
            })
            .collect();

        debug!(total_skus = available.len(), "Listed available forecasts");

        ForecastListResponse {
            total_skus: available.len(),
            available,
        }
    }

    pub fn resolve_request(
        &self,
        request: &ResolveForecastRequest,
    ) -> Result<ForecastResponse, ServiceError> {
        self.resolve(request.sku.as_deref(), request.region.as_deref())
    }

    /// Looks up a single series. Both keys are checked for presence before any lookup.
    #[instrument(skip(self))]
    pub fn resolve(
        &self,
        sku: Option<&str>,
        region: Option<&str>,
    ) -> Result<ForecastResponse, ServiceError> {
        let (Some(sku), Some(region)) = (required(sku), required(region)) else {
            return Err(ServiceError::InvalidArgument(
                "SKU and region are required".to_string(),
            ));
        };

        let catalog = &self.dataset.forecasts;
        let product = catalog.product(sku).ok_or_else(|| {
            warn!(sku, "Forecast requested for unknown SKU");
            ServiceError::sku_not_found(catalog.skus())
        })?;

        let series = product.regions.get(region).ok_or_else(|| {
            warn!(sku, region, "Forecast requested for unknown region");
            ServiceError::region_not_found(product.region_names())
        })?;

        Ok(ForecastResponse {
            sku: sku.to_string(),
            region: region.to_string(),
            data: series.clone(),
            metadata: ForecastMetadata {
                last_updated: Utc::now(),
                model_version: self.model_version.clone(),
                confidence: series.accuracy,
            },
        })
    }
}
