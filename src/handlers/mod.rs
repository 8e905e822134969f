pub mod disruptions;
pub mod forecast;
pub mod health;
pub mod overview;
pub mod users;
pub mod waste;

use std::sync::Arc;

use crate::datasets::Dataset;
use crate::services::{
    disruptions::DisruptionService, forecasting::ForecastService, overview::OverviewService,
    waste::WasteService,
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub disruptions: Arc<DisruptionService>,
    pub forecasts: Arc<ForecastService>,
    pub waste: Arc<WasteService>,
    pub overview: Arc<OverviewService>,
}

impl AppServices {
    /// Build every service over the same read-only dataset.
    pub fn new(dataset: Arc<Dataset>, model_version: impl Into<String>) -> Self {
        let disruptions = DisruptionService::new(dataset.clone());
        let waste = WasteService::new(dataset.clone());
        let overview = OverviewService::new(disruptions.clone(), waste.clone());

        Self {
            disruptions: Arc::new(disruptions),
            forecasts: Arc::new(ForecastService::new(dataset, model_version)),
            waste: Arc::new(waste),
            overview: Arc::new(overview),
        }
    }
}
