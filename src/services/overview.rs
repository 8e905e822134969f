use chrono::Utc;

use super::{disruptions::DisruptionService, waste::WasteService};
use crate::{errors::ServiceError, models::OverviewResponse};

/// Combines the headline summaries shown together on the dashboard overview.
#[derive(Debug, Clone)]
pub struct OverviewService {
    disruptions: DisruptionService,
    waste: WasteService,
}

impl OverviewService {
    pub fn new(disruptions: DisruptionService, waste: WasteService) -> Self {
        Self { disruptions, waste }
    }

    pub fn snapshot(&self) -> Result<OverviewResponse, ServiceError> {
        Ok(OverviewResponse {
            disruptions: self.disruptions.summary()?,
            waste: self.waste.summary(),
            generated_at: Utc::now(),
        })
    }
}
