use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{DisruptionSummary, WasteSummary};

/// Headline figures for the overview screen.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResponse {
    pub disruptions: DisruptionSummary,
    pub waste: WasteSummary,
    pub generated_at: DateTime<Utc>,
}
