use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Source of an external disruption.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DisruptionCategory {
    Weather,
    Logistics,
    Supplier,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DisruptionStatus {
    /// Currently affecting operations
    Active,
    /// Being watched, no confirmed impact yet
    Monitoring,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// An external event estimated to affect store operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DisruptionEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub category: DisruptionCategory,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub location: GeoPoint,
    pub region: String,
    pub timestamp: DateTime<Utc>,
    pub affected_stores: u32,
    /// Currency-abbreviated amount such as `$2.3M` or `$450K`
    #[schema(example = "$2.3M")]
    pub estimated_impact: String,
    pub status: DisruptionStatus,
}

impl DisruptionEvent {
    pub fn is_active(&self) -> bool {
        self.status == DisruptionStatus::Active
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DisruptionSummary {
    pub total: usize,
    pub active: usize,
    pub total_affected_stores: u64,
    /// Sum of all parsed impact strings, in dollars
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 5440000.0)]
    pub total_estimated_impact: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DisruptionsResponse {
    pub disruptions: Vec<DisruptionEvent>,
    pub summary: DisruptionSummary,
}
