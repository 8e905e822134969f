use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Likelihood that an item's stock expires unsold.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WasteRisk {
    Critical,
    High,
    Medium,
    Low,
}

impl WasteRisk {
    pub const ALL: [WasteRisk; 4] = [
        WasteRisk::Critical,
        WasteRisk::High,
        WasteRisk::Medium,
        WasteRisk::Low,
    ];

    /// Total order used for ranking, most urgent first.
    pub const fn rank(self) -> u8 {
        match self {
            WasteRisk::Critical => 0,
            WasteRisk::High => 1,
            WasteRisk::Medium => 2,
            WasteRisk::Low => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RecommendationAction {
    Markdown,
    DeepMarkdown,
    Transfer,
    BundlePromotion,
    Donation,
    PromotionalDisplay,
    StaffPurchaseProgram,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationPriority {
    Urgent,
    High,
    Medium,
    Low,
}

/// A suggested mitigating action attached to a waste item.
///
/// Only the fields relevant to `action` are populated: `discount` for
/// markdowns and promotions, `target_store`/`transfer_cost` for transfers,
/// `bundle_with` for bundles, `tax_benefit`/`social_impact` for donations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub action: RecommendationAction,
    pub priority: RecommendationPriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_sales: Option<u32>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    #[schema(value_type = Option<f64>)]
    pub estimated_revenue: Option<Decimal>,
    /// Percentage off shelf price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_store: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    #[schema(value_type = Option<f64>)]
    pub transfer_cost: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_with: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    #[schema(value_type = Option<f64>)]
    pub tax_benefit: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_impact: Option<String>,
}

impl Recommendation {
    pub fn new(action: RecommendationAction, priority: RecommendationPriority) -> Self {
        Self {
            action,
            priority,
            expected_sales: None,
            estimated_revenue: None,
            discount: None,
            target_store: None,
            transfer_cost: None,
            bundle_with: None,
            tax_benefit: None,
            social_impact: None,
        }
    }

    pub fn with_sales(mut self, expected_sales: u32, estimated_revenue: Decimal) -> Self {
        self.expected_sales = Some(expected_sales);
        self.estimated_revenue = Some(estimated_revenue);
        self
    }

    pub fn with_discount(mut self, discount: u8) -> Self {
        self.discount = Some(discount);
        self
    }

    pub fn with_transfer(mut self, target_store: impl Into<String>, cost: Decimal) -> Self {
        self.target_store = Some(target_store.into());
        self.transfer_cost = Some(cost);
        self
    }

    pub fn with_bundle(mut self, bundle_with: impl Into<String>) -> Self {
        self.bundle_with = Some(bundle_with.into());
        self
    }

    pub fn with_donation(mut self, tax_benefit: Decimal, social_impact: impl Into<String>) -> Self {
        self.tax_benefit = Some(tax_benefit);
        self.social_impact = Some(social_impact.into());
        self
    }
}

/// Perishable inventory at a single store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WasteItem {
    pub id: String,
    pub sku: String,
    pub product_name: String,
    pub category: String,
    pub location: String,
    pub current_stock: u32,
    pub expiry_date: NaiveDate,
    pub days_until_expiry: i64,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub cost_per_unit: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub total_value: Decimal,
    pub recommendations: Vec<Recommendation>,
    pub waste_risk: WasteRisk,
    /// Fraction of stock historically wasted, 0..=1
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub historical_waste_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WasteSummary {
    pub total_items: usize,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub total_value: Decimal,
    pub critical_items: usize,
    /// Items with one day or less until expiry
    pub expiring_today: usize,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub potential_waste_value: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub average_waste_rate: Decimal,
    pub categories_affected: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WasteResponse {
    pub items: Vec<WasteItem>,
    pub summary: WasteSummary,
    pub last_updated: DateTime<Utc>,
}
