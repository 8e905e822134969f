use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

use crate::models::{
    DisruptionCategory, DisruptionEvent, DisruptionStatus, ForecastCatalog, ForecastPoint,
    ForecastSeries, GeoPoint, ProductForecast, Recommendation, RecommendationAction as Action,
    RecommendationPriority as Priority, Severity, Trend, WasteItem, WasteRisk,
};

/// Reference day the perishable stock snapshot was taken on.
pub(super) const AS_OF: NaiveDate = match NaiveDate::from_ymd_opt(2025, 7, 10) {
    Some(date) => date,
    None => panic!("fixture snapshot date is not a calendar date"),
};

pub(super) fn as_of() -> NaiveDate {
    AS_OF
}

/// Day `d` of the snapshot month.
fn july(d: u32) -> NaiveDate {
    AS_OF + Duration::days(i64::from(d) - 10)
}

#[allow(clippy::too_many_arguments)]
fn disruption(
    id: &str,
    category: DisruptionCategory,
    severity: Severity,
    title: &str,
    description: &str,
    (lat, lng): (f64, f64),
    region: &str,
    timestamp: DateTime<Utc>,
    affected_stores: u32,
    estimated_impact: &str,
    status: DisruptionStatus,
) -> DisruptionEvent {
    DisruptionEvent {
        id: id.to_string(),
        category,
        severity,
        title: title.to_string(),
        description: description.to_string(),
        location: GeoPoint { lat, lng },
        region: region.to_string(),
        timestamp,
        affected_stores,
        estimated_impact: estimated_impact.to_string(),
        status,
    }
}

pub(super) fn disruptions(anchor: DateTime<Utc>) -> Vec<DisruptionEvent> {
    vec![
        disruption(
            "1",
            DisruptionCategory::Weather,
            Severity::High,
            "Hurricane Warning - Southeast Region",
            "Major hurricane approaching Florida coast, expect supply chain disruptions",
            (28.5383, -81.3792),
            "Southeast",
            anchor,
            156,
            "$2.3M",
            DisruptionStatus::Active,
        ),
        disruption(
            "2",
            DisruptionCategory::Logistics,
            Severity::Medium,
            "Port Strike - West Coast",
            "Longshoremen strike affecting Los Angeles and Long Beach ports",
            (33.7701, -118.1937),
            "West Coast",
            anchor - Duration::hours(1),
            89,
            "$1.8M",
            DisruptionStatus::Active,
        ),
        disruption(
            "3",
            DisruptionCategory::Supplier,
            Severity::Low,
            "Supplier Delay - Midwest Distribution",
            "Key supplier experiencing production delays due to equipment maintenance",
            (41.8781, -87.6298),
            "Midwest",
            anchor - Duration::hours(2),
            23,
            "$450K",
            DisruptionStatus::Monitoring,
        ),
        disruption(
            "4",
            DisruptionCategory::Weather,
            Severity::Medium,
            "Severe Thunderstorms - Texas",
            "Severe weather warnings across central Texas affecting transportation routes",
            (30.2672, -97.7431),
            "Southwest",
            anchor - Duration::minutes(30),
            67,
            "$890K",
            DisruptionStatus::Active,
        ),
    ]
}

fn projected(points: [u32; 7]) -> Vec<ForecastPoint> {
    points
        .iter()
        .enumerate()
        .map(|(i, &predicted)| ForecastPoint::projected(july(10 + i as u32), predicted))
        .collect()
}

fn observed(points: [(u32, u32); 7]) -> Vec<ForecastPoint> {
    points
        .iter()
        .enumerate()
        .map(|(i, &(predicted, actual))| {
            ForecastPoint::observed(july(3 + i as u32), predicted, actual)
        })
        .collect()
}

pub(super) fn forecasts() -> ForecastCatalog {
    let milk = ProductForecast {
        regions: BTreeMap::from([
            (
                "California".to_string(),
                ForecastSeries {
                    current_stock: 2500,
                    forecast: projected([2800, 3200, 2900, 3400, 4100, 4500, 3800]),
                    historical: observed([
                        (2600, 2750),
                        (3000, 3100),
                        (2800, 2650),
                        (3200, 3350),
                        (3800, 3900),
                        (4200, 4050),
                        (3600, 3700),
                    ]),
                    accuracy: 94.2,
                    trend: Trend::Increasing,
                    seasonality: "summer_peak".to_string(),
                },
            ),
            (
                "Texas".to_string(),
                ForecastSeries {
                    current_stock: 1800,
                    forecast: projected([2100, 2300, 2000, 2400, 2800, 3100, 2700]),
                    historical: observed([
                        (1900, 2000),
                        (2200, 2150),
                        (2000, 1950),
                        (2300, 2400),
                        (2600, 2650),
                        (2900, 2850),
                        (2500, 2600),
                    ]),
                    accuracy: 96.8,
                    trend: Trend::Stable,
                    seasonality: "summer_normal".to_string(),
                },
            ),
        ]),
    };

    let bread = ProductForecast {
        regions: BTreeMap::from([(
            "Florida".to_string(),
            ForecastSeries {
                current_stock: 1200,
                forecast: projected([1400, 1600, 1300, 1500, 1800, 2000, 1700]),
                historical: observed([
                    (1100, 1150),
                    (1300, 1280),
                    (1200, 1220),
                    (1400, 1380),
                    (1600, 1650),
                    (1800, 1750),
                    (1500, 1520),
                ]),
                accuracy: 97.1,
                trend: Trend::Increasing,
                seasonality: "hurricane_prep".to_string(),
            },
        )]),
    };

    ForecastCatalog {
        products: BTreeMap::from([
            ("SKU-12345-Milk".to_string(), milk),
            ("SKU-67890-Bread".to_string(), bread),
        ]),
    }
}

#[allow(clippy::too_many_arguments)]
fn waste_item(
    id: &str,
    sku: &str,
    product_name: &str,
    category: &str,
    location: &str,
    current_stock: u32,
    expiry_date: NaiveDate,
    cost_per_unit: Decimal,
    total_value: Decimal,
    recommendations: Vec<Recommendation>,
    waste_risk: WasteRisk,
    historical_waste_rate: Decimal,
) -> WasteItem {
    WasteItem {
        id: id.to_string(),
        sku: sku.to_string(),
        product_name: product_name.to_string(),
        category: category.to_string(),
        location: location.to_string(),
        current_stock,
        expiry_date,
        days_until_expiry: (expiry_date - AS_OF).num_days(),
        cost_per_unit,
        total_value,
        recommendations,
        waste_risk,
        historical_waste_rate,
    }
}

pub(super) fn waste_items() -> Vec<WasteItem> {
    vec![
        waste_item(
            "WS-001",
            "SKU-98765-Organic-Spinach",
            "Organic Baby Spinach 5oz",
            "Produce",
            "Store #1247 - Miami, FL",
            145,
            july(12),
            dec!(3.99),
            dec!(578.55),
            vec![
                Recommendation::new(Action::Markdown, Priority::High)
                    .with_discount(30)
                    .with_sales(70, dec!(401.31)),
                Recommendation::new(Action::Transfer, Priority::Medium)
                    .with_transfer("Store #1156 - Orlando, FL", dec!(45.00))
                    .with_sales(120, dec!(533.55)),
            ],
            WasteRisk::High,
            dec!(0.23),
        ),
        waste_item(
            "WS-002",
            "SKU-45678-Greek-Yogurt",
            "Greek Yogurt 32oz Vanilla",
            "Dairy",
            "Store #892 - Austin, TX",
            89,
            july(13),
            dec!(5.49),
            dec!(488.61),
            vec![
                Recommendation::new(Action::BundlePromotion, Priority::High)
                    .with_bundle("Granola & Berries")
                    .with_discount(25)
                    .with_sales(65, dec!(356.71)),
                Recommendation::new(Action::Markdown, Priority::Medium)
                    .with_discount(20)
                    .with_sales(55, dec!(240.68)),
            ],
            WasteRisk::Medium,
            dec!(0.15),
        ),
        waste_item(
            "WS-003",
            "SKU-11223-Bakery-Bread",
            "Artisan Sourdough Loaf",
            "Bakery",
            "Store #445 - Seattle, WA",
            34,
            july(11),
            dec!(4.99),
            dec!(169.66),
            vec![
                Recommendation::new(Action::DeepMarkdown, Priority::Urgent)
                    .with_discount(50)
                    .with_sales(30, dec!(74.85)),
                Recommendation::new(Action::Donation, Priority::Medium)
                    .with_donation(dec!(169.66), "Feed 15 families"),
            ],
            WasteRisk::Critical,
            dec!(0.31),
        ),
        waste_item(
            "WS-004",
            "SKU-78901-Fresh-Berries",
            "Organic Blueberries 1 pint",
            "Produce",
            "Store #1523 - Denver, CO",
            78,
            july(14),
            dec!(6.99),
            dec!(545.22),
            vec![
                Recommendation::new(Action::PromotionalDisplay, Priority::Medium)
                    .with_discount(15)
                    .with_sales(60, dec!(356.46)),
                Recommendation::new(Action::StaffPurchaseProgram, Priority::Low)
                    .with_discount(40)
                    .with_sales(25, dec!(104.85)),
            ],
            WasteRisk::Low,
            dec!(0.08),
        ),
    ]
}
