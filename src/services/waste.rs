use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::{
    datasets::Dataset,
    models::{WasteItem, WasteResponse, WasteRisk, WasteSummary},
};

/// Items at or under this many days to expiry count as expiring today.
pub const EXPIRING_TODAY_DAYS: i64 = 1;

/// Ranks perishable stock by waste risk and estimates the value at stake.
#[derive(Debug, Clone)]
pub struct WasteService {
    dataset: Arc<Dataset>,
}

impl WasteService {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset }
    }

    pub fn summary(&self) -> WasteSummary {
        summarize_items(&self.dataset.waste)
    }

    #[instrument(skip(self))]
    pub fn rank(&self) -> WasteResponse {
        let mut items = self.dataset.waste.clone();
        sort_by_urgency(&mut items);
        let summary = summarize_items(&items);

        debug!(
            total_items = summary.total_items,
            critical_items = summary.critical_items,
            "Ranked waste items"
        );

        WasteResponse {
            items,
            summary,
            last_updated: Utc::now(),
        }
    }
}

/// Most urgent risk first, then soonest expiry. Stable for full ties.
pub fn sort_by_urgency(items: &mut [WasteItem]) {
    items.sort_by_key(|item| (item.waste_risk.rank(), item.days_until_expiry));
}

pub fn summarize_items(items: &[WasteItem]) -> WasteSummary {
    let total_value: Decimal = items.iter().map(|i| i.total_value).sum();
    let potential_waste_value: Decimal = items
        .iter()
        .map(|i| i.total_value * i.historical_waste_rate)
        .sum();

    let average_waste_rate = if items.is_empty() {
        Decimal::ZERO
    } else {
        let rate_sum: Decimal = items.iter().map(|i| i.historical_waste_rate).sum();
        rate_sum / Decimal::from(items.len())
    };

    let categories: BTreeSet<&str> = items.iter().map(|i| i.category.as_str()).collect();

    WasteSummary {
        total_items: items.len(),
        total_value,
        critical_items: items
            .iter()
            .filter(|i| i.waste_risk == WasteRisk::Critical)
            .count(),
        expiring_today: items
            .iter()
            .filter(|i| i.days_until_expiry <= EXPIRING_TODAY_DAYS)
            .count(),
        potential_waste_value,
        average_waste_rate,
        categories_affected: categories.len(),
    }
}
