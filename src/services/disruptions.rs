use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

use crate::{
    datasets::Dataset,
    errors::ServiceError,
    models::{DisruptionEvent, DisruptionSummary, DisruptionsResponse},
};

/// Scale suffixes accepted on impact strings, checked in order.
pub const IMPACT_SCALES: &[(char, Decimal)] = &[('M', dec!(1000000)), ('K', dec!(1000))];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImpactParseError {
    #[error("impact value is empty")]
    Empty,

    #[error("impact '{0}' has no recognised scale suffix (expected M or K)")]
    MissingScale(String),

    #[error("impact '{0}' does not contain a valid non-negative amount")]
    InvalidAmount(String),
}

/// Looks up the multiplier for a scale suffix.
pub fn impact_scale(suffix: char) -> Option<Decimal> {
    let suffix = suffix.to_ascii_uppercase();
    IMPACT_SCALES
        .iter()
        .find(|(s, _)| *s == suffix)
        .map(|(_, multiplier)| *multiplier)
}

/// Parses a currency-abbreviated amount such as `$2.3M` or `$450K` into dollars.
///
/// The `$` sign, comma separators and surrounding whitespace are ignored. The
/// value must end with a scale suffix from [`IMPACT_SCALES`]; anything else is
/// rejected rather than guessed at.
pub fn parse_estimated_impact(raw: &str) -> Result<Decimal, ImpactParseError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();

    let suffix = cleaned.chars().last().ok_or(ImpactParseError::Empty)?;
    let multiplier =
        impact_scale(suffix).ok_or_else(|| ImpactParseError::MissingScale(raw.to_string()))?;

    let amount_str = &cleaned[..cleaned.len() - suffix.len_utf8()];
    let amount = Decimal::from_str(amount_str)
        .map_err(|_| ImpactParseError::InvalidAmount(raw.to_string()))?;
    if amount.is_sign_negative() {
        return Err(ImpactParseError::InvalidAmount(raw.to_string()));
    }

    amount
        .checked_mul(multiplier)
        .ok_or_else(|| ImpactParseError::InvalidAmount(raw.to_string()))
}

/// Orders disruption records by recency and computes headline totals.
#[derive(Debug, Clone)]
pub struct DisruptionService {
    dataset: Arc<Dataset>,
}

impl DisruptionService {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset }
    }

    pub fn summary(&self) -> Result<DisruptionSummary, ServiceError> {
        summarize_events(&self.dataset.disruptions)
    }

    /// All records newest first, plus the summary.
    pub fn summarize(&self) -> Result<DisruptionsResponse, ServiceError> {
        let summary = self.summary()?;

        let mut disruptions = self.dataset.disruptions.clone();
        // stable: equal timestamps keep their authored order
        disruptions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        debug!(
            total = summary.total,
            active = summary.active,
            "Summarized disruptions"
        );

        Ok(DisruptionsResponse {
            disruptions,
            summary,
        })
    }
}

fn summarize_events(events: &[DisruptionEvent]) -> Result<DisruptionSummary, ServiceError> {
    let mut total_estimated_impact = Decimal::ZERO;
    for event in events {
        let impact = parse_estimated_impact(&event.estimated_impact).map_err(|err| {
            error!(disruption_id = %event.id, error = %err, "Unparseable estimated impact");
            ServiceError::DataQuality(format!("disruption {}: {}", event.id, err))
        })?;
        total_estimated_impact = total_estimated_impact.checked_add(impact).ok_or_else(|| {
            error!(disruption_id = %event.id, "Total estimated impact overflowed");
            ServiceError::DataQuality(format!(
                "disruption {}: total estimated impact overflowed",
                event.id
            ))
        })?;
    }

    Ok(DisruptionSummary {
        total: events.len(),
        active: events.iter().filter(|e| e.is_active()).count(),
        total_affected_stores: events.iter().map(|e| u64::from(e.affected_stores)).sum(),
        total_estimated_impact,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone, Utc};
    use rstest::rstest;

    fn service() -> DisruptionService {
        let anchor = Utc.with_ymd_and_hms(2025, 7, 10, 12, 0, 0).unwrap();
        DisruptionService::new(Arc::new(Dataset::builtin(anchor)))
    }

    #[rstest]
    #[case("$2.3M", dec!(2300000))]
    #[case("$450K", dec!(450000))]
    #[case("$1,250K", dec!(1250000))]
    #[case("  $0.5m ", dec!(500000))]
    #[case("890K", dec!(890000))]
    fn parses_scaled_amounts(#[case] raw: &str, #[case] expected: Decimal) {
        assert_eq!(parse_estimated_impact(raw).unwrap(), expected);
    }

    #[rstest]
    #[case("", ImpactParseError::Empty)]
    #[case("$", ImpactParseError::Empty)]
    #[case("$1200", ImpactParseError::MissingScale("$1200".into()))]
    #[case("$3B", ImpactParseError::MissingScale("$3B".into()))]
    #[case("$M", ImpactParseError::InvalidAmount("$M".into()))]
    #[case("$-2M", ImpactParseError::InvalidAmount("$-2M".into()))]
    #[case("$2.3.1M", ImpactParseError::InvalidAmount("$2.3.1M".into()))]
    #[case(
        "$79228162514264337593543950335M",
        ImpactParseError::InvalidAmount("$79228162514264337593543950335M".into())
    )]
    fn rejects_unscaled_or_malformed_amounts(#[case] raw: &str, #[case] expected: ImpactParseError) {
        assert_eq!(parse_estimated_impact(raw), Err(expected));
    }

    #[test]
    fn scale_table_is_case_insensitive() {
        assert_eq!(impact_scale('m'), Some(dec!(1000000)));
        assert_eq!(impact_scale('K'), Some(dec!(1000)));
        assert_eq!(impact_scale('B'), None);
    }

    #[test]
    fn builtin_summary_matches_fixture_totals() {
        let response = service().summarize().unwrap();

        assert_eq!(response.summary.total, 4);
        assert_eq!(response.summary.active, 3);
        assert_eq!(response.summary.total_affected_stores, 335);
        assert_eq!(response.summary.total_estimated_impact, dec!(5440000));
    }

    #[test]
    fn records_are_newest_first() {
        let response = service().summarize().unwrap();
        let ids: Vec<&str> = response.disruptions.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "4", "2", "3"]);
    }

    #[test]
    fn equal_timestamps_keep_authored_order() {
        let anchor = Utc.with_ymd_and_hms(2025, 7, 10, 12, 0, 0).unwrap();
        let mut dataset = Dataset::builtin(anchor);
        for event in dataset.disruptions.iter_mut() {
            event.timestamp = anchor - Duration::minutes(5);
        }
        let service = DisruptionService::new(Arc::new(dataset));

        let ids: Vec<String> = service
            .summarize()
            .unwrap()
            .disruptions
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn source_records_are_not_reordered() {
        let service = service();
        let before = service.dataset.disruptions.clone();
        service.summarize().unwrap();
        assert_eq!(service.dataset.disruptions, before);
    }

    #[test]
    fn bad_impact_is_a_data_quality_error() {
        let anchor = Utc.with_ymd_and_hms(2025, 7, 10, 12, 0, 0).unwrap();
        let mut dataset = Dataset::builtin(anchor);
        dataset.disruptions[2].estimated_impact = "$1.1B".to_string();
        let service = DisruptionService::new(Arc::new(dataset));

        assert_matches!(service.summarize(), Err(ServiceError::DataQuality(msg)) => {
            assert!(msg.contains("disruption 3"));
        });
    }

    #[test]
    fn overflowing_total_is_a_data_quality_error() {
        let anchor = Utc.with_ymd_and_hms(2025, 7, 10, 12, 0, 0).unwrap();
        let mut dataset = Dataset::builtin(anchor);
        for event in dataset.disruptions.iter_mut().take(2) {
            event.estimated_impact = "$79228162514264337593543M".to_string();
        }
        let service = DisruptionService::new(Arc::new(dataset));

        assert_matches!(service.summarize(), Err(ServiceError::DataQuality(msg)) => {
            assert!(msg.contains("overflowed"));
        });
    }

    #[test]
    fn empty_dataset_summarizes_to_zero() {
        let service = DisruptionService::new(Arc::new(Dataset::default()));
        let response = service.summarize().unwrap();
        assert!(response.disruptions.is_empty());
        assert_eq!(response.summary.total, 0);
        assert_eq!(response.summary.total_estimated_impact, Decimal::ZERO);
    }
}
