mod common;

use chrono::Duration;
use common::{anchor, response_json, TestApp};
use serde_json::json;
use supply_insights_api::datasets::Dataset;

#[tokio::test]
async fn disruptions_are_listed_newest_first() {
    let app = TestApp::new();
    let (status, body) = response_json(app.get("/api/v1/disruption").await).await;

    assert_eq!(status, 200);
    let ids: Vec<&str> = body["disruptions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|event| event["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["1", "4", "2", "3"]);

    let first = &body["disruptions"][0];
    assert_eq!(first["type"], "weather");
    assert_eq!(first["severity"], "high");
    assert_eq!(first["affectedStores"], 156);
    assert_eq!(first["estimatedImpact"], "$2.3M");
    assert_eq!(first["location"], json!({"lat": 28.5383, "lng": -81.3792}));
}

#[tokio::test]
async fn summary_totals_cover_every_event() {
    let app = TestApp::new();
    let (_, body) = response_json(app.get("/api/v1/disruption").await).await;

    assert_eq!(
        body["summary"],
        json!({
            "total": 4,
            "active": 3,
            "totalAffectedStores": 335,
            "totalEstimatedImpact": 5440000.0
        })
    );
}

#[tokio::test]
async fn repeated_reads_return_the_same_payload() {
    let app = TestApp::new();
    let (_, first) = response_json(app.get("/api/v1/disruption").await).await;
    let (_, second) = response_json(app.get("/api/v1/disruption").await).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn equal_timestamps_keep_their_stored_order() {
    let mut dataset = Dataset::builtin(anchor());
    for event in &mut dataset.disruptions {
        event.timestamp = anchor() - Duration::hours(3);
    }
    let app = TestApp::with_dataset(dataset);

    let (_, body) = response_json(app.get("/api/v1/disruption").await).await;
    let ids: Vec<&str> = body["disruptions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|event| event["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["1", "2", "3", "4"]);
}

#[tokio::test]
async fn empty_dataset_yields_zero_summary() {
    let app = TestApp::with_dataset(Dataset::default());
    let (status, body) = response_json(app.get("/api/v1/disruption").await).await;

    assert_eq!(status, 200);
    assert_eq!(body["disruptions"], json!([]));
    assert_eq!(body["summary"]["total"], 0);
    assert_eq!(body["summary"]["totalEstimatedImpact"], 0.0);
}

#[tokio::test]
async fn malformed_impact_is_an_internal_error() {
    let mut dataset = Dataset::builtin(anchor());
    dataset.disruptions[2].estimated_impact = "about two million".to_string();
    let app = TestApp::with_dataset(dataset);

    let (status, body) = response_json(app.get("/api/v1/disruption").await).await;
    assert_eq!(status, 500);
    assert_eq!(body["code"], "internal");
    assert_eq!(body["error"], "Internal server error");
    assert!(body.get("disruptions").is_none());
}
