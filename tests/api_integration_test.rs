// API integration tests that verify HTTP endpoints
// Tests the Axum router with in-memory requests

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{NaiveDate, TimeZone, Utc};
use http_body_util::BodyExt; // For `.collect()`
use lake_quality_service::api::{create_router, AppState};
use lake_quality_service::classifier::SafetyPolicy;
use lake_quality_service::fetcher::SnippetFetcher;
use lake_quality_service::model::{
    DiagnosticKind, LakeDataset, LakeDiagnostic, LakeRecord, NumericValue, Status,
};
use lake_quality_service::services::{DatasetService, LakeDatasetBuilder};
use serde_json::Value;
use tower::ServiceExt; // For `oneshot`

/// Test fixture module for API tests
mod api_test_fixtures {
    use super::*;

    pub fn empty_service() -> DatasetService {
        let fetcher =
            SnippetFetcher::new("http://127.0.0.1:1/{id}".to_string(), Duration::from_secs(1), 0)
                .unwrap();
        DatasetService::new(LakeDatasetBuilder::new(fetcher, SafetyPolicy::default()), vec![])
    }

    pub fn dataset() -> LakeDataset {
        LakeDataset {
            generated_at: Utc.with_ymd_and_hms(2025, 7, 20, 12, 0, 0).unwrap(),
            records: vec![LakeRecord {
                id: "bwls0088".to_string(),
                name: "Cospudener See".to_string(),
                lat: 51.26915113014249,
                lon: 12.334952110757772,
                location: Some("Nordstrand".to_string()),
                sample_date: NaiveDate::from_ymd_opt(2025, 7, 14).unwrap(),
                abnormality: "nein".to_string(),
                sight: Some(3.0),
                enterococci: Some(NumericValue::Value(15)),
                coli: Some(NumericValue::ErrorInData),
                microscopy: Some(String::new()),
                status: Status::Unsafe,
            }],
            diagnostics: vec![LakeDiagnostic {
                lake_id: "bwwl0101".to_string(),
                lake_name: "Harthsee".to_string(),
                url: "http://localhost/bwwl0101-de-content.snippet".to_string(),
                kind: DiagnosticKind::DataUnavailable,
                message: "expected 2 tables, found 1".to_string(),
            }],
        }
    }

    pub async fn ready_service() -> DatasetService {
        let service = empty_service();
        service.publish(dataset()).await;
        service
    }

    pub async fn get(service: DatasetService, uri: &str) -> (StatusCode, Option<Value>) {
        let app = create_router(AppState {
            dataset_service: service,
        });
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).ok();
        (status, json)
    }
}

use api_test_fixtures::*;

#[tokio::test]
async fn test_health() {
    let (status, body) = get(empty_service(), "/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["status"], "healthy");
}

#[tokio::test]
async fn test_lakes_before_first_refresh_is_unavailable() {
    let (status, _) = get(empty_service(), "/api/v1/lakes").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = get(empty_service(), "/api/v1/lakes/bwls0088").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = get(empty_service(), "/api/v1/diagnostics").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_list_lakes() {
    let (status, body) = get(ready_service().await, "/api/v1/lakes").await;
    assert_eq!(status, StatusCode::OK);

    let body = body.unwrap();
    assert_eq!(body["total_lakes"], 1);
    let lake = &body["lakes"][0];
    assert_eq!(lake["id"], "bwls0088");
    assert_eq!(lake["sample_date"], "2025-07-14");
    assert_eq!(lake["status"], "UNSAFE");
    assert_eq!(lake["enterococci"], 15);
    assert_eq!(lake["coli"], "error_in_data");
    assert_eq!(lake["location"], "Nordstrand");
}

#[tokio::test]
async fn test_get_lake_by_id() {
    let (status, body) = get(ready_service().await, "/api/v1/lakes/bwls0088").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["name"], "Cospudener See");
}

#[tokio::test]
async fn test_get_unknown_lake_is_not_found() {
    let (status, _) = get(ready_service().await, "/api/v1/lakes/bwwl0101").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_diagnostics() {
    let (status, body) = get(ready_service().await, "/api/v1/diagnostics").await;
    assert_eq!(status, StatusCode::OK);

    let body = body.unwrap();
    assert_eq!(body["total"], 1);
    assert_eq!(body["diagnostics"][0]["kind"], "data_unavailable");
    assert_eq!(body["diagnostics"][0]["lake_name"], "Harthsee");
}
