use anyhow::Result;
use folio_press::domain::model::{Certification, PortfolioStatus, Skill};
use folio_press::domain::ports::RecordStore;
use folio_press::{FolioError, HttpRecordStore};
use httpmock::prelude::*;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

fn store(server: &MockServer) -> HttpRecordStore {
    HttpRecordStore::new(Client::new(), &server.url("/v1"), "portfolios")
        .with_retry(2, Duration::from_millis(10))
}

#[tokio::test]
async fn test_fetch_record_with_bearer_key() -> Result<()> {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/portfolios/jane")
                .header("Authorization", "Bearer secret-key");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "username": "jane",
                    "templateId": "template02",
                    "status": "inactive",
                    "fullName": "Jane Doe",
                    "profilePhoto": "https://cdn.example.com/jane.png",
                    "skills": ["Go", { "name": "Rust" }],
                    "certifications": ["AWS SAA", { "name": "CKA", "issuer": "CNCF" }],
                    "updatedAt": "2026-03-01T12:00:00Z"
                }));
        })
        .await;

    let record = store(&server)
        .with_api_key(Some("secret-key".to_string()))
        .fetch("jane")
        .await?
        .expect("record exists");

    mock.assert_async().await;
    assert_eq!(record.full_name.as_deref(), Some("Jane Doe"));
    assert_eq!(record.status, PortfolioStatus::Inactive);
    assert_eq!(
        record.profile_photo_url.as_deref(),
        Some("https://cdn.example.com/jane.png")
    );
    assert!(matches!(&record.skills[1], Skill::Named { name } if name == "Rust"));
    assert!(matches!(&record.certifications[0], Certification::Title(t) if t == "AWS SAA"));
    assert!(record.updated_at.is_some());
    Ok(())
}

#[tokio::test]
async fn test_missing_record_is_none() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/portfolios/ghost");
            then.status(404);
        })
        .await;

    assert!(store(&server).fetch("ghost").await?.is_none());
    mock.assert_hits_async(1).await;
    Ok(())
}

#[tokio::test]
async fn test_server_errors_are_retried() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/portfolios/jane");
            then.status(503);
        })
        .await;

    let result = store(&server).fetch("jane").await;

    assert!(matches!(result, Err(FolioError::RecordStoreError { .. })));
    // 第一次加上兩次重試
    mock.assert_hits_async(3).await;
    Ok(())
}

#[tokio::test]
async fn test_client_errors_are_not_retried() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/portfolios/jane");
            then.status(401);
        })
        .await;

    let result = store(&server).fetch("jane").await;

    let error = result.expect_err("401 is an upstream failure");
    assert_eq!(error.status_code(), 502);
    mock.assert_hits_async(1).await;
    Ok(())
}

#[tokio::test]
async fn test_malformed_body_is_upstream_error() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/portfolios/jane");
            then.status(200).body("<html>not json</html>");
        })
        .await;

    let result = store(&server).fetch("jane").await;
    assert!(matches!(result, Err(FolioError::RecordStoreError { .. })));
    Ok(())
}

#[test]
fn test_fetch_blocking_on_single_future() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1/portfolios/sam");
        then.status(200).json_body(json!({ "fullName": "Sam" }));
    });

    let record = tokio_test::block_on(store(&server).fetch("sam")).unwrap();
    assert_eq!(record.and_then(|r| r.full_name).as_deref(), Some("Sam"));
}
