//! HTTP-level tests for the collector router
//!
//! Run the full router against the in-memory store, and against a mocked
//! store for failure paths.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use mockall::mock;
use tower::ServiceExt;
use uniques_collector::{create_router, AppState, CONTENT_TYPE_FORM};
use uniques_common::{ClientId, Day, DayWindow, StorageError};
use uniques_store::{CountingStore, Deadline, InMemoryCountingStore};

mock! {
    pub Store {}

    #[async_trait]
    impl CountingStore for Store {
        async fn insert(&self, client_id: ClientId, day: Day, deadline: Deadline) -> Result<(), StorageError>;
        async fn count_distinct_on_day(&self, day: Day, deadline: Deadline) -> Result<u64, StorageError>;
        async fn count_distinct_in_window(&self, window: DayWindow, deadline: Deadline) -> Result<u64, StorageError>;
        async fn ping(&self, deadline: Deadline) -> Result<(), StorageError>;
    }
}

const A: &str = "6f1c2b5e-3a3d-4c1e-9b7a-2f4c9d8e1a01";
const B: &str = "0b8e6a52-9f0a-4d59-8a8e-51a7c3d2e402";

fn app_with(store: Arc<dyn CountingStore>) -> Router {
    create_router(AppState::new(store, Duration::from_secs(5)))
}

fn memory_app() -> Router {
    app_with(Arc::new(InMemoryCountingStore::new()))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_collect_then_query_scenario() {
    let app = memory_app();

    // 2021-05-01 and 2021-05-02 at noon UTC
    for uri in [
        format!("/collect?cid={}&d=1619870400", A),
        format!("/collect?cid={}&d=1619870400", B),
        format!("/collect?cid={}&d=1619956800", A),
    ] {
        let (status, content_type, body) = get(&app, &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some(CONTENT_TYPE_FORM));
        assert!(body.is_empty());
    }

    assert_eq!(get(&app, "/daily_uniques?d=20210501").await.2, "2");
    assert_eq!(get(&app, "/daily_uniques?d=20210502").await.2, "1");
    assert_eq!(get(&app, "/monthly_uniques?d=20210502").await.2, "2");
    assert_eq!(get(&app, "/monthly_uniques?d=20210601").await.2, "2");
    assert_eq!(get(&app, "/monthly_uniques?d=20210603").await.2, "0");
}

#[tokio::test]
async fn test_repeat_collect_is_idempotent() {
    let app = memory_app();
    let uri = format!("/collect?cid={}&d=1619870400", A);

    for _ in 0..5 {
        assert_eq!(get(&app, &uri).await.0, StatusCode::OK);
    }
    assert_eq!(get(&app, "/daily_uniques?d=20210501").await.2, "1");
}

#[tokio::test]
async fn test_collect_without_timestamp_counts_today() {
    let app = memory_app();
    assert_eq!(get(&app, &format!("/collect?cid={}", A)).await.0, StatusCode::OK);

    let today = Day::today().to_string();
    let (status, _, body) = get(&app, &format!("/daily_uniques?d={}", today)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "1");
}

#[tokio::test]
async fn test_bad_input_is_400() {
    let app = memory_app();

    for uri in [
        "/collect?cid=not-a-uuid".to_string(),
        "/collect".to_string(),
        format!("/collect?cid={}&d=tomorrow", A),
        format!("/collect?cid={}&d=99999999999999999999", A),
        "/daily_uniques?d=bad".to_string(),
        "/daily_uniques".to_string(),
        "/monthly_uniques?d=2021-05-01".to_string(),
        "/monthly_uniques?d=20210230".to_string(),
    ] {
        let (status, _, _) = get(&app, &uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[tokio::test]
async fn test_empty_day_is_zero() {
    let app = memory_app();
    let (status, content_type, body) = get(&app, "/daily_uniques?d=20210501").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some(CONTENT_TYPE_FORM));
    assert_eq!(body, "0");
}

#[tokio::test]
async fn test_wrong_method_is_405() {
    let app = memory_app();
    let request = Request::builder()
        .method("POST")
        .uri(format!("/collect?cid={}", A))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_storage_failure_is_500() {
    let mut store = MockStore::new();
    store
        .expect_insert()
        .returning(|_, _, _| Err(StorageError::Connection("refused".to_string())));
    store
        .expect_count_distinct_on_day()
        .returning(|_, _| Err(StorageError::Backend("oops".to_string())));
    store
        .expect_count_distinct_in_window()
        .returning(|_, _| Err(StorageError::DeadlineExceeded));
    let app = app_with(Arc::new(store));

    let (status, _, body) = get(&app, &format!("/collect?cid={}", A)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.contains("refused"));

    assert_eq!(
        get(&app, "/daily_uniques?d=20210501").await.0,
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        get(&app, "/monthly_uniques?d=20210501").await.0,
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn test_validation_skips_store() {
    // No expectations: any store call would panic the mock
    let app = app_with(Arc::new(MockStore::new()));

    assert_eq!(get(&app, "/collect?cid=nope").await.0, StatusCode::BAD_REQUEST);
    assert_eq!(get(&app, "/daily_uniques?d=nope").await.0, StatusCode::BAD_REQUEST);
    assert_eq!(get(&app, "/monthly_uniques?d=nope").await.0, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_collect_normalizes_to_utc_day() {
    let mut store = MockStore::new();
    let expected_client = ClientId::parse(A).unwrap();
    store
        .expect_insert()
        .withf(move |client, day, _| {
            *client == expected_client && *day == Day::from_ymd(2021, 5, 1).unwrap()
        })
        .times(1)
        .returning(|_, _, _| Ok(()));
    let app = app_with(Arc::new(store));

    // 2021-05-01T23:59:59Z
    let uri = format!("/collect?cid={}&d=1619913599", A.to_uppercase());
    assert_eq!(get(&app, &uri).await.0, StatusCode::OK);
}

#[tokio::test]
async fn test_monthly_uses_calendar_month_window() {
    let mut store = MockStore::new();
    store
        .expect_count_distinct_in_window()
        .withf(|window, _| {
            window.start == Day::from_ymd(2021, 2, 28).unwrap()
                && window.end == Day::from_ymd(2021, 3, 31).unwrap()
        })
        .times(1)
        .returning(|_, _| Ok(42));
    let app = app_with(Arc::new(store));

    assert_eq!(get(&app, "/monthly_uniques?d=20210331").await.2, "42");
}

#[tokio::test]
async fn test_health() {
    let (status, _, body) = get(&memory_app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "healthy");

    let mut store = MockStore::new();
    store
        .expect_ping()
        .returning(|_| Err(StorageError::Connection("down".to_string())));
    let (status, _, _) = get(&app_with(Arc::new(store)), "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
