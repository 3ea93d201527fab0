use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::config::Config;
use crate::contact_store::{ContactRecord, ContactStore};
use crate::{
    API_THROTTLE_MESSAGE, DUPLICATE_SUBMISSION_MESSAGE, MALFORMED_PAYLOAD_MESSAGE,
    NOT_FOUND_MESSAGE, SUBMIT_SUCCESS_MESSAGE, SUBMIT_THROTTLE_MESSAGE, UNAUTHORIZED_MESSAGE,
    build_router, build_router_with_store,
};

async fn read_json(response: axum::response::Response) -> Result<Value> {
    let bytes = response.into_body().collect().await?.to_bytes();
    Ok(serde_json::from_slice(&bytes)?)
}

fn submit_request(payload: &Value, ip: &str) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method("POST")
        .uri("/api/contact/submit")
        .header("content-type", "application/json")
        .header("x-forwarded-for", ip)
        .header("user-agent", "router-test")
        .body(Body::from(serde_json::to_vec(payload)?))?)
}

fn valid_payload(email: &str) -> Value {
    json!({
        "name": "Ada Lovelace",
        "email": email,
        "company": "Brightlane",
        "message": "Tell me more about your retainers.",
    })
}

fn seeded_record(index: usize, minutes_ago: i64) -> ContactRecord {
    ContactRecord {
        id: format!("ct_seed{index}"),
        name: format!("Visitor {index}"),
        email: format!("visitor{index}@example.com"),
        company: String::new(),
        message: "seeded".to_string(),
        submitted_at: Utc::now() - Duration::minutes(minutes_ago),
        ip_address: "203.0.113.50".to_string(),
        user_agent: "seed".to_string(),
    }
}

#[tokio::test]
async fn root_route_reports_running() -> Result<()> {
    let app = build_router(Config::for_tests());
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await?;
    assert_eq!(body["message"], "Contact Form API Server");
    assert_eq!(body["status"], "Running");
    assert!(body["timestamp"].is_string());
    Ok(())
}

#[tokio::test]
async fn health_route_returns_ok_with_uptime() -> Result<()> {
    let app = build_router(Config::for_tests());
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await?;
    assert_eq!(body["status"], "OK");
    assert_eq!(body["service"], "brightlane-contact-service");
    assert!(body["uptime"].is_u64());
    Ok(())
}

#[tokio::test]
async fn probes_never_touch_the_store() -> Result<()> {
    let config = Config::for_tests();
    let store = ContactStore::from_config(&config);
    store.seed_record(seeded_record(0, 1)).await;
    let app = build_router_with_store(config, store.clone());

    for _ in 0..3 {
        for path in ["/", "/health"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(path).body(Body::empty())?)
                .await?;
            assert_eq!(response.status(), StatusCode::OK, "{path}");
        }
    }
    assert_eq!(store.count().await, 1);
    Ok(())
}

#[tokio::test]
async fn unknown_route_returns_not_found_envelope() -> Result<()> {
    let app = build_router(Config::for_tests());
    let response = app
        .oneshot(Request::builder().uri("/nope").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json(response).await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], NOT_FOUND_MESSAGE);
    Ok(())
}

#[tokio::test]
async fn valid_submission_is_stored_and_acknowledged() -> Result<()> {
    let config = Config::for_tests();
    let store = ContactStore::from_config(&config);
    let app = build_router_with_store(config, store.clone());

    let response = app
        .oneshot(submit_request(
            &valid_payload(" Ada@Example.COM "),
            "203.0.113.7",
        )?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], SUBMIT_SUCCESS_MESSAGE);
    let submission_id = body["submissionId"].as_str().unwrap_or_default();
    assert!(submission_id.starts_with("ct_"));

    assert_eq!(store.count().await, 1);
    let page = store.list_page(1, 10).await;
    assert_eq!(page.entries[0].email, "ada@example.com");
    assert_eq!(page.entries[0].name, "Ada Lovelace");
    Ok(())
}

#[tokio::test]
async fn submission_validation_rejections_store_nothing() -> Result<()> {
    let cases: Vec<(Value, &str)> = vec![
        (
            json!({"email": "ada@example.com", "message": "hi"}),
            "Name, email, and message are required fields.",
        ),
        (
            json!({"name": "Ada", "email": "   ", "message": "hi"}),
            "Name, email, and message are required fields.",
        ),
        (
            json!({"name": "Ada", "email": "ada@example", "message": "hi"}),
            "Please enter a valid email address.",
        ),
        (
            json!({
                "name": "A".repeat(101),
                "email": "ada@example.com",
                "message": "hi",
            }),
            "Name must be less than 100 characters.",
        ),
        (
            json!({
                "name": "Ada",
                "email": "ada@example.com",
                "message": "m".repeat(1001),
            }),
            "Message must be less than 1000 characters.",
        ),
        (
            json!({
                "name": "Ada",
                "email": "ada@example.com",
                "company": "c".repeat(101),
                "message": "hi",
            }),
            "Company name must be less than 100 characters.",
        ),
    ];

    for (payload, expected_message) in cases {
        let config = Config::for_tests();
        let store = ContactStore::from_config(&config);
        let app = build_router_with_store(config, store.clone());

        let response = app.oneshot(submit_request(&payload, "203.0.113.8")?).await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{payload}");
        let body = read_json(response).await?;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], expected_message);
        assert_eq!(store.count().await, 0);
    }
    Ok(())
}

#[tokio::test]
async fn trailing_dot_domain_is_accepted() -> Result<()> {
    // Dots are ordinary domain characters as long as one of them has text
    // on both sides, so a trailing dot after a full domain is fine.
    let config = Config::for_tests();
    let store = ContactStore::from_config(&config);
    let app = build_router_with_store(config, store.clone());

    let response = app
        .oneshot(submit_request(
            &valid_payload("ada@example.com."),
            "203.0.113.20",
        )?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.count().await, 1);
    Ok(())
}

#[tokio::test]
async fn malformed_json_body_is_rejected() -> Result<()> {
    let app = build_router(Config::for_tests());
    let request = Request::builder()
        .method("POST")
        .uri("/api/contact/submit")
        .header("content-type", "application/json")
        .header("x-forwarded-for", "203.0.113.9")
        .body(Body::from("{not json"))?;
    let response = app.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await?;
    assert_eq!(body["message"], MALFORMED_PAYLOAD_MESSAGE);
    Ok(())
}

#[tokio::test]
async fn duplicate_email_within_window_is_throttled() -> Result<()> {
    let config = Config::for_tests();
    let store = ContactStore::from_config(&config);
    let app = build_router_with_store(config, store.clone());

    let first = app
        .clone()
        .oneshot(submit_request(
            &valid_payload("repeat@example.com"),
            "203.0.113.10",
        )?)
        .await?;
    assert_eq!(first.status(), StatusCode::OK);

    // Different IP, same email: the duplicate window keys on email alone.
    let second = app
        .oneshot(submit_request(
            &valid_payload("repeat@example.com"),
            "203.0.113.11",
        )?)
        .await?;
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = read_json(second).await?;
    assert_eq!(body["message"], DUPLICATE_SUBMISSION_MESSAGE);
    assert_eq!(store.count().await, 1);
    Ok(())
}

#[tokio::test]
async fn stale_submission_does_not_block_resubmission() -> Result<()> {
    let config = Config::for_tests();
    let store = ContactStore::from_config(&config);

    let mut old = seeded_record(0, 6);
    old.email = "returning@example.com".to_string();
    store.seed_record(old).await;

    let app = build_router_with_store(config, store.clone());
    let response = app
        .oneshot(submit_request(
            &valid_payload("returning@example.com"),
            "203.0.113.12",
        )?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.count().await, 2);
    Ok(())
}

#[tokio::test]
async fn sixth_submission_from_one_ip_is_rate_limited() -> Result<()> {
    let config = Config::for_tests();
    let store = ContactStore::from_config(&config);
    let app = build_router_with_store(config, store.clone());

    for index in 0..5 {
        let response = app
            .clone()
            .oneshot(submit_request(
                &valid_payload(&format!("visitor{index}@example.com")),
                "203.0.113.13",
            )?)
            .await?;
        assert_eq!(response.status(), StatusCode::OK, "submission {index}");
    }

    let sixth = app
        .oneshot(submit_request(
            &valid_payload("visitor5@example.com"),
            "203.0.113.13",
        )?)
        .await?;
    assert_eq!(sixth.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = read_json(sixth).await?;
    assert_eq!(body["message"], SUBMIT_THROTTLE_MESSAGE);
    assert_eq!(store.count().await, 5);
    Ok(())
}

#[tokio::test]
async fn global_api_throttle_trips_after_one_hundred_requests() -> Result<()> {
    let app = build_router(Config::for_tests());

    for _ in 0..100 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/contacts")
                    .header("x-forwarded-for", "203.0.113.14")
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let overflow = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/contacts")
                .header("x-forwarded-for", "203.0.113.14")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(overflow.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = read_json(overflow).await?;
    assert_eq!(body["message"], API_THROTTLE_MESSAGE);

    // Health probes sit outside /api and never throttle.
    let health = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-forwarded-for", "203.0.113.14")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(health.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn listing_paginates_newest_first_without_request_metadata() -> Result<()> {
    let config = Config::for_tests();
    let store = ContactStore::from_config(&config);
    for index in 0..25 {
        store.seed_record(seeded_record(index, 25 - index as i64)).await;
    }
    let app = build_router_with_store(config, store);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/contacts?page=2&limit=10")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["pagination"]["currentPage"], 2);
    assert_eq!(body["pagination"]["totalPages"], 3);
    assert_eq!(body["pagination"]["totalContacts"], 25);
    assert_eq!(body["pagination"]["limit"], 10);

    let contacts = body["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(contacts.len(), 10);
    // Seeds 24..0 sort newest first, so page 2 starts at seed 14.
    assert_eq!(contacts[0]["id"], "ct_seed14");
    for contact in &contacts {
        assert!(contact.get("ipAddress").is_none());
        assert!(contact.get("userAgent").is_none());
        assert!(contact["submittedAt"].is_string());
    }
    Ok(())
}

#[tokio::test]
async fn listing_defaults_invalid_page_params() -> Result<()> {
    let config = Config::for_tests();
    let store = ContactStore::from_config(&config);
    for index in 0..12 {
        store.seed_record(seeded_record(index, 12 - index as i64)).await;
    }
    let app = build_router_with_store(config, store);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/contacts?page=zero&limit=0")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await?;
    assert_eq!(body["pagination"]["currentPage"], 1);
    assert_eq!(body["pagination"]["totalPages"], 2);
    assert_eq!(body["pagination"]["limit"], 10);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(10));
    Ok(())
}

#[tokio::test]
async fn listing_requires_api_key_when_configured() -> Result<()> {
    let mut config = Config::for_tests();
    config.contacts_api_key = Some("review-key".to_string());
    let app = build_router(config);

    let denied = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/contacts")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(denied).await?;
    assert_eq!(body["message"], UNAUTHORIZED_MESSAGE);

    let allowed = app
        .oneshot(
            Request::builder()
                .uri("/api/contacts")
                .header("x-api-key", "review-key")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(allowed.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn cors_preflight_allows_known_origin_only() -> Result<()> {
    let app = build_router(Config::for_tests());

    let allowed = app
        .clone()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/contact/submit")
                .header("origin", "https://brightlane.studio")
                .header("access-control-request-method", "POST")
                .header("access-control-request-headers", "content-type")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(
        allowed
            .headers()
            .get("access-control-allow-origin")
            .and_then(|value| value.to_str().ok()),
        Some("https://brightlane.studio")
    );

    let denied = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/contact/submit")
                .header("origin", "https://evil.example")
                .header("access-control-request-method", "POST")
                .body(Body::empty())?,
        )
        .await?;
    assert!(
        denied
            .headers()
            .get("access-control-allow-origin")
            .is_none()
    );
    Ok(())
}

#[tokio::test]
async fn responses_carry_security_headers() -> Result<()> {
    let app = build_router(Config::for_tests());
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty())?)
        .await?;

    let header = |name: &str| {
        response
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    assert_eq!(header("x-content-type-options").as_deref(), Some("nosniff"));
    assert_eq!(header("x-frame-options").as_deref(), Some("SAMEORIGIN"));
    assert_eq!(header("referrer-policy").as_deref(), Some("no-referrer"));
    Ok(())
}

#[tokio::test]
async fn submissions_survive_a_restart_when_store_path_is_set() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut config = Config::for_tests();
    config.store_path = Some(dir.path().join("contacts.json"));

    let app = build_router(config.clone());
    let response = app
        .oneshot(submit_request(
            &valid_payload("durable@example.com"),
            "203.0.113.15",
        )?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let reloaded = ContactStore::from_config(&config);
    assert_eq!(reloaded.count().await, 1);
    Ok(())
}
