//! Integration tests for the public submission endpoints.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use common::{body_json, json_request, post_from, test_config, TestApp};
use emlak_core::rate_limit::{RateLimit, RateLimitStore};
use emlak_core::roles::Role;
use emlak_core::submission::RequestedTransaction;

fn customer_request() -> Value {
    json!({
        "customer_name": "  Ayse Yilmaz  ",
        "customer_phone": "05321234567",
        "listing_type": "sale",
        "property_type": "residential",
        "min_budget": "1000000",
        "max_budget": 2_500_000,
        "note": "Near a metro station"
    })
}

fn offer(listing_id: Uuid) -> Value {
    json!({
        "listing_id": listing_id,
        "customer_name": "Mehmet Demir",
        "customer_phone": "05441234567",
        "offer_amount": 1_400_000
    })
}

fn seeded() -> (TestApp, Uuid) {
    let app = TestApp::new();
    let owner = app.store.add_profile(Role::SalesAgent);
    let listing_id = app.store.add_listing(owner);
    (app, listing_id)
}

// ---------------------------------------------------------------------------
// Customer requests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn customer_request_is_stored_with_address() {
    let app = TestApp::new();

    let response = app
        .send(post_from("/api/v1/customer-requests", "203.0.113.7", &customer_request()))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "ok": true }));

    let stored = app.store.customer_requests();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].customer_name, "Ayse Yilmaz");
    assert_eq!(stored[0].listing_type, RequestedTransaction::Sale);
    assert_eq!(stored[0].min_budget, Some(1_000_000));
    assert_eq!(stored[0].max_budget, Some(2_500_000));
    assert_eq!(stored[0].ip_address.as_deref(), Some("203.0.113.7"));
}

#[tokio::test]
async fn customer_request_lists_missing_fields() {
    let app = TestApp::new();
    let body = json!({ "customer_name": "Ayse", "listing_type": "rent" });

    let response = app
        .send(post_from("/api/v1/customer-requests", "203.0.113.7", &body))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    let message = json["error"].as_str().unwrap();
    assert!(message.contains("customer_phone"));
    assert!(message.contains("property_type"));
    assert!(app.store.customer_requests().is_empty());
}

#[tokio::test]
async fn short_phone_is_rejected() {
    let app = TestApp::new();
    let mut body = customer_request();
    body["customer_phone"] = json!("123");

    let response = app
        .send(post_from("/api/v1/customer-requests", "203.0.113.7", &body))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.store.customer_requests().is_empty());
}

#[tokio::test]
async fn unknown_listing_type_is_rejected() {
    let app = TestApp::new();
    let mut body = customer_request();
    body["listing_type"] = json!("lease-to-own");

    let response = app
        .send(post_from("/api/v1/customer-requests", "203.0.113.7", &body))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn third_customer_request_in_window_is_rate_limited() {
    let app = TestApp::new();
    let uri = "/api/v1/customer-requests";

    for _ in 0..2 {
        let response = app.send(post_from(uri, "198.51.100.1", &customer_request())).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.send(post_from(uri, "198.51.100.1", &customer_request())).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let json = body_json(response).await;
    assert_eq!(json["code"], "RATE_LIMITED");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("at most 2 requests per 10 minutes"));

    // Another address has its own budget.
    let response = app.send(post_from(uri, "198.51.100.2", &customer_request())).await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(app.store.customer_requests().len(), 3);
}

#[tokio::test]
async fn customer_request_is_accepted_once_the_window_has_passed() {
    let app = TestApp::new();
    let address = "198.51.100.3";
    let rule = [app.config.intake_limits.customer_request_rule(address)];
    let t0 = Utc::now() - Duration::minutes(15);

    // Two requests at t0 and t0+1m, a third at t0+2m is refused.
    for minutes in [0, 1] {
        let decision = app
            .limiter
            .check_and_consume(&rule, t0 + Duration::minutes(minutes))
            .await
            .unwrap();
        assert!(decision.is_allowed());
    }
    let decision = app
        .limiter
        .check_and_consume(&rule, t0 + Duration::minutes(2))
        .await
        .unwrap();
    assert!(!decision.is_allowed());

    // t0+15m is now.
    let response = app
        .send(post_from("/api/v1/customer-requests", address, &customer_request()))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.store.customer_requests().len(), 1);
}

#[tokio::test]
async fn failing_limiter_is_500_and_stores_nothing() {
    let (app, listing_id) = seeded();
    let app = app.with_failing_limiter();

    let response = app
        .send(post_from("/api/v1/customer-requests", "198.51.100.4", &customer_request()))
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "An internal error occurred");
    assert!(!json.to_string().contains("limiter-host"));

    let response = app
        .send(post_from("/api/v1/offers", "198.51.100.4", &offer(listing_id)))
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    assert!(app.store.customer_requests().is_empty());
    assert!(app.store.offers().is_empty());
}

#[tokio::test]
async fn invalid_submissions_do_not_consume_quota() {
    let app = TestApp::new();
    let uri = "/api/v1/customer-requests";
    let mut invalid = customer_request();
    invalid["customer_phone"] = json!("123");

    for _ in 0..3 {
        let response = app.send(post_from(uri, "198.51.100.9", &invalid)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
    for _ in 0..2 {
        let response = app.send(post_from(uri, "198.51.100.9", &customer_request())).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn unknown_address_is_not_rate_limited() {
    let app = TestApp::new();

    for _ in 0..3 {
        let response = app
            .send(json_request("POST", "/api/v1/customer-requests", None, &customer_request()))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
    assert!(app.store.customer_requests().iter().all(|r| r.ip_address.is_none()));
}

#[tokio::test]
async fn real_ip_header_is_used_without_forwarded_for() {
    let app = TestApp::new();
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/customer-requests")
        .header("content-type", "application/json")
        .header("x-real-ip", "192.0.2.10")
        .body(Body::from(customer_request().to_string()))
        .unwrap();

    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        app.store.customer_requests()[0].ip_address.as_deref(),
        Some("192.0.2.10")
    );
}

#[tokio::test]
async fn malformed_json_gets_error_envelope() {
    let app = TestApp::new();
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/customer-requests")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn storage_failure_is_500_without_details() {
    let app = TestApp::new();
    app.store.fail_inserts(true);

    let response = app
        .send(post_from("/api/v1/customer-requests", "203.0.113.7", &customer_request()))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "An internal error occurred");
    assert!(!json.to_string().contains("secret-host"));
}

// ---------------------------------------------------------------------------
// Favorites
// ---------------------------------------------------------------------------

#[tokio::test]
async fn favorite_is_stored() {
    let (app, listing_id) = seeded();
    let body = json!({
        "listing_id": listing_id,
        "customer_name": "Zeynep Kaya",
        "customer_phone": "05001112233"
    });

    let response = app.send(post_from("/api/v1/favorites", "203.0.113.7", &body)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let favorites = app.store.favorites();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].listing_id, listing_id);
}

#[tokio::test]
async fn favorites_are_unlimited_by_default() {
    let (app, listing_id) = seeded();
    let body = json!({
        "listing_id": listing_id,
        "customer_name": "Zeynep Kaya",
        "customer_phone": "05001112233"
    });

    for _ in 0..5 {
        let response = app.send(post_from("/api/v1/favorites", "203.0.113.7", &body)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn favorite_limit_applies_when_configured() {
    let mut config = test_config();
    config.intake_limits.favorite = Some(RateLimit::per_window(1, Duration::minutes(60)));
    let app = TestApp::with_config(config);
    let owner = app.store.add_profile(Role::SalesAgent);
    let listing_id = app.store.add_listing(owner);
    let body = json!({
        "listing_id": listing_id,
        "customer_name": "Zeynep Kaya",
        "customer_phone": "05001112233"
    });

    let first = app.send(post_from("/api/v1/favorites", "203.0.113.7", &body)).await;
    let second = app.send(post_from("/api/v1/favorites", "203.0.113.7", &body)).await;

    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn favorite_for_unknown_listing_is_rejected() {
    let (app, _) = seeded();
    let body = json!({
        "listing_id": Uuid::new_v4(),
        "customer_name": "Zeynep Kaya",
        "customer_phone": "05001112233"
    });

    let response = app.send(post_from("/api/v1/favorites", "203.0.113.7", &body)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.store.favorites().is_empty());
}

// ---------------------------------------------------------------------------
// Offers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn offer_is_stored_with_amount() {
    let (app, listing_id) = seeded();

    let response = app
        .send(post_from("/api/v1/offers", "203.0.113.7", &offer(listing_id)))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let offers = app.store.offers();
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].offer_amount, 1_400_000);
}

#[tokio::test]
async fn second_offer_on_same_listing_is_rate_limited() {
    let (app, listing_id) = seeded();

    let first = app
        .send(post_from("/api/v1/offers", "203.0.113.7", &offer(listing_id)))
        .await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .send(post_from("/api/v1/offers", "203.0.113.7", &offer(listing_id)))
        .await;
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    let json = body_json(second).await;
    assert_eq!(json["error"], "You have already made an offer on this listing.");
    assert_eq!(app.store.offers().len(), 1);
}

#[tokio::test]
async fn total_offer_cap_spans_listings() {
    let app = TestApp::new();
    let owner = app.store.add_profile(Role::SalesAgent);
    let listings: Vec<Uuid> = (0..5).map(|_| app.store.add_listing(owner)).collect();

    for listing_id in &listings[..4] {
        let response = app
            .send(post_from("/api/v1/offers", "203.0.113.7", &offer(*listing_id)))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .send(post_from("/api/v1/offers", "203.0.113.7", &offer(listings[4])))
        .await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        body_json(response).await["error"],
        "You can submit at most 4 offers in total."
    );
}

#[tokio::test]
async fn offer_amount_must_be_in_range() {
    let (app, listing_id) = seeded();

    for amount in [json!(-5), json!("a lot"), json!(1e13)] {
        let mut body = offer(listing_id);
        body["offer_amount"] = amount;
        let response = app.send(post_from("/api/v1/offers", "203.0.113.7", &body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
    assert!(app.store.offers().is_empty());
}

#[tokio::test]
async fn offer_on_inactive_listing_is_rejected() {
    let app = TestApp::new();
    let owner = app.store.add_profile(Role::SalesAgent);
    let mut listing = common::sample_listing(owner);
    listing.is_active = false;
    let listing_id = app.store.insert_listing(listing);

    let response = app
        .send(post_from("/api/v1/offers", "203.0.113.7", &offer(listing_id)))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
