//! HTTP contract tests driven through the axum router.

mod common;

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;
use civic_core::kernel::CivicSeed;
use civic_core::server::RateLimit;
use serde_json::json;

use crate::common::*;

fn app() -> axum::Router {
    test_app(small_seed())
}

// =============================================================================
// Health + fallback
// =============================================================================

#[tokio::test]
async fn test_health_reports_healthy() {
    let app = app();
    let (status, body) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["backend"]["status"], "ok");

    let (root_status, _) = get_json(&app, "/").await;
    assert_eq!(root_status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_path_is_json_404() {
    let (status, body) = get_json(&app(), "/api/nothing-here").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
}

// =============================================================================
// Issues
// =============================================================================

#[tokio::test]
async fn test_list_issues_includes_total_users() {
    let (status, body) = get_json(&app(), "/api/issues").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_ids(&body["issues"]), vec!["parks", "roads", "schools"]);
    assert_eq!(body["total_users"], 300);
}

#[tokio::test]
async fn test_issue_detail_and_missing_issue() {
    let app = app();
    let (status, body) = get_json(&app, "/api/issues/roads").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 20);
    assert_eq!(body["related_offices"], json!(["mayor"]));
    assert_eq!(body["related_measures"], json!(["m-roads"]));

    let (status, body) = get_json(&app, "/api/issues/ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
}

#[tokio::test]
async fn test_frequencies_top_and_export() {
    let app = app();

    let (status, body) = get_json(&app, "/api/issues/frequencies").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["frequencies"],
        json!({"parks": 10, "roads": 20, "schools": 30})
    );
    assert_eq!(body["total_users"], 300);

    let (_, body) = get_json(&app, "/api/issues/top?limit=1").await;
    assert_eq!(json_ids(&body["issues"]), vec!["schools"]);

    let (_, body) = get_json(&app, "/api/issues/top").await;
    assert_eq!(body["issues"].as_array().unwrap().len(), 3);

    let (status, body) = get_json(&app, "/api/issues/export").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["issue_frequencies"]["parks"], 10);
    assert!(body["export_timestamp"].is_string());
}

#[tokio::test]
async fn test_increment_then_duplicate_then_reset() {
    let app = app();

    let (status, body) = post_json(
        &app,
        "/api/issues/increment",
        json!({"issueIds": ["parks", "ghost"], "userId": "session-1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["updated_issues"], json!(["parks"]));

    let (status, body) = post_json(
        &app,
        "/api/issues/increment",
        json!({"issueIds": ["roads"], "userId": "session-1"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (_, body) = get_json(&app, "/api/issues/frequencies").await;
    assert_eq!(body["frequencies"]["parks"], 11);
    assert_eq!(body["frequencies"]["roads"], 20);
    assert_eq!(body["total_users"], 301);

    let (status, body) = post_json(&app, "/api/issues/reset", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, body) = get_json(&app, "/api/issues/frequencies").await;
    assert_eq!(body["frequencies"]["parks"], 10);
    assert_eq!(body["total_users"], 300);

    // Tracking was cleared, so the same session may participate again
    let (status, _) = post_json(
        &app,
        "/api/issues/increment",
        json!({"issueIds": ["roads"], "userId": "session-1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_increment_validation_errors_are_400() {
    let app = app();

    for body in [
        json!({}),
        json!({"issueIds": []}),
        json!({"issueIds": "parks"}),
    ] {
        let (status, response) = post_json(&app, "/api/issues/increment", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], "Bad Request");
    }

    let (_, body) = get_json(&app, "/api/issues/frequencies").await;
    assert_eq!(body["total_users"], 300);
}

#[tokio::test]
async fn test_increment_with_only_unknown_ids_is_not_a_success() {
    let (status, body) = post_json(
        &app(),
        "/api/issues/increment",
        json!({"issueIds": ["nonexistent-id"]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["updated_issues"], json!([]));
}

// =============================================================================
// Filtered listings
// =============================================================================

#[tokio::test]
async fn test_offices_and_measures_filtering() {
    let app = app();

    let (_, body) = get_json(&app, "/api/offices").await;
    assert_eq!(json_ids(&body["offices"]), vec!["board", "mayor"]);

    let (_, body) = get_json(&app, "/api/offices?issues=roads,%20ghost,,roads").await;
    assert_eq!(json_ids(&body["offices"]), vec!["mayor"]);

    let (_, body) = get_json(&app, "/api/offices?issues=").await;
    assert!(json_ids(&body["offices"]).is_empty());

    let (_, body) = get_json(&app, "/api/ballot-measures?issues=schools").await;
    assert_eq!(json_ids(&body["ballot_measures"]), vec!["m-roads"]);

    let (status, body) = get_json(&app, "/api/ballot-measures/m-parks").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Parks Levy");

    let (status, _) = get_json(&app, "/api/offices/ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_candidate_filters_and_precedence() {
    let app = app();

    let (_, body) = get_json(&app, "/api/candidates").await;
    assert_eq!(body["candidates"].as_array().unwrap().len(), 4);

    let (_, body) = get_json(&app, "/api/candidates?issues=roads").await;
    assert_eq!(json_ids(&body["candidates"]), vec!["c-both", "c-office"]);

    // offices wins over issues
    let (_, body) = get_json(&app, "/api/candidates?issues=parks&offices=board").await;
    assert_eq!(json_ids(&body["candidates"]), vec!["c-direct"]);

    let (_, body) = get_json(&app, "/api/candidates?offices=").await;
    assert!(json_ids(&body["candidates"]).is_empty());

    let (status, body) = get_json(&app, "/api/candidates/c-free").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["office_id"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_civic_data_filters_everything_but_issues() {
    let app = app();

    let (status, body) = get_json(&app, "/api/civic-data?issues=parks").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["issues"].as_array().unwrap().len(), 3);
    assert!(json_ids(&body["offices"]).is_empty());
    assert_eq!(json_ids(&body["ballot_measures"]), vec!["m-parks"]);
    assert_eq!(json_ids(&body["candidates"]), vec!["c-direct"]);
    assert_eq!(body["total_users"], 300);

    let (_, body) = get_json(&app, "/api/civic-data").await;
    assert_eq!(json_ids(&body["offices"]), vec!["board", "mayor"]);
}

#[tokio::test]
async fn test_embedded_dataset_over_http() {
    let app = test_app(CivicSeed::embedded().unwrap());

    let (_, body) = get_json(&app, "/api/issues").await;
    assert_eq!(body["issues"].as_array().unwrap().len(), 8);
    assert_eq!(body["total_users"], 800);

    let (_, body) = get_json(&app, "/api/ballot-measures?issues=environment").await;
    assert_eq!(json_ids(&body["ballot_measures"]), vec!["measure-env-1"]);
}

// =============================================================================
// Engagement
// =============================================================================

#[tokio::test]
async fn test_completion_and_readiness_stats() {
    let app = app();

    let (_, body) = get_json(&app, "/api/readiness-stats").await;
    assert_eq!(body, json!({"yes": 0, "no": 0, "still-thinking": 0}));

    for answer in ["yes", "no", "still-thinking", "yes"] {
        let (status, body) = post_json(
            &app,
            "/api/user-completion",
            json!({
                "sessionId": "s-1",
                "userProfile": {"zip": "48502"},
                "starredCandidates": ["c-both"],
                "readinessResponse": answer
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
    }

    let (_, body) = get_json(&app, "/api/readiness-stats").await;
    assert_eq!(body, json!({"yes": 2, "no": 1, "still-thinking": 1}));

    let (_, body) = get_json(&app, "/api/user-completions?limit=3").await;
    assert_eq!(body["completions"].as_array().unwrap().len(), 3);
    assert_eq!(body["completions"][0]["readiness_response"], "yes");
}

#[tokio::test]
async fn test_email_signup_validation() {
    let app = app();

    let (status, body) = post_json(&app, "/api/email-signup", json!({"email": "no-at-sign"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");

    let (status, body) = post_json(
        &app,
        "/api/email-signup",
        json!({"email": " voter@example.org ", "source": "cast", "wantsUpdates": true}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].is_string());

    let (_, body) = get_json(&app, "/api/email-signups?source=cast").await;
    let signups = body["email_signups"].as_array().unwrap();
    assert_eq!(signups.len(), 1);
    assert_eq!(signups[0]["email"], "voter@example.org");
    assert_eq!(signups[0]["wants_updates"], true);

    let (_, body) = get_json(&app, "/api/email-signups?source=thankyou").await;
    assert!(body["email_signups"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_query_is_json_400() {
    let app = app();

    for uri in [
        "/api/issues/top?limit=abc",
        "/api/user-completions?limit=-1",
        "/api/email-signups?limit=many",
    ] {
        let (status, body) = get_json(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], "Bad Request", "{uri}");
        assert!(body["message"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn test_oversized_limit_returns_everything() {
    let app = app();
    post_json(&app, "/api/user-completion", json!({"readinessResponse": "yes"})).await;

    let uri = format!("/api/user-completions?limit={}", usize::MAX);
    let (status, body) = get_json(&app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completions"].as_array().unwrap().len(), 1);
}

// =============================================================================
// Rate limiting
// =============================================================================

fn limited_app(trust_forwarded_headers: bool) -> axum::Router {
    rate_limited_app(
        small_seed(),
        RateLimit {
            per_second: 10,
            burst_size: 1,
            trust_forwarded_headers,
        },
    )
}

fn peer(last_octet: u8) -> SocketAddr {
    SocketAddr::from(([10, 0, 0, last_octet], 40000))
}

#[tokio::test]
async fn test_rate_limit_replenishes_per_second_rate() {
    let app = limited_app(false);

    assert_eq!(get_status_from(&app, "/api/issues", peer(1), None).await, StatusCode::OK);
    assert_eq!(
        get_status_from(&app, "/api/issues", peer(1), None).await,
        StatusCode::TOO_MANY_REQUESTS
    );

    // 10 per second refills one request every 100ms
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(get_status_from(&app, "/api/issues", peer(1), None).await, StatusCode::OK);

    // Budgets are per client, health is never limited
    assert_eq!(get_status_from(&app, "/api/issues", peer(2), None).await, StatusCode::OK);
    assert_eq!(get_status_from(&app, "/health", peer(1), None).await, StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_ignores_forwarded_for_by_default() {
    let app = limited_app(false);

    assert_eq!(
        get_status_from(&app, "/api/issues", peer(1), Some("192.0.2.1")).await,
        StatusCode::OK
    );
    assert_eq!(
        get_status_from(&app, "/api/issues", peer(1), Some("192.0.2.2")).await,
        StatusCode::TOO_MANY_REQUESTS
    );
}

#[tokio::test]
async fn test_rate_limit_keys_on_forwarded_for_behind_trusted_proxy() {
    let app = limited_app(true);

    assert_eq!(
        get_status_from(&app, "/api/issues", peer(1), Some("192.0.2.1")).await,
        StatusCode::OK
    );
    assert_eq!(
        get_status_from(&app, "/api/issues", peer(1), Some("192.0.2.1")).await,
        StatusCode::TOO_MANY_REQUESTS
    );
    assert_eq!(
        get_status_from(&app, "/api/issues", peer(1), Some("192.0.2.2")).await,
        StatusCode::OK
    );
}
