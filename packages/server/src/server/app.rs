//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::error::not_found_handler;
use crate::server::routes::{
    civic_data_handler, export_issues_handler, get_ballot_measure_handler, get_candidate_handler,
    get_issue_handler, get_office_handler, health_handler, increment_issues_handler,
    issue_frequencies_handler, list_ballot_measures_handler, list_candidates_handler,
    list_completions_handler, list_email_signups_handler, list_issues_handler,
    list_offices_handler, readiness_stats_handler, record_completion_handler,
    record_email_signup_handler, reset_issues_handler, top_issues_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AxumAppState {
    pub server_deps: ServerDeps,
}

/// Per-client request budget
#[derive(Debug, Clone, Copy)]
pub struct RateLimit {
    /// Requests replenished per second
    pub per_second: u64,
    pub burst_size: u32,
    /// Key on `X-Forwarded-For` instead of the peer address. Only safe behind a
    /// proxy that overwrites the header.
    pub trust_forwarded_headers: bool,
}

impl RateLimit {
    /// Milliseconds between replenished requests, `None` for a zero rate
    pub fn replenish_interval_ms(&self) -> Option<u64> {
        match self.per_second {
            0 => None,
            rate => Some((1000 / rate).max(1)),
        }
    }
}

/// Build the Axum application router
///
/// `rate_limit: None` disables the governor layer. Unless forwarded headers are
/// trusted the governor keys on the peer address, so the router must be served
/// with `into_make_service_with_connect_info`.
pub fn build_app(
    server_deps: ServerDeps,
    allowed_origins: Vec<String>,
    rate_limit: Option<RateLimit>,
) -> Router {
    let app_state = AxumAppState { server_deps };

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    let api = Router::new()
        // Issues
        .route("/api/issues", get(list_issues_handler))
        .route("/api/issues/frequencies", get(issue_frequencies_handler))
        .route("/api/issues/top", get(top_issues_handler))
        .route("/api/issues/export", get(export_issues_handler))
        .route("/api/issues/increment", post(increment_issues_handler))
        .route("/api/issues/reset", post(reset_issues_handler))
        .route("/api/issues/:id", get(get_issue_handler))
        // Related entities
        .route("/api/offices", get(list_offices_handler))
        .route("/api/offices/:id", get(get_office_handler))
        .route("/api/ballot-measures", get(list_ballot_measures_handler))
        .route("/api/ballot-measures/:id", get(get_ballot_measure_handler))
        .route("/api/candidates", get(list_candidates_handler))
        .route("/api/candidates/:id", get(get_candidate_handler))
        .route("/api/civic-data", get(civic_data_handler))
        // Engagement
        .route("/api/user-completion", post(record_completion_handler))
        .route("/api/user-completions", get(list_completions_handler))
        .route("/api/email-signup", post(record_email_signup_handler))
        .route("/api/email-signups", get(list_email_signups_handler))
        .route("/api/readiness-stats", get(readiness_stats_handler));

    let api = match rate_limit {
        Some(limit) => with_rate_limit(api, limit),
        None => api,
    };

    Router::new()
        // Health check (no rate limit)
        .route("/", get(health_handler))
        .route("/health", get(health_handler))
        .merge(api)
        .fallback(not_found_handler)
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn with_rate_limit(api: Router, limit: RateLimit) -> Router {
    let Some(interval_ms) = limit.replenish_interval_ms() else {
        tracing::warn!(?limit, "Zero rate limit, rate limiting disabled");
        return api;
    };

    let mut builder = GovernorConfigBuilder::default();
    builder.per_millisecond(interval_ms).burst_size(limit.burst_size);

    // use_headers adds x-ratelimit-* response headers
    if limit.trust_forwarded_headers {
        match builder
            .key_extractor(SmartIpKeyExtractor)
            .use_headers()
            .finish()
        {
            Some(config) => api.layer(GovernorLayer {
                config: Arc::new(config),
            }),
            None => {
                tracing::warn!(?limit, "Invalid rate limit settings, rate limiting disabled");
                api
            }
        }
    } else {
        // Peer address only, needs `into_make_service_with_connect_info`
        match builder.use_headers().finish() {
            Some(config) => api.layer(GovernorLayer {
                config: Arc::new(config),
            }),
            None => {
                tracing::warn!(?limit, "Invalid rate limit settings, rate limiting disabled");
                api
            }
        }
    }
}
