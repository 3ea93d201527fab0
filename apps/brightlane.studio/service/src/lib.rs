//! Contact form API for the Brightlane marketing site.
//!
//! One binary exposes the submission endpoint the public page posts to,
//! a paginated listing for internal review, and the health probes. Rate
//! limiting is in-memory per IP; submissions land in the JSON-file-backed
//! [`contact_store::ContactStore`].

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::SystemTime;

use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, Query, Request, State};
use axum::http::header::{
    ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
    X_FRAME_OPTIONS,
};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub mod api_envelope;
pub mod config;
pub mod contact_store;

use api_envelope::{ApiErrorCode, error_response};
use config::Config;
use contact_store::{ContactListEntry, ContactStore, ContactStoreError, CreateContactInput};

const SERVICE_NAME: &str = "brightlane-contact-service";

const THROTTLE_API_LIMIT: usize = 100;
const THROTTLE_API_WINDOW_SECONDS: i64 = 15 * 60;
const THROTTLE_SUBMIT_LIMIT: usize = 5;
const THROTTLE_SUBMIT_WINDOW_SECONDS: i64 = 60 * 60;

const DEFAULT_PAGE: usize = 1;
const DEFAULT_PAGE_LIMIT: usize = 10;

pub const API_THROTTLE_MESSAGE: &str =
    "Too many requests from this IP, please try again later.";
pub const SUBMIT_THROTTLE_MESSAGE: &str =
    "Too many contact form submissions. Please try again later.";
pub const DUPLICATE_SUBMISSION_MESSAGE: &str =
    "You have already submitted a message recently. Please wait before submitting again.";
pub const MALFORMED_PAYLOAD_MESSAGE: &str =
    "Invalid form data. Please check your inputs and try again.";
pub const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong. Please try again later.";
pub const SUBMIT_SUCCESS_MESSAGE: &str =
    "Thank you for your message! We'll get back to you soon.";
pub const NOT_FOUND_MESSAGE: &str = "Endpoint not found";
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized.";

const HEADER_X_FORWARDED_FOR: &str = "x-forwarded-for";
const HEADER_X_REAL_IP: &str = "x-real-ip";
const HEADER_X_API_KEY: &str = "x-api-key";

#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    contact_store: ContactStore,
    throttle_state: ThrottleState,
    started_at: SystemTime,
}

#[derive(Clone, Default)]
struct ThrottleState {
    buckets: Arc<Mutex<HashMap<String, VecDeque<i64>>>>,
}

pub fn build_router(config: Config) -> Router {
    let contact_store = ContactStore::from_config(&config);
    build_router_with_store(config, contact_store)
}

pub fn build_router_with_store(config: Config, contact_store: ContactStore) -> Router {
    let cors = cors_layer(&config);
    let state = AppState {
        config: Arc::new(config),
        contact_store,
        throttle_state: ThrottleState::default(),
        started_at: SystemTime::now(),
    };
    let api_throttle_state = state.clone();
    let submit_throttle_state = state.clone();
    let contacts_key_state = state.clone();

    let api_router = Router::new()
        .route(
            "/api/contact/submit",
            post(submit_contact).route_layer(middleware::from_fn_with_state(
                submit_throttle_state,
                throttle_submit_gate,
            )),
        )
        .route(
            "/api/contacts",
            get(list_contacts).route_layer(middleware::from_fn_with_state(
                contacts_key_state,
                contacts_api_key_gate,
            )),
        )
        .route_layer(middleware::from_fn_with_state(
            api_throttle_state,
            throttle_api_gate,
        ));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(api_router)
        .fallback(not_found)
        .with_state(state)
        .layer(cors)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TraceLayer::new_for_http())
                .layer(SetResponseHeaderLayer::if_not_present(
                    X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    X_FRAME_OPTIONS,
                    HeaderValue::from_static("SAMEORIGIN"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    REFERRER_POLICY,
                    HeaderValue::from_static("no-referrer"),
                )),
        )
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins()
        .into_iter()
        .filter_map(|origin| HeaderValue::from_str(&origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            ACCEPT,
            ORIGIN,
            HeaderName::from_static("x-requested-with"),
        ])
        .allow_credentials(true)
}

async fn throttle_api_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let key = format!("api:{}", client_ip(request.headers(), peer_addr(&request)));
    match consume_throttle_token(
        &state.throttle_state,
        &key,
        THROTTLE_API_LIMIT,
        THROTTLE_API_WINDOW_SECONDS,
    )
    .await
    {
        Ok(()) => next.run(request).await,
        Err(retry_after_seconds) => {
            tracing::debug!(
                target: "brightlane.throttle",
                key = %key,
                retry_after_seconds,
                "global api throttle tripped",
            );
            error_response(ApiErrorCode::RateLimited, API_THROTTLE_MESSAGE).into_response()
        }
    }
}

async fn throttle_submit_gate(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let key = format!("submit:{}", client_ip(request.headers(), peer_addr(&request)));
    match consume_throttle_token(
        &state.throttle_state,
        &key,
        THROTTLE_SUBMIT_LIMIT,
        THROTTLE_SUBMIT_WINDOW_SECONDS,
    )
    .await
    {
        Ok(()) => next.run(request).await,
        Err(retry_after_seconds) => {
            tracing::debug!(
                target: "brightlane.throttle",
                key = %key,
                retry_after_seconds,
                "submit throttle tripped",
            );
            error_response(ApiErrorCode::RateLimited, SUBMIT_THROTTLE_MESSAGE).into_response()
        }
    }
}

/// Listing stays open unless a key is configured; the public site never
/// calls it.
async fn contacts_api_key_gate(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.config.contacts_api_key.as_ref() else {
        return next.run(request).await;
    };

    match header_string(request.headers(), HEADER_X_API_KEY) {
        Some(provided) if provided == *expected => next.run(request).await,
        _ => error_response(ApiErrorCode::Unauthorized, UNAUTHORIZED_MESSAGE).into_response(),
    }
}

async fn consume_throttle_token(
    throttle_state: &ThrottleState,
    bucket_key: &str,
    max_requests: usize,
    window_seconds: i64,
) -> Result<(), i64> {
    let now_epoch = Utc::now().timestamp();
    let window_start = now_epoch - window_seconds;

    let mut buckets = throttle_state.buckets.lock().await;
    let bucket = buckets.entry(bucket_key.to_string()).or_default();

    while let Some(oldest) = bucket.front() {
        if *oldest < window_start {
            let _ = bucket.pop_front();
        } else {
            break;
        }
    }

    if bucket.len() >= max_requests {
        let retry_after = bucket
            .front()
            .map(|oldest| ((*oldest + window_seconds) - now_epoch).max(1))
            .unwrap_or(1);
        return Err(retry_after);
    }

    bucket.push_back(now_epoch);
    Ok(())
}

fn peer_addr(request: &Request) -> Option<SocketAddr> {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0)
}

/// Proxy headers win over the socket peer, which behind a reverse proxy is
/// always the proxy itself.
fn client_ip(headers: &HeaderMap, peer_addr: Option<SocketAddr>) -> String {
    if let Some(value) = header_string(headers, HEADER_X_FORWARDED_FOR) {
        let first_ip = value.split(',').next().unwrap_or_default().trim();
        if !first_ip.is_empty() {
            return first_ip.to_string();
        }
    }

    if let Some(value) = header_string(headers, HEADER_X_REAL_IP) {
        return value;
    }

    peer_addr
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn header_string(headers: &HeaderMap, key: &str) -> Option<String> {
    headers
        .get(key)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Serialize)]
struct RootResponse {
    message: &'static str,
    status: &'static str,
    timestamp: String,
}

async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Contact Form API Server",
        status: "Running",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    timestamp: String,
    /// Seconds since process start.
    uptime: u64,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = match state.started_at.elapsed() {
        Ok(duration) => duration.as_secs(),
        Err(_) => 0,
    };

    Json(HealthResponse {
        status: "OK",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        uptime,
    })
}

#[derive(Debug, Deserialize)]
struct SubmitPayload {
    name: Option<String>,
    email: Option<String>,
    company: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitSuccessResponse {
    success: bool,
    message: &'static str,
    submission_id: String,
}

async fn submit_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    payload: Result<Json<SubmitPayload>, JsonRejection>,
) -> Response {
    let Ok(Json(payload)) = payload else {
        return error_response(ApiErrorCode::ValidationFailed, MALFORMED_PAYLOAD_MESSAGE)
            .into_response();
    };

    let input = CreateContactInput {
        name: payload.name.unwrap_or_default(),
        email: payload.email.unwrap_or_default(),
        company: payload.company.unwrap_or_default(),
        message: payload.message.unwrap_or_default(),
        ip_address: client_ip(&headers, connect_info.map(|info| info.0)),
        user_agent: header_string(&headers, "user-agent")
            .unwrap_or_else(|| "unknown".to_string()),
    };

    match state.contact_store.insert_submission(input).await {
        Ok(record) => {
            tracing::info!(
                target: "brightlane.contact",
                name = %record.name,
                email = %record.email,
                submitted_at = %record.submitted_at,
                "contact submission stored",
            );
            (
                StatusCode::OK,
                Json(SubmitSuccessResponse {
                    success: true,
                    message: SUBMIT_SUCCESS_MESSAGE,
                    submission_id: record.id,
                }),
            )
                .into_response()
        }
        Err(ContactStoreError::Validation { field, message }) => {
            tracing::debug!(
                target: "brightlane.contact",
                field,
                "submission rejected by validation",
            );
            error_response(ApiErrorCode::ValidationFailed, message).into_response()
        }
        Err(ContactStoreError::Duplicate { email }) => {
            tracing::debug!(
                target: "brightlane.contact",
                email = %email,
                "duplicate submission suppressed",
            );
            error_response(ApiErrorCode::DuplicateSubmission, DUPLICATE_SUBMISSION_MESSAGE)
                .into_response()
        }
        Err(ContactStoreError::Persistence { message }) => {
            tracing::error!(
                target: "brightlane.contact",
                error = %message,
                "failed to persist contact submission",
            );
            error_response(ApiErrorCode::InternalError, INTERNAL_ERROR_MESSAGE).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListContactsQuery {
    page: Option<String>,
    limit: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PaginationInfo {
    current_page: usize,
    total_pages: usize,
    total_contacts: usize,
    limit: usize,
}

#[derive(Debug, Serialize)]
struct ListContactsResponse {
    success: bool,
    data: Vec<ContactListEntry>,
    pagination: PaginationInfo,
}

/// Non-numeric and non-positive values fall back to the default, the same
/// treatment the page params got when the API fronted a document database.
fn parse_page_param(value: Option<&str>, default: usize) -> usize {
    value
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|parsed| *parsed >= 1)
        .unwrap_or(default)
}

async fn list_contacts(
    State(state): State<AppState>,
    Query(query): Query<ListContactsQuery>,
) -> Json<ListContactsResponse> {
    let page = parse_page_param(query.page.as_deref(), DEFAULT_PAGE);
    let limit = parse_page_param(query.limit.as_deref(), DEFAULT_PAGE_LIMIT);

    let contact_page = state.contact_store.list_page(page, limit).await;
    let total_pages = contact_page.total.div_ceil(limit);

    Json(ListContactsResponse {
        success: true,
        data: contact_page.entries,
        pagination: PaginationInfo {
            current_page: page,
            total_pages,
            total_contacts: contact_page.total,
            limit,
        },
    })
}

async fn not_found() -> Response {
    error_response(ApiErrorCode::NotFound, NOT_FOUND_MESSAGE).into_response()
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %error, "failed to install ctrl-c handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::warn!(error = %error, "failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests;
