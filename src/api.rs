//! HTTP surface for the learning topics service.
//!
//! This module exposes a compact Axum router:
//!
//! - `GET /` – Fixed welcome descriptor (`message`, `version`, `status`).
//! - `GET /health` – Liveness probe returning `status: "OK"` and a fresh UTC timestamp.
//! - `GET /topics` – Every topic in creation order.
//! - `GET /topics/:id` – A single topic, or 404 when the id has no leading integer or is unknown.
//! - `POST /topics` – Create a topic from `{title, description}`; responds 201.
//! - `PUT /topics/:id/complete` – Mark a topic complete (idempotent).
//!
//! Dispatch is two-stage: exact method+path routes first, then a fallback that answers
//! `Route not found`. Store failures and handler panics are logged and collapsed into a generic
//! 500 so internal details never reach the client. Every response carries permissive CORS
//! headers and a small set of security headers.

use crate::store::{NewTopic, StoreError, Topic, TopicStore};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{
        DefaultBodyLimit, Path, State,
        rejection::{BytesRejection, PathRejection},
    },
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::{get, put},
};
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;
use time::{OffsetDateTime, macros::format_description};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{self, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

const WELCOME_MESSAGE: &str = "Welcome to the Learning App!";
const TOPIC_NOT_FOUND: &str = "Topic not found";
const ROUTE_NOT_FOUND: &str = "Route not found";
const FIELDS_REQUIRED: &str = "Title and description are required";
const INTERNAL_ERROR: &str = "Something went wrong!";

/// Request bodies above this size are refused as an internal fault.
const BODY_LIMIT_BYTES: usize = 100 * 1024;

const SECURITY_HEADERS: [(&str, &str); 6] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-dns-prefetch-control", "off"),
    ("referrer-policy", "no-referrer"),
    ("x-download-options", "noopen"),
    ("x-permitted-cross-domain-policies", "none"),
];

/// Build the HTTP router over an injected topic store.
pub fn create_router<S>(store: Arc<S>) -> Router
where
    S: TopicStore + 'static,
{
    let mut router = Router::new()
        .route("/", get(welcome).fallback(route_not_found))
        .route("/health", get(health).fallback(route_not_found))
        .route(
            "/topics",
            get(list_topics::<S>)
                .post(create_topic::<S>)
                .fallback(route_not_found),
        )
        .route(
            "/topics/:id",
            get(get_topic::<S>).fallback(route_not_found),
        )
        .route(
            "/topics/:id/complete",
            put(complete_topic::<S>).fallback(route_not_found),
        )
        .fallback(route_not_found)
        .with_state(store)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(CatchPanicLayer::custom(handle_panic));

    for (name, value) in SECURITY_HEADERS {
        router = router.layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ));
    }

    router
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_headers(cors::Any)
}

/// Response body for `GET /`.
#[derive(Serialize)]
struct WelcomeResponse {
    message: &'static str,
    version: &'static str,
    status: &'static str,
}

async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: WELCOME_MESSAGE,
        version: env!("CARGO_PKG_VERSION"),
        status: "healthy",
    })
}

/// Response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

async fn health() -> Result<Json<HealthResponse>, AppError> {
    Ok(Json(HealthResponse {
        status: "OK",
        timestamp: current_timestamp()?,
    }))
}

/// Format the current UTC time as ISO-8601 with millisecond precision.
fn current_timestamp() -> Result<String, AppError> {
    let layout = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
    );
    OffsetDateTime::now_utc()
        .format(layout)
        .map_err(|err| AppError::Internal(format!("failed to format timestamp: {err}")))
}

async fn list_topics<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<Topic>>, AppError>
where
    S: TopicStore,
{
    Ok(Json(store.list()?))
}

async fn get_topic<S>(
    State(store): State<Arc<S>>,
    raw_id: Result<Path<String>, PathRejection>,
) -> Result<Json<Topic>, AppError>
where
    S: TopicStore,
{
    let id = topic_id(raw_id)?;
    match store.get(id)? {
        Some(topic) => Ok(Json(topic)),
        None => {
            tracing::debug!(id, "Topic lookup missed");
            Err(AppError::NotFound(TOPIC_NOT_FOUND))
        }
    }
}

/// Create a topic from a JSON body carrying non-empty `title` and `description` strings.
///
/// Bodies without an `application/json` content type are treated as empty, so they fail
/// validation rather than parsing. Oversized bodies, bodies that do not parse, and top-level
/// JSON scalars are internal faults.
async fn create_topic<S>(
    State(store): State<Arc<S>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<Topic>), AppError>
where
    S: TopicStore,
{
    let body =
        body.map_err(|err| AppError::Internal(format!("failed to read request body: {err}")))?;
    let input = parse_new_topic(&headers, &body)?;
    let topic = store.create(input)?;
    tracing::info!(id = topic.id, title = %topic.title, "Created topic");
    Ok((StatusCode::CREATED, Json(topic)))
}

async fn complete_topic<S>(
    State(store): State<Arc<S>>,
    raw_id: Result<Path<String>, PathRejection>,
) -> Result<Json<Topic>, AppError>
where
    S: TopicStore,
{
    let id = topic_id(raw_id)?;
    match store.complete(id)? {
        Some(topic) => {
            tracing::info!(id, "Marked topic complete");
            Ok(Json(topic))
        }
        None => {
            tracing::debug!(id, "Completion target missing");
            Err(AppError::NotFound(TOPIC_NOT_FOUND))
        }
    }
}

async fn route_not_found(method: Method, uri: Uri) -> AppError {
    tracing::debug!(%method, %uri, "No route matched");
    AppError::NotFound(ROUTE_NOT_FOUND)
}

/// Resolve the `:id` segment. A segment that fails to decode can never match a topic.
fn topic_id(raw: Result<Path<String>, PathRejection>) -> Result<u64, AppError> {
    match raw {
        Ok(Path(raw)) => parse_id(&raw).ok_or_else(|| {
            tracing::debug!(raw = %raw, "Topic id has no usable integer prefix");
            AppError::NotFound(TOPIC_NOT_FOUND)
        }),
        Err(rejection) => {
            tracing::debug!(%rejection, "Undecodable topic id");
            Err(AppError::NotFound(TOPIC_NOT_FOUND))
        }
    }
}

/// Read the leading integer of `raw`, ignoring leading whitespace and anything after the digits.
///
/// Negative values and values too large for `u64` are `None`, as no topic can carry them.
fn parse_id(raw: &str) -> Option<u64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = rest
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(rest.len());
    let value: u64 = rest[..end].parse().ok()?;
    (!negative || value == 0).then_some(value)
}

fn parse_new_topic(headers: &HeaderMap, body: &[u8]) -> Result<NewTopic, AppError> {
    if !is_json(headers) || body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::BadRequest(FIELDS_REQUIRED));
    }
    let payload: Value = serde_json::from_slice(body)
        .map_err(|err| AppError::Internal(format!("malformed JSON body: {err}")))?;
    if !(payload.is_object() || payload.is_array()) {
        return Err(AppError::Internal(
            "JSON body must be an object or array".to_string(),
        ));
    }
    let field = |name: &str| payload.get(name).and_then(Value::as_str);
    field("title")
        .zip(field("description"))
        .and_then(|(title, description)| NewTopic::new(title, description))
        .ok_or(AppError::BadRequest(FIELDS_REQUIRED))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = err.downcast_ref::<String>() {
        message.as_str()
    } else if let Some(message) = err.downcast_ref::<&str>() {
        message
    } else {
        "unknown panic payload"
    };
    AppError::Internal(format!("handler panicked: {detail}")).into_response()
}

/// Flat JSON error body shared by every failure response.
#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

/// Failures a handler can report, each mapped to a status code and a fixed message.
#[derive(Debug)]
enum AppError {
    NotFound(&'static str),
    BadRequest(&'static str),
    /// Carries the cause for the server log only.
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            Self::NotFound(message) => (StatusCode::NOT_FOUND, message),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Internal(cause) => {
                tracing::error!(cause = %cause, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
            }
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(inner: StoreError) -> Self {
        Self::Internal(inner.to_string())
    }
}
