//! Shared API plumbing
//!
//! Application state handed to every handler, per-IP rate limiting, and the
//! JSON error envelope returned on failure:
//!
//! ```json
//! {"error": {"code": "INTERNAL_ERROR", "message": "..."}}
//! ```

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::config::RateLimitConfig;
use crate::db::DynDatabasePool;
use crate::models::BudgetPost;
use crate::services::{RateLimitDecision, RateLimiter, RecordService, RecordServiceError};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: DynDatabasePool,
    pub budget_posts: Arc<RecordService<BudgetPost>>,
    /// Limits collection reads; `None` when rate limiting is off
    pub list_limiter: Option<Arc<RateLimiter>>,
    /// Limits single-record reads
    pub item_limiter: Option<Arc<RateLimiter>>,
}

impl AppState {
    /// State with the default rate limits
    pub fn new(pool: DynDatabasePool, budget_posts: RecordService<BudgetPost>) -> Self {
        Self {
            pool,
            budget_posts: Arc::new(budget_posts),
            list_limiter: None,
            item_limiter: None,
        }
        .with_rate_limits(&RateLimitConfig::default())
    }

    pub fn with_rate_limits(mut self, config: &RateLimitConfig) -> Self {
        if config.enabled {
            self.list_limiter = Some(Arc::new(RateLimiter::new(config.list_max, config.window_secs)));
            self.item_limiter = Some(Arc::new(RateLimiter::new(config.item_max, config.window_secs)));
        } else {
            self.list_limiter = None;
            self.item_limiter = None;
        }
        self
    }
}

// ============================================================================
// Rate limiting
// ============================================================================

/// Rate limit collection reads
pub async fn list_rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    enforce_rate_limit(state.list_limiter.as_deref(), request, next).await
}

/// Rate limit single-record reads
pub async fn item_rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    enforce_rate_limit(state.item_limiter.as_deref(), request, next).await
}

async fn enforce_rate_limit(limiter: Option<&RateLimiter>, request: Request, next: Next) -> Response {
    let Some(limiter) = limiter else {
        return next.run(request).await;
    };

    let decision = limiter.check(client_ip(&request)).await;
    if !decision.allowed {
        tracing::warn!(limit = decision.limit, "Rate limit exceeded");
        let mut response = ApiError::rate_limited(format!(
            "Too many requests from this IP, please try again in {} seconds.",
            decision.reset_after_secs
        ))
        .into_response();
        add_rate_limit_headers(response.headers_mut(), &decision);
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(decision.reset_after_secs));
        return response;
    }

    let mut response = next.run(request).await;
    add_rate_limit_headers(response.headers_mut(), &decision);
    response
}

/// Peer address of the connection; unspecified when the server was not
/// started with connect info
fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

fn add_rate_limit_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    let values = [
        ("ratelimit-limit", decision.limit as u64),
        ("ratelimit-remaining", decision.remaining as u64),
        ("ratelimit-reset", decision.reset_after_secs),
    ];
    for (name, value) in values {
        headers.insert(HeaderName::from_static(name), HeaderValue::from(value));
    }
}

/// Error response for API errors
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    pub fn database_unavailable(message: impl Into<String>) -> Self {
        Self::new("DATABASE_UNAVAILABLE", message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new("RATE_LIMITED", message)
    }

    pub fn status(&self) -> StatusCode {
        match self.error.code.as_str() {
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "DATABASE_UNAVAILABLE" => StatusCode::SERVICE_UNAVAILABLE,
            "RATE_LIMITED" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<RecordServiceError> for ApiError {
    fn from(err: RecordServiceError) -> Self {
        match err {
            RecordServiceError::NotFound(id) => Self::not_found(format!("Record {} not found", id)),
            RecordServiceError::Validation(e) => Self::validation_error(e.to_string()),
            RecordServiceError::InternalError(e) => {
                // Storage details stay in the log
                tracing::error!("Storage failure: {:#}", e);
                Self::internal_error("Internal server error")
            }
        }
    }
}
