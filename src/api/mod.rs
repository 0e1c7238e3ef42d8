//! API layer - HTTP handlers and routing
//!
//! Public, read-only JSON endpoints:
//! - GET /api/budget-posts (rate limited per IP)
//! - GET /api/budget-posts/{id} (stricter per-IP limit)
//! - GET /api/health

pub mod budget_posts;
pub mod health;
pub mod middleware;

use axum::{
    http::{HeaderValue, Method},
    middleware as axum_middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use middleware::{ApiError, AppState};

/// Build the API router (mounted under `/api`)
pub fn build_api_router(state: AppState) -> Router<AppState> {
    let list_routes = Router::new()
        .route("/budget-posts", get(budget_posts::list_budget_posts))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::list_rate_limit,
        ));

    let item_routes = Router::new()
        .route("/budget-posts/{id}", get(budget_posts::get_budget_post))
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::item_rate_limit,
        ));

    Router::new()
        .route("/health", get(health::health))
        .merge(list_routes)
        .merge(item_routes)
}

/// CORS for the configured origin; `*` allows any origin
fn cors_layer(cors_origin: &str) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods([Method::GET]).allow_headers(Any);

    if cors_origin == "*" {
        return cors.allow_origin(Any);
    }

    match cors_origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => {
            tracing::warn!("Invalid CORS origin {:?}, allowing any origin", cors_origin);
            cors.allow_origin(Any)
        }
    }
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    Router::new()
        .nest("/api", build_api_router(state.clone()))
        .layer(cors_layer(cors_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Migrated in-memory store wired into an [`AppState`]
#[cfg(test)]
pub(crate) async fn test_state() -> AppState {
    use crate::db::{create_test_pool, migrations, repositories::SqlxRecordRepository};
    use crate::services::RecordService;

    let pool = create_test_pool().await.expect("Failed to create test pool");
    migrations::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    let budget_posts = RecordService::new(SqlxRecordRepository::boxed(pool.clone()));
    AppState::new(pool, budget_posts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateLimitConfig;
    use axum::{
        body::{to_bytes, Body},
        extract::ConnectInfo,
        http::{header, Request, StatusCode},
    };
    use std::net::SocketAddr;
    use tower::ServiceExt;

    async fn get_with_origin(cors_origin: &str, uri: &str, origin: &str) -> axum::response::Response {
        build_router(test_state().await, cors_origin)
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .header(header::ORIGIN, origin)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_cors_any_origin() {
        let response = get_with_origin("*", "/api/budget-posts", "https://frontend.test").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_cors_configured_origin() {
        let response = get_with_origin(
            "https://dollarsandlife.test",
            "/api/budget-posts",
            "https://dollarsandlife.test",
        )
        .await;
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://dollarsandlife.test"
        );
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = get_with_origin("*", "/api/side-hustles", "https://frontend.test").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    async fn get_from(app: Router, uri: &str, peer: &str) -> axum::response::Response {
        let peer: SocketAddr = peer.parse().unwrap();
        app.oneshot(
            Request::builder()
                .uri(uri)
                .extension(ConnectInfo(peer))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
    }

    fn limited_state(state: AppState, list_max: usize, item_max: usize) -> AppState {
        state.with_rate_limits(&RateLimitConfig {
            enabled: true,
            window_secs: 900,
            list_max,
            item_max,
        })
    }

    #[tokio::test]
    async fn test_list_rate_limit() {
        let app = build_router(limited_state(test_state().await, 3, 3), "*");

        for remaining in ["2", "1", "0"] {
            let response = get_from(app.clone(), "/api/budget-posts", "10.0.0.1:5000").await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.headers()["ratelimit-limit"], "3");
            assert_eq!(response.headers()["ratelimit-remaining"], remaining);
        }

        let response = get_from(app.clone(), "/api/budget-posts", "10.0.0.1:5001").await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key(header::RETRY_AFTER));
        assert_eq!(response.headers()["ratelimit-remaining"], "0");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(error["error"]["code"], "RATE_LIMITED");

        // Another client is unaffected
        let response = get_from(app.clone(), "/api/budget-posts", "10.0.0.2:5000").await;
        assert_eq!(response.status(), StatusCode::OK);

        // Health checks are never limited
        let response = get_from(app, "/api/health", "10.0.0.1:5002").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_item_limit_is_separate_from_list_limit() {
        let app = build_router(limited_state(test_state().await, 5, 1), "*");

        let response = get_from(app.clone(), "/api/budget-posts/1", "10.0.0.1:5000").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let response = get_from(app.clone(), "/api/budget-posts/1", "10.0.0.1:5000").await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let response = get_from(app, "/api/budget-posts", "10.0.0.1:5000").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rate_limit_disabled() {
        let mut config = RateLimitConfig::default();
        config.enabled = false;
        let state = test_state().await.with_rate_limits(&config);
        let app = build_router(state, "*");

        for _ in 0..3 {
            let response = get_from(app.clone(), "/api/budget-posts", "10.0.0.1:5000").await;
            assert_eq!(response.status(), StatusCode::OK);
            assert!(!response.headers().contains_key("ratelimit-limit"));
        }
    }

    #[tokio::test]
    async fn test_endpoint_is_read_only() {
        let response = build_router(test_state().await, "*")
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/budget-posts")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
