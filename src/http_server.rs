use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::Config,
    handlers::health::health_check,
    metrics::{metrics_handler, track_metrics, Metrics},
    routes::api_routes,
};

#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

pub type HttpServerResult<T> = Result<T, HttpServerError>;

/// Shared, read-only request context. Verification itself keeps no state
/// between requests.
#[derive(Debug, Clone)]
pub struct AppState {
    pub metrics: Arc<Metrics>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .merge(api_routes())
        .layer(middleware::from_fn(track_metrics))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(config: Arc<Config>, metrics: Arc<Metrics>) -> HttpServerResult<()> {
    let bind_address = config.get_server_address();
    let state = AppState { metrics };
    let app = create_router(state);

    tracing::info!("Starting HTTP server on {}", bind_address);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .map_err(|source| HttpServerError::Bind {
            address: bind_address.clone(),
            source,
        })?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_app_state::create_test_app_state;
    use axum::{body::Body, http};
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_reports_service_and_version() {
        let app = create_router(create_test_app_state());

        let response = app
            .oneshot(http::Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), http::StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["healthy"], true);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn verify_route_is_mounted_at_root_with_metrics() {
        let app = create_router(create_test_app_state());

        let response = app
            .clone()
            .oneshot(
                http::Request::builder()
                    .method("POST")
                    .uri("/verify-signature")
                    .header(http::header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"message":"Hello","signature":"invalid"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), http::StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(http::Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), http::StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("signature_verifications_total"));
    }

    #[tokio::test]
    async fn cors_preflight_is_allowed() {
        let app = create_router(create_test_app_state());

        let response = app
            .oneshot(
                http::Request::builder()
                    .method("OPTIONS")
                    .uri("/verify-signature")
                    .header(http::header::ORIGIN, "http://localhost:5173")
                    .header(http::header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response
            .headers()
            .contains_key(http::header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }
}
