use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum::http::StatusCode;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;

use crate::api::{self, AppState};
use crate::dashboard::spawn_auto_refresh;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const BODY_LIMIT_BYTES: usize = 64 * 1024;

/// The full application: API under `/api`, the frontend bundle elsewhere
pub fn app(state: AppState, static_dir: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api::router(state))
        .fallback_service(ServeDir::new(static_dir))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(timeout_layer(REQUEST_TIMEOUT))
        .layer(cors)
}

/// Slow requests are answered with 408 rather than an empty 500
fn timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

pub async fn run(state: AppState, port: u16) -> Result<()> {
    let refresher = spawn_auto_refresh(
        state.dashboard(),
        state.config().dashboard.refresh_interval(),
    );
    let app = app(state.clone(), &state.config().server.static_dir);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Web server running at http://localhost:{}", port);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await;
    refresher.abort();
    served.context("Web server failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::get;
    use tower::ServiceExt;

    #[tokio::test(start_paused = true)]
    async fn test_slow_request_times_out() {
        let app = Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    "done"
                }),
            )
            .layer(timeout_layer(Duration::from_secs(1)));

        let request = Request::builder().uri("/slow").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }
}
