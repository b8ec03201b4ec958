//! HTTP server setup.
//!
//! # Responsibilities
//! - Build the axum router for the API and admin routes
//! - Wire up middleware (request id, tracing, timeout, body limit, metrics)
//! - Serve until Ctrl+C

use axum::{
    body::Body,
    extract::{MatchedPath, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{AdminConfig, ServerConfig};
use crate::http::{admin, handlers};
use crate::ledger::Ledger;
use crate::observability::metrics;
use crate::onboarding::OnboardingService;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// State shared by every handler.
pub struct AppState<L> {
    pub service: OnboardingService<L>,
    pub ledger: Arc<L>,
    pub admin_key: Arc<str>,
    pub started: Instant,
}

impl<L> Clone for AppState<L> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            ledger: self.ledger.clone(),
            admin_key: self.admin_key.clone(),
            started: self.started,
        }
    }
}

impl<L: Ledger> AppState<L> {
    pub fn new(service: OnboardingService<L>, ledger: Arc<L>, admin: &AdminConfig) -> Self {
        Self {
            service,
            ledger,
            admin_key: Arc::from(admin.api_key.as_str()),
            started: Instant::now(),
        }
    }
}

/// Build the router with all middleware layers.
#[allow(deprecated)]
pub fn build_router<L: Ledger>(
    state: AppState<L>,
    server: &ServerConfig,
    admin: &AdminConfig,
) -> Router {
    let api: Router<AppState<L>> = Router::new()
        .route(
            "/api/v1/wallet",
            post(handlers::provision_wallet::<L>)
                .get(handlers::get_wallet::<L>)
                .delete(handlers::delete_wallet::<L>),
        )
        .route("/api/v1/dashboard", get(handlers::dashboard::<L>))
        .route("/api/v1/onboarding", get(handlers::onboarding::<L>))
        .route(
            "/api/v1/profile",
            get(handlers::get_profile::<L>).post(handlers::submit_profile::<L>),
        )
        .route("/api/v1/profile/exists", get(handlers::profile_exists::<L>))
        .route("/api/v1/air-quality", get(handlers::air_quality::<L>));

    let mut router: Router<AppState<L>> = Router::new()
        .route("/health", get(handlers::health))
        .merge(api);

    if admin.enabled {
        let admin_routes: Router<AppState<L>> = Router::new()
            .route("/admin/status", get(admin::get_status::<L>))
            .route("/admin/wallets/clear", post(admin::clear_wallets::<L>))
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                admin::admin_auth::<L>,
            ));
        router = router.merge(admin_routes);
    }

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    router
        .route_layer(middleware::from_fn(track_metrics))
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(server.request_timeout_secs)))
        .layer(RequestBodyLimitLayer::new(server.max_body_size))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            let request_id = request
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        }))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}

async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    metrics::record_request(&method, response.status().as_u16(), &route, start);
    response
}

/// HTTP server for the onboarding API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new<L: Ledger>(state: AppState<L>, server: &ServerConfig, admin: &AdminConfig) -> Self {
        Self {
            router: build_router(state, server, admin),
        }
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
