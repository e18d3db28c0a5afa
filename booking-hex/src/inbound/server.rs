//! HTTP Server configuration and startup.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use booking_types::{AppointmentRepository, PaymentGateway};

use super::auth::{AuthState, admin_auth, user_auth};
use super::handlers::{self, AppState};
use super::jwt::JwtService;
use super::rate_limit::{RateLimiterState, rate_limit_middleware};
use crate::BookingService;
use crate::openapi::ApiDoc;

/// HTTP Server for the booking API.
pub struct HttpServer<R: AppointmentRepository, G: PaymentGateway> {
    state: Arc<AppState<R, G>>,
    auth: Arc<AuthState>,
    rate_limiter: Arc<RateLimiterState>,
}

impl<R: AppointmentRepository, G: PaymentGateway> HttpServer<R, G> {
    /// Creates a new HTTP server with the default rate limit (100 req/min).
    pub fn new(
        service: BookingService<R, G>,
        jwt: JwtService,
        admin_email: impl Into<String>,
    ) -> Self {
        Self {
            state: Arc::new(AppState { service }),
            auth: Arc::new(AuthState {
                jwt,
                admin_email: admin_email.into(),
            }),
            rate_limiter: Arc::new(RateLimiterState::default()),
        }
    }

    /// Overrides the per-caller request quota.
    pub fn with_rate_limit(mut self, requests_per_minute: u32) -> Self {
        self.rate_limiter = Arc::new(RateLimiterState::new(requests_per_minute));
        self
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        // Build HTTP metrics layer (uses globally set MeterProvider)
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        let user_routes = Router::new()
            .route(
                "/api/payment/create-order",
                post(handlers::create_order::<R, G>),
            )
            .route("/api/payment/verify", post(handlers::verify_payment::<R, G>))
            .route(
                "/api/user/book-appointment",
                post(handlers::book_appointment::<R, G>),
            )
            .route(
                "/api/user/appointments",
                get(handlers::list_appointments::<R, G>),
            )
            .route(
                "/api/user/cancel-appointment",
                post(handlers::cancel_appointment::<R, G>),
            )
            .route("/api/user/mark-paid", post(handlers::mark_paid::<R, G>))
            .route_layer(middleware::from_fn_with_state(self.auth.clone(), user_auth));

        let admin_routes = Router::new()
            .route("/api/admin/payments", get(handlers::list_payments::<R, G>))
            .route_layer(middleware::from_fn_with_state(
                self.auth.clone(),
                admin_auth,
            ));

        Router::new()
            .route("/health", get(handlers::health))
            .route(
                "/api/doctor/{doc_id}/slots",
                get(handlers::doctor_slots::<R, G>),
            )
            .merge(user_routes)
            .merge(admin_routes)
            .layer(metrics)
            .layer(middleware::from_fn_with_state(
                (self.rate_limiter.clone(), self.auth.clone()),
                rate_limit_middleware,
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        // Peer addresses key the rate limiter for callers without a valid token.
        let app = self.router().into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Ctrl+C handler unavailable: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("SIGTERM handler unavailable: {}", e);
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

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
