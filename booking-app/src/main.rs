//! # Booking Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize tracing (OpenTelemetry export when an OTLP endpoint is set)
//! - Initialize the repository adapter and the payment gateway
//! - Start the HTTP server

mod config;

use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use booking_hex::{
    BookingService,
    inbound::{HttpServer, JwtService},
};
use booking_repo::{Repo, build_repo};
use booking_types::PaymentGateway;
use razorpay_gateway::{RazorpayConfig, RazorpayGateway, SandboxGateway};

use config::{Config, GatewayMode};

fn init_tracer() -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // gRPC exporter with batch processing; endpoint comes from OTEL_EXPORTER_OTLP_ENDPOINT
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("booking-service"), provider))
}

async fn serve<G: PaymentGateway>(config: &Config, repo: Repo, gateway: G) -> anyhow::Result<()> {
    let service = BookingService::new(repo, gateway).with_receipts(config.receipt_strategy);
    let server = HttpServer::new(
        service,
        JwtService::new(&config.jwt_secret),
        config.admin_email.clone(),
    )
    .with_rate_limit(config.rate_limit_per_minute);

    let addr = format!("0.0.0.0:{}", config.port);
    server.run(&addr).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    let otel = match config.otlp_endpoint {
        Some(_) => Some(init_tracer()?),
        None => None,
    };
    let telemetry = otel
        .as_ref()
        .map(|(tracer, _)| tracing_opentelemetry::layer().with_tracer(tracer.clone()));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,booking_app=debug,booking_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    tracing::info!("Starting booking server on port {}", config.port);
    if otel.is_some() {
        tracing::info!("Exporting traces over OTLP");
    }

    // Build repository (handles connection and migration)
    let repo = build_repo(&config.database_url).await?;

    let result = match config.gateway_mode {
        GatewayMode::Live => {
            let gateway = RazorpayGateway::new(
                RazorpayConfig::new(&config.razorpay_key_id, &config.razorpay_key_secret)
                    .with_base_url(&config.razorpay_base_url)
                    .with_timeout(config.razorpay_timeout),
            )?;
            tracing::info!(base_url = %config.razorpay_base_url, "Using live payment gateway");
            serve(&config, repo, gateway).await
        }
        GatewayMode::Sandbox => {
            tracing::warn!("Using sandbox payment gateway; no real payments are taken");
            let gateway =
                SandboxGateway::new(&config.razorpay_key_id, &config.razorpay_key_secret);
            serve(&config, repo, gateway).await
        }
    };

    // Ensure traces are flushed before exit
    if let Some((_, provider)) = otel {
        let _ = provider.shutdown();
    }
    result
}
