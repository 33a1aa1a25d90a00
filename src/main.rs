use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use opentelemetry::KeyValue;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::{Config, SdkTracerProvider};
use tracing::{error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use api::AppState;
use config::AppConfig;
use dal::Store;
use geocode::{Geocoder, PostcodesIoGeocoder};
use notify::UpdateBroadcaster;
use report::{RouteReportFormatter, TextReportFormatter};

mod api;
mod config;
mod dal;
mod geocode;
mod model;
mod notify;
mod report;
mod routing;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    _ = dotenv();

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_timeout(Duration::from_millis(1000))
        .with_endpoint(
            dotenvy::var("OTLP_ENDPOINT").unwrap_or("http://localhost:4317".to_string()),
        )
        .with_protocol(opentelemetry_otlp::Protocol::Grpc)
        .build()
        .context("error building the span exporter")?;

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_config(
            Config::default().with_resource(
                Resource::builder()
                    .with_attribute(KeyValue::new("service.name", "magicsell_backend"))
                    .build(),
            ),
        )
        .build();

    let tracer = provider.tracer("magicsell_backend");

    let telemetry_layer = tracing_opentelemetry::layer().with_tracer(tracer);

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let appender = tracing_appender::rolling::daily("./logs", "magicsell_backend.log");
    let (non_blocking_appender, _guard) = tracing_appender::non_blocking(appender);

    // A layer that logs events to rolling files.
    let file_log = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_appender)
        .with_ansi(false)
        .pretty();

    Registry::default()
        .with(telemetry_layer)
        .with(file_log)
        .with(env_filter)
        .init();

    let config = Arc::new(AppConfig::load()?);

    let store = Arc::new(Store::open(&config.data_file).await);
    let geocoder: Arc<dyn Geocoder> = Arc::new(PostcodesIoGeocoder::new(
        reqwest::Client::new(),
        config.geocoder_base_url.clone(),
    ));
    let formatter: Arc<dyn RouteReportFormatter> = Arc::new(TextReportFormatter);
    let updates = Arc::new(UpdateBroadcaster::new(32));

    let app = api::router(AppState {
        store,
        geocoder,
        updates,
        formatter,
        config: config.clone(),
    });

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("couldn't bind port {}", config.port))?;
    info!("listening on http://0.0.0.0:{}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("error listening for shutdown: {e}");
    }
}
