use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig as _;

use synapse_domain::config::{Config, LogFormat};
use synapse_gateway::api;
use synapse_gateway::bootstrap;
use synapse_gateway::cli::{self, Cli, Command};
use synapse_gateway::tls;

/// How long in-flight TLS connections get to finish after a shutdown signal.
const TLS_DRAIN: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let config = args.settings.into_config();

    match args.command {
        // Default to serve when no subcommand is given.
        None | Some(Command::Serve) => {
            let tracer_provider = init_tracing(&config);
            run_server(Arc::new(config), tracer_provider).await
        }
        Some(Command::Check) => {
            init_cli_tracing();
            cli::config::check(&config)
        }
        Some(Command::ShowConfig) => {
            init_cli_tracing();
            cli::config::show(&config)
        }
    }
}

/// Initialize structured tracing for the `serve` command.
///
/// `RUST_LOG` wins over the configured level. When an OTLP endpoint is
/// configured, an OpenTelemetry layer exports every span via OTLP/gRPC; the
/// returned provider must be shut down on exit to flush pending spans.
fn init_tracing(config: &Config) -> Option<opentelemetry_sdk::trace::SdkTracerProvider> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.server.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = match config.server.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().pretty().boxed(),
    };

    let obs = &config.observability;
    let Some(endpoint) = &obs.otlp_endpoint else {
        tracing_subscriber::registry()
            .with(fmt_layer)
            .with(env_filter)
            .init();
        return None;
    };

    let exporter = match opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
    {
        Ok(e) => e,
        Err(e) => {
            eprintln!(
                "WARNING: failed to create OTLP exporter for {endpoint}: {e}; \
                 starting without OpenTelemetry"
            );
            tracing_subscriber::registry()
                .with(fmt_layer)
                .with(env_filter)
                .init();
            return None;
        }
    };

    let resource = opentelemetry_sdk::Resource::builder()
        .with_service_name(obs.service_name.clone())
        .build();

    let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_sampler(opentelemetry_sdk::trace::Sampler::TraceIdRatioBased(
            obs.sample_rate,
        ))
        .with_resource(resource)
        .build();

    let otel_layer =
        tracing_opentelemetry::layer().with_tracer(tracer_provider.tracer("synapse-host"));

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .with(otel_layer)
        .init();

    Some(tracer_provider)
}

/// Compact stderr-only tracing for one-shot commands, so stdout stays clean.
fn init_cli_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn log_banner(config: &Config, tls_enabled: bool) {
    tracing::info!("**************************************");
    tracing::info!("* Environment:       {}", config.environment);
    tracing::info!("* App Port:          {}", config.server.port);
    tracing::info!("* Log Level:         {}", config.server.log_level);
    tracing::info!("* SSL Enabled:       {tls_enabled}");
    tracing::info!(
        modelconfig = %serde_json::to_string(&config.model).unwrap_or_default(),
        "* LLM Configuration"
    );
    tracing::info!("**************************************");
}

async fn run_server(
    config: Arc<Config>,
    tracer_provider: Option<opentelemetry_sdk::trace::SdkTracerProvider>,
) -> anyhow::Result<()> {
    tracing::info!("synapse-host starting");

    let tls_material = tls::load(&config.server.tls)?;
    log_banner(&config, tls_material.is_some());

    let state = bootstrap::build_app_state(config.clone())?;
    let app = axum::ServiceExt::<axum::extract::Request>::into_make_service(api::app(state));

    let bind = format!("{}:{}", config.server.host, config.server.port);
    let addr: SocketAddr = tokio::net::lookup_host(&bind)
        .await
        .with_context(|| format!("resolving {bind}"))?
        .next()
        .with_context(|| format!("no address for {bind}"))?;

    match tls_material {
        None => {
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("binding to {addr}"))?;
            tracing::info!(addr = %addr, "Synapse Server listening");

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("axum server error")?;
        }
        Some(material) => {
            let rustls = tls::rustls_config(&material).await?;
            let handle = axum_server::Handle::new();
            let drain = handle.clone();
            tokio::spawn(async move {
                shutdown_signal().await;
                drain.graceful_shutdown(Some(TLS_DRAIN));
            });

            tracing::info!(addr = %addr, "HTTPS Synapse Server listening");
            axum_server::bind_rustls(addr, rustls)
                .handle(handle)
                .serve(app)
                .await
                .context("TLS server error")?;
        }
    }

    if let Some(provider) = tracer_provider {
        if let Err(e) = provider.shutdown() {
            tracing::warn!(error = ?e, "OpenTelemetry tracer provider shutdown failed");
        }
    }

    tracing::info!("shutdown complete");
    Ok(())
}

/// Wait for SIGINT or SIGTERM, then return to trigger graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => tracing::info!("received SIGINT, shutting down"),
                    _ = sigterm.recv() => tracing::info!("received SIGTERM, shutting down"),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to register SIGTERM handler");
                let _ = ctrl_c.await;
                tracing::info!("received SIGINT, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
        tracing::info!("received SIGINT, shutting down");
    }
}
