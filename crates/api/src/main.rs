//! API server entry point.

use std::sync::Arc;
use std::time::Duration;

use api::AppState;
use api::config::Config;
use common::BuildInfo;
use metrics_reporter::{BuildInfoReporter, HttpMetrics, MetricRegistry};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Resolves with the name of the first termination signal received.
async fn shutdown_signal() -> &'static str {
    #[cfg(unix)]
    {
        use signal::unix::SignalKind;

        let mut terminate = signal::unix::signal(SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            result = signal::ctrl_c() => {
                result.expect("failed to install SIGINT handler");
                "SIGINT"
            }
            _ = terminate.recv() => "SIGTERM",
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
        "Ctrl-C"
    }
}

/// Periodically drains buffered histogram samples.
async fn run_upkeep(registry: MetricRegistry, period: Duration) {
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        registry.run_upkeep();
    }
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Build the registry and register collectors
    let registry = HttpMetrics::registry().expect("invalid metrics configuration");
    let metrics = HttpMetrics::register(&registry, config.status_label)
        .expect("failed to register HTTP metrics");
    tracing::info!(
        status_label = ?metrics.status_label(),
        collectors = registry.descriptors().len(),
        "metrics registry ready"
    );

    // 3. Set the build gauge before serving traffic
    let build_info = BuildInfo::from_build_env();
    let reported = BuildInfoReporter::new(&metrics).report(&build_info);
    tracing::debug!(
        reported,
        version = %build_info.version,
        commit = %build_info.commit,
        "build info"
    );

    tokio::spawn(run_upkeep(registry, config.upkeep_interval));

    // 4. Build the application
    let state = Arc::new(AppState::new(build_info));
    let app = api::create_app(state.clone(), metrics, &config.metrics_path);

    // 5. Start server
    let addr = config.addr();
    tracing::info!(%addr, metrics_path = %config.metrics_path, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    state.set_ready(true);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let received = shutdown_signal().await;
            state.set_ready(false);
            tracing::info!(signal = received, "draining connections before shutdown");
        })
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}
