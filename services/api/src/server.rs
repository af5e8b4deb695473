use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_voter_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};
use voter_analytics::config::AppConfig;
use voter_analytics::error::AppError;
use voter_analytics::telemetry;
use voter_analytics::voters::{
    InMemoryVoterStore, VoterAnalyticsService, VoterRouterSettings, VoterStore,
};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryVoterStore::default());
    let voter_service = Arc::new(VoterAnalyticsService::new(store));
    preload(&voter_service, &config);

    let settings = VoterRouterSettings {
        page_size: config.ingest.page_size,
        default_csv: config.ingest.csv_path.clone(),
    };
    let app = with_voter_routes(voter_service, settings)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "voter analytics service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Seed the store from the configured export so the first request has data.
/// A missing or unreadable export leaves the service empty but running.
fn preload<S>(service: &VoterAnalyticsService<S>, config: &AppConfig)
where
    S: VoterStore + 'static,
{
    let path = &config.ingest.csv_path;
    if !config.ingest.preload {
        return;
    }
    if !path.exists() {
        warn!(path = %path.display(), "voter export not found; starting with an empty roll");
        return;
    }

    match service.load_path(path) {
        Ok(summary) => info!(
            path = %path.display(),
            loaded = summary.loaded,
            skipped = summary.skipped,
            "preloaded voter roll"
        ),
        Err(error) => warn!(path = %path.display(), %error, "voter preload failed"),
    }
}
