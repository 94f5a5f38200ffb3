use crate::cli::ServeArgs;
use crate::infra::{load_seed, AppState};
use crate::routes::with_poll_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use polls::config::AppConfig;
use polls::error::AppError;
use polls::questions::{InMemoryPollRepository, PollService, SystemClock};
use polls::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(seed) = args.seed.take() {
        config.polls.seed_path = Some(seed);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryPollRepository::new());
    let service = PollService::new(repository).with_listing_limit(config.polls.listing_limit);

    if let Some(path) = config.polls.seed_path.as_deref() {
        load_seed(&service, path)?;
    }
    let service = Arc::new(service);

    let app = with_poll_routes(service, Arc::new(SystemClock))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        listing_limit = config.polls.listing_limit,
        "polls service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
