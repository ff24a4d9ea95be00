use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_scoring_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use site_scoring::config::AppConfig;
use site_scoring::error::AppError;
use site_scoring::http::ScoringState;
use site_scoring::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let scoring = ScoringState::from_config(&config.scoring);
    scoring.registry.validate()?;
    for (product, total) in scoring.registry.weight_drift() {
        warn!(
            %product,
            total_weight = total,
            variant = scoring.registry.variant().label(),
            "factor weights do not sum to 1.0; scores are clamped to 100"
        );
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = with_scoring_routes(scoring)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        variant = scoring.registry.variant().label(),
        min_factors = config.scoring.min_factors,
        "site scoring service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
