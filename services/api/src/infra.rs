use metrics_exporter_prometheus::PrometheusHandle;
use site_scoring::scoring::SchemaVariant;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_variant(raw: &str) -> Result<SchemaVariant, String> {
    raw.parse::<SchemaVariant>()
        .map_err(|err| format!("failed to parse '{raw}' as schema variant ({err})"))
}

pub(crate) fn parse_min_factors(raw: &str) -> Result<usize, String> {
    match raw.trim().parse::<usize>() {
        Ok(count) if count >= 1 => Ok(count),
        _ => Err(format!("'{raw}' is not a positive factor count")),
    }
}
