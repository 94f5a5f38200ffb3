use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use polls::error::AppError;
use polls::questions::seed::parse_timestamp;
use polls::questions::{PollRepository, PollService, SeedImporter};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Load a seed CSV into the service, returning how many questions were stored.
pub(crate) fn load_seed<R>(service: &PollService<R>, path: &Path) -> Result<usize, AppError>
where
    R: PollRepository + 'static,
{
    let questions = SeedImporter::from_path(path)?;
    let imported = service.import(questions)?;
    info!(path = %path.display(), imported, "seeded questions");
    Ok(imported)
}

pub(crate) fn parse_now(raw: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(raw).ok_or_else(|| {
        format!("failed to parse '{raw}' as an RFC 3339 timestamp or YYYY-MM-DD date")
    })
}
