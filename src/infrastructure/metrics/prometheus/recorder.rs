use anyhow::Context;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::{Mutex, OnceLock};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
static INSTALL: Mutex<()> = Mutex::new(());

/// Install the Prometheus recorder globally once and keep its handle.
///
/// Later calls are no-ops, so several routers in one process can share it.
pub fn init_metrics() -> anyhow::Result<()> {
    // ---
    let _guard = INSTALL
        .lock()
        .map_err(|_| anyhow::anyhow!("metrics install lock poisoned"))?;

    if HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install Prometheus recorder")?;

    // Guarded by INSTALL, so the cell is still empty here.
    let _ = HANDLE.set(handle);
    Ok(())
}

/// Render the current metrics in Prometheus text format.
pub fn render_metrics() -> String {
    HANDLE.get().map(PrometheusHandle::render).unwrap_or_default()
}
