// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use std::sync::OnceLock;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize telemetry (logs + metrics)
pub fn init_telemetry() -> Result<(), BuildError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "tinta_node=debug,tinta_kernel=info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let handle = PrometheusBuilder::new().install_recorder()?;
    if PROM_HANDLE.set(handle).is_err() {
        tracing::warn!("Prometheus handle already set. Telemetry re-initialized?");
    }

    metrics::describe_counter!("tinta_store_flushes_total", "Store documents written successfully");
    metrics::describe_counter!("tinta_store_flush_failures_total", "Store writes that failed");
    metrics::describe_counter!("tinta_store_flush_reschedules_total", "Debounce timers re-armed because a write was still running");
    metrics::describe_histogram!("tinta_store_flush_duration_seconds", "Time taken to write a store document");
    metrics::describe_gauge!("tinta_store_records", "Records currently held by a store");
    metrics::describe_counter!("tinta_selector_skipped_total", "Candidates skipped because their distance failed");

    metrics::gauge!("tinta_node_up", 1.0);
    Ok(())
}

/// Get the Prometheus handle to render metrics
pub fn get_metrics() -> String {
    if let Some(handle) = PROM_HANDLE.get() {
        handle.render()
    } else {
        "# metrics not initialized".to_string()
    }
}
