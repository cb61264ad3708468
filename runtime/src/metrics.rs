//! Prometheus metrics for observability and monitoring.
//!
//! Metric collection for the store and the remote ticket service:
//! - Action dispatch and reducer timing
//! - Listener notification fan-out
//! - Effect execution
//! - Ticket service requests and failures
//!
//! The recorders are plain `metrics` facade calls, so they are free when no
//! recorder is installed.
//!
//! # Example
//!
//! ```rust,no_run
//! use prioritize_runtime::metrics::MetricsServer;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut server = MetricsServer::new("0.0.0.0:9090".parse()?);
//! server.start()?;
//!
//! if let Some(text) = server.render() {
//!     println!("{text}");
//! }
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

// Re-export metrics macros for use in other crates
pub use metrics::{counter, gauge, histogram};

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics server
    #[error("Failed to build metrics server: {0}")]
    Build(String),
    /// Failed to install metrics server
    #[error("Failed to install metrics server: {0}")]
    Install(String),
}

/// Prometheus metrics server.
///
/// Installs the global Prometheus recorder and renders the scrape text.
/// No listener is bound: `addr` is only reported, and the caller serves
/// [`MetricsServer::render`] wherever it exposes metrics.
pub struct MetricsServer {
    addr: SocketAddr,
    handle: Option<PrometheusHandle>,
}

impl MetricsServer {
    /// Create a new server.
    ///
    /// # Arguments
    ///
    /// * `addr` - Address the caller publishes the scrape text on (e.g., `0.0.0.0:9090`)
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self { addr, handle: None }
    }

    /// Address this server was configured with.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Register metric descriptions and install the Prometheus recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the server cannot be built or installed.
    ///
    /// # Note
    ///
    /// If a metrics recorder is already installed (e.g., in tests), this logs
    /// a warning and succeeds without a handle.
    pub fn start(&mut self) -> Result<(), MetricsError> {
        register_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[
                    0.000_01, 0.000_1, 0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
                ],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                tracing::info!(
                    addr = %self.addr,
                    "Prometheus recorder installed; metrics text available via render()"
                );
                Ok(())
            }
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            }
        }
    }

    /// Get the metrics handle for rendering.
    #[must_use]
    pub const fn handle(&self) -> Option<&PrometheusHandle> {
        self.handle.as_ref()
    }

    /// Render current metrics in Prometheus format.
    ///
    /// Returns `None` if this server did not install the recorder.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

/// Register all metric descriptions.
fn register_metrics() {
    // Store
    describe_counter!(
        "store_actions_dispatched_total",
        "Total number of actions applied by the store"
    );
    describe_counter!(
        "store_rejected_actions_total",
        "Actions rejected because the store was shutting down"
    );
    describe_counter!(
        "store_listener_notifications_total",
        "Total number of listener invocations"
    );
    describe_counter!("store_shutdown_total", "Shutdown lifecycle events by outcome");
    describe_histogram!(
        "reducer_execution_duration_seconds",
        "Time taken to run the reducer for one action"
    );
    describe_histogram!(
        "store_effects_per_action",
        "Number of effects returned by the reducer per action"
    );

    // Effects
    describe_counter!("effects_executed_total", "Total number of effects started, by type");
    describe_counter!(
        "effects_dropped_total",
        "Effects discarded (no runtime, or store shutting down)"
    );

    // Ticket service
    describe_counter!(
        "ticket_service_requests_total",
        "Requests issued to the ticket service, by operation"
    );
    describe_counter!(
        "ticket_service_failures_total",
        "Failed ticket service requests, by operation"
    );
    describe_histogram!(
        "ticket_service_request_duration_seconds",
        "Latency of successful ticket service requests, by operation"
    );
}

/// Store metrics recorder.
pub struct StoreMetrics;

impl StoreMetrics {
    /// Record one applied action.
    #[allow(clippy::cast_precision_loss)] // effect counts are tiny
    pub fn record_dispatch(duration: Duration, effects: usize) {
        counter!("store_actions_dispatched_total").increment(1);
        histogram!("reducer_execution_duration_seconds").record(duration.as_secs_f64());
        histogram!("store_effects_per_action").record(effects as f64);
    }

    /// Record a rejected action.
    pub fn record_rejected() {
        counter!("store_rejected_actions_total").increment(1);
    }

    /// Record a notification round.
    pub fn record_notify(listeners: usize) {
        counter!("store_listener_notifications_total").increment(listeners as u64);
    }

    /// Record a shutdown lifecycle event.
    pub fn record_shutdown(outcome: &'static str) {
        counter!("store_shutdown_total", "outcome" => outcome).increment(1);
    }
}

/// Effect metrics recorder.
pub struct EffectMetrics;

impl EffectMetrics {
    /// Record an effect start.
    pub fn record_executed(kind: &'static str) {
        counter!("effects_executed_total", "type" => kind).increment(1);
    }

    /// Record discarded effects.
    pub fn record_dropped(count: usize) {
        counter!("effects_dropped_total").increment(count as u64);
    }
}

/// Ticket service metrics recorder.
pub struct ServiceMetrics;

impl ServiceMetrics {
    /// Record an outgoing request.
    pub fn record_request(operation: &'static str) {
        counter!("ticket_service_requests_total", "operation" => operation).increment(1);
    }

    /// Record a successful response.
    pub fn record_success(operation: &'static str, duration: Duration) {
        histogram!("ticket_service_request_duration_seconds", "operation" => operation)
            .record(duration.as_secs_f64());
    }

    /// Record a failed request.
    pub fn record_failure(operation: &'static str) {
        counter!("ticket_service_failures_total", "operation" => operation).increment(1);
    }
}
