//! # Prometheus Metrics
//!
//! Request and compliance counters recorded through the `metrics` facade.
//! The binary installs a Prometheus recorder at startup and the handle is
//! rendered at `/metrics`. Without an installed recorder the macros are
//! no-ops, which is what tests run against.
//!
//! ## Counters
//! - `acm_http_requests_total{method, path, status}`
//! - `acm_http_errors_total{method, path, status}`: 4xx and 5xx responses
//! - `acm_compliance_evaluations_total{outcome}`: `compliant` / `non_compliant`

use axum::extract::{MatchedPath, Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use metrics::counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use acm_compliance::ComplianceCheckResult;

use crate::error::AppError;
use crate::state::AppState;

/// Install the global Prometheus recorder. Call once, from the binary.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    tracing::info!("Prometheus metrics recorder installed");
    Ok(handle)
}

/// Middleware that counts requests and error responses.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    let status = response.status();
    let labels = [
        ("method", method),
        ("path", path),
        ("status", status.as_u16().to_string()),
    ];
    counter!("acm_http_requests_total", &labels).increment(1);
    if status.is_client_error() || status.is_server_error() {
        counter!("acm_http_errors_total", &labels).increment(1);
    }

    response
}

/// Count one compliance evaluation by outcome.
pub fn record_compliance(result: &ComplianceCheckResult) {
    let outcome = if result.is_compliant {
        "compliant"
    } else {
        "non_compliant"
    };
    counter!("acm_compliance_evaluations_total", "outcome" => outcome).increment(1);
}

/// GET /metrics — Prometheus text exposition.
pub async fn render(State(state): State<AppState>) -> Result<Response, AppError> {
    let handle = state
        .metrics
        .as_ref()
        .ok_or_else(|| AppError::NotFound("metrics recorder not installed".into()))?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use acm_compliance::evaluate_arcade_compliance;
    use acm_core::MachineCategory;

    #[test]
    fn recording_without_recorder_is_a_no_op() {
        let result = evaluate_arcade_compliance([MachineCategory::B3]);
        record_compliance(&result);
    }

    #[test]
    fn local_recorder_renders_counters() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, || {
            record_compliance(&evaluate_arcade_compliance([MachineCategory::C]));
            record_compliance(&evaluate_arcade_compliance([MachineCategory::B3]));
        });
        let rendered = handle.render();
        assert!(rendered.contains("acm_compliance_evaluations_total"));
        assert!(rendered.contains("outcome=\"non_compliant\""));
    }
}
