//! HTTP surface: prediction, health checks, CORS and Prometheus metrics.

mod error;
mod routes;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};

use crate::config::ServerConfig;
use crate::inference::Predictor;

pub use error::{ApiError, ErrorBody};
pub use routes::{HealthStatus, configure};

/// Namespace prefixed to every exported metric name.
pub const METRICS_NAMESPACE: &str = "heartwise";

/// Build the request-instrumentation middleware serving `endpoint`.
pub fn build_metrics(endpoint: &str) -> Result<PrometheusMetrics, String> {
    PrometheusMetricsBuilder::new(METRICS_NAMESPACE)
        .endpoint(endpoint)
        .build()
        .map_err(|err| format!("Failed to build metrics middleware: {err}"))
}

/// Permissive CORS: any origin, method and header, with credentials allowed.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}

/// Serve until shutdown. The predictor is shared read-only across workers.
pub async fn run(config: ServerConfig, predictor: Predictor) -> std::io::Result<()> {
    let predictor = web::Data::new(predictor);
    let metrics = build_metrics(&config.metrics_endpoint).map_err(std::io::Error::other)?;

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(cors())
            .wrap(metrics.clone())
            .app_data(predictor.clone())
            .configure(configure)
    });
    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    let (host, port) = config.bind_address();
    tracing::info!("Serving predictions on http://{host}:{port}");
    tracing::info!("Metrics exposed at {}", config.metrics_endpoint);
    server.bind((host, port))?.run().await
}
