use crate::error::MetricsError;
use crate::metrics;
use crate::service::FeedbackService;
use axum::extract::FromRef;
use error_stack::Report;
use feedback_core::{FeedbackEngine, LinkGenerator};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct FeedbackAppState<T: FeedbackEngine> {
    pub service: FeedbackService<T>,
    /// `None` when metrics are disabled.
    pub metrics: Option<PrometheusHandle>,
}

impl<T: FeedbackEngine> FeedbackAppState<T> {
    /// Installs the global Prometheus recorder, so this can only succeed once per process.
    pub fn new_with_metrics(engine: T, links: LinkGenerator) -> Result<Self, Report<MetricsError>> {
        Ok(Self {
            service: FeedbackService::new(engine, links),
            metrics: Some(metrics::setup_recorder()?),
        })
    }

    pub fn new_without_metrics(engine: T, links: LinkGenerator) -> Self {
        Self::from_service(FeedbackService::new(engine, links))
    }

    pub fn from_service(service: FeedbackService<T>) -> Self {
        Self {
            service,
            metrics: None,
        }
    }
}

impl<T: FeedbackEngine> FromRef<FeedbackAppState<T>> for FeedbackService<T> {
    fn from_ref(input: &FeedbackAppState<T>) -> Self {
        input.service.clone()
    }
}
