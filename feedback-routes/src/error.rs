#[derive(Debug, thiserror::Error)]
#[error("feedback service failed")]
pub struct FeedbackServiceError;

#[derive(Debug, thiserror::Error)]
#[error("failed to set up metrics")]
pub struct MetricsError;
