use crate::error::FeedbackServiceError;
use error_stack::Report;

pub type ServiceResult<T> = Result<T, Report<FeedbackServiceError>>;
pub type OptServiceResult<T> = Result<Option<T>, Report<FeedbackServiceError>>;
pub mod error;
mod metrics;
pub mod routes;
pub mod service;
pub mod state;
#[cfg(test)]
mod test_engines;
