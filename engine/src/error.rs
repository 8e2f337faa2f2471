use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use error_stack::Report;
use serde::Serialize;
use std::error::Error;

/// Body returned for every failure that is not the caller's fault.
/// Internal detail stays in the logs.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

#[derive(Debug, Serialize)]
struct InternalErrorBody {
    error: &'static str,
}

#[derive(thiserror::Error)]
#[error("there was an error running the endpoint")]
pub struct EndpointError<T: Error>(Report<T>);

impl<T: Error> std::fmt::Debug for EndpointError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl<T> From<Report<T>> for EndpointError<T>
where
    T: Error,
{
    fn from(value: Report<T>) -> Self {
        Self(value)
    }
}

impl<T: Error> IntoResponse for EndpointError<T> {
    fn into_response(self) -> axum::response::Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(InternalErrorBody {
                error: INTERNAL_ERROR_MESSAGE,
            }),
        )
            .into_response()
    }
}
