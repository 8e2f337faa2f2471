use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use feedback_core::model::FeedbackSummary;
use feedback_core::{Entity, EntityId, FeedbackId, FeedbackRecord, ValidationError};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use utoipa::ToSchema;

pub type ErrorMessageType = Cow<'static, str>;

/// Every non-2xx response body has this shape.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    #[serde(skip)]
    status_code: StatusCode,
    error: ErrorMessageType,
}

impl ApiError {
    pub fn new(status_code: StatusCode, error: impl Into<ErrorMessageType>) -> Self {
        Self {
            status_code,
            error: error.into(),
        }
    }

    pub fn bad_request(error: impl Into<ErrorMessageType>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "the requested restaurant does not exist")
    }

    pub fn conflict(error: impl Into<ErrorMessageType>) -> Self {
        Self::new(StatusCode::CONFLICT, error)
    }
}

impl From<ValidationError> for ApiError {
    fn from(value: ValidationError) -> Self {
        Self::bad_request(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

impl StatusResponse {
    pub fn ok(message: String) -> Self {
        Self {
            success: true,
            message,
        }
    }
}

impl IntoResponse for StatusResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackItem {
    pub id: FeedbackId,
    pub restaurant_id: EntityId,
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<FeedbackRecord> for FeedbackItem {
    fn from(value: FeedbackRecord) -> Self {
        Self {
            id: value.id,
            restaurant_id: value.entity_id,
            rating: value.rating,
            comment: value.comment,
            author: value.author,
            created_at: value.created_at,
        }
    }
}

impl IntoResponse for FeedbackItem {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FeedbackListResponse {
    /// Newest first.
    pub feedback: Vec<FeedbackItem>,
}

impl FeedbackListResponse {
    pub fn new(records: Vec<FeedbackRecord>) -> Self {
        Self {
            feedback: records.into_iter().map(FeedbackItem::from).collect(),
        }
    }
}

impl IntoResponse for FeedbackListResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub restaurant_id: EntityId,
    pub count: usize,
    /// Absent when there is no feedback yet.
    pub average_rating: Option<f64>,
    pub latest: Option<DateTime<Utc>>,
}

impl From<FeedbackSummary> for SummaryResponse {
    fn from(value: FeedbackSummary) -> Self {
        Self {
            restaurant_id: value.entity_id,
            count: value.count,
            average_rating: value.average_rating,
            latest: value.latest,
        }
    }
}

impl IntoResponse for SummaryResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EntityResponse {
    #[serde(skip)]
    status_code: StatusCode,
    #[serde(flatten)]
    entity: Entity,
}

impl EntityResponse {
    pub fn ok(entity: Entity) -> Self {
        Self {
            status_code: StatusCode::OK,
            entity,
        }
    }

    pub fn created(entity: Entity) -> Self {
        Self {
            status_code: StatusCode::CREATED,
            entity,
        }
    }
}

impl IntoResponse for EntityResponse {
    fn into_response(self) -> Response {
        (self.status_code, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackLinkResponse {
    pub restaurant_id: EntityId,
    pub url: String,
}

impl IntoResponse for FeedbackLinkResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
