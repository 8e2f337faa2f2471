use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// Name of the field that carries an entity id in requests and responses.
pub const ENTITY_ID_FIELD: &str = "restaurantId";

/// Fields are optional so a missing one produces a validation message instead of a
/// deserialization failure.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    /// The restaurant to update.
    pub restaurant_id: Option<String>,
    /// Either `active` or `blocked`.
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFeedbackRequest {
    pub restaurant_id: Option<String>,
    /// Whole number from 1 to 5.
    pub rating: Option<i64>,
    pub comment: Option<String>,
    pub author: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FeedbackQuery {
    /// The restaurant whose feedback is requested.
    pub restaurant_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEntityRequest {
    pub name: Option<String>,
}
