use crate::error::FeedbackServiceError;
use crate::metrics;
use crate::routes::requests::{
    CreateEntityRequest, ENTITY_ID_FIELD, FeedbackQuery, StatusUpdateRequest,
    SubmitFeedbackRequest,
};
use crate::routes::responses::{
    ApiError, EntityResponse, FeedbackItem, FeedbackLinkResponse, FeedbackListResponse,
    StatusResponse, SummaryResponse,
};
use crate::service::{FeedbackService, StatusOutcome, SubmitOutcome, confirmation_message};
use crate::state::FeedbackAppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::middleware;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use const_format::concatcp;
use engine::Pagination;
use engine::error::EndpointError;
use engine::stream::StreamingResponse;
use feedback_core::validation::entity_name;
use feedback_core::{Entity, EntityId, FeedbackEngine, FeedbackSubmission, StatusChange};
use tracing::{debug, info, instrument};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

mod requests;
mod responses;

const API_ROOT_PATH: &str = "/api";
const SWAGGER_UI_PATH: &str = concatcp!(API_ROOT_PATH, "/swagger-ui");
const OPENAPI_JSON_PATH: &str = concatcp!(API_ROOT_PATH, "/api-docs/openapi.json");

const STATUS_UPDATE_PATH: &str = "/restaurants/status";
const ENTITY_LIST_PATH: &str = "/restaurants";
const ENTITY_CREATE_PATH: &str = "/restaurants";
const ENTITY_GET_PATH: &str = "/restaurants/{restaurant_id}";
const FEEDBACK_LINK_PATH: &str = "/restaurants/{restaurant_id}/feedback-link";
const FEEDBACK_LIST_PATH: &str = "/feedback";
const FEEDBACK_SUBMIT_PATH: &str = "/feedback";
const FEEDBACK_SUMMARY_PATH: &str = "/feedback/summary";
const METRICS_PATH: &str = "/metrics";

#[derive(OpenApi)]
#[openapi(
    nest(
        (path = API_ROOT_PATH, api = FeedbackDocs),
    )
)]
struct ApiDoc;

#[derive(OpenApi)]
#[openapi(paths(
    update_status,
    list_feedback,
    submit_feedback,
    feedback_summary,
    create_entity,
    list_entities,
    get_entity,
    feedback_link,
))]
struct FeedbackDocs;

pub fn build<T: FeedbackEngine>(app_state: FeedbackAppState<T>) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(routes(app_state))
        .split_for_parts();

    router.merge(SwaggerUi::new(SWAGGER_UI_PATH).url(OPENAPI_JSON_PATH, api))
}

fn routes<S, T: FeedbackEngine>(app_state: FeedbackAppState<T>) -> OpenApiRouter<S> {
    let main_router = OpenApiRouter::new()
        .route(STATUS_UPDATE_PATH, post(update_status::<T>))
        .route(ENTITY_LIST_PATH, get(list_entities::<T>))
        .route(ENTITY_CREATE_PATH, post(create_entity::<T>))
        .route(ENTITY_GET_PATH, get(get_entity::<T>))
        .route(FEEDBACK_LINK_PATH, get(feedback_link::<T>))
        .route(FEEDBACK_LIST_PATH, get(list_feedback::<T>))
        .route(FEEDBACK_SUBMIT_PATH, post(submit_feedback::<T>))
        .route(FEEDBACK_SUMMARY_PATH, get(feedback_summary::<T>));

    let router = match app_state.metrics.clone() {
        Some(handle) => {
            info!("metrics enabled, setting up metrics handler");
            main_router
                .route(METRICS_PATH, get(|| async move { handle.render() }))
                .route_layer(middleware::from_fn(metrics::track_http))
        }
        None => {
            info!("metrics not enabled, setting up service unavailable metrics handler");
            main_router.route(
                METRICS_PATH,
                get(|| async {
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "Metrics endpoint is disabled. Metrics must be enabled and the service restarted",
                    )
                }),
            )
        }
    };

    OpenApiRouter::new()
        .nest(API_ROOT_PATH, router)
        .with_state(app_state)
}

type EndpointResult = Result<Response, EndpointError<FeedbackServiceError>>;

/// Set a restaurant's status to `active` or `blocked`.
/// Setting the status a restaurant already has succeeds.
#[utoipa::path(
    post,
    path = STATUS_UPDATE_PATH,
    responses(
        (status = OK, description = "The status was set", body = StatusResponse),
        (status = BAD_REQUEST, description = "The restaurant id was missing or the status was not 'active' or 'blocked'", body = ApiError),
        (status = NOT_FOUND, description = "No restaurant with the given id exists", body = ApiError),
        (status = INTERNAL_SERVER_ERROR, description = "The status could not be stored", body = ApiError),
    ),
    request_body = StatusUpdateRequest
)]
#[instrument(skip_all, err(Debug))]
async fn update_status<T>(
    State(service): State<FeedbackService<T>>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> EndpointResult
where
    T: FeedbackEngine,
{
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return Ok(ApiError::bad_request(rejection.body_text()).into_response()),
    };

    let change = match StatusChange::parse(
        request.restaurant_id.as_deref(),
        request.status.as_deref(),
        ENTITY_ID_FIELD,
    ) {
        Ok(change) => change,
        Err(e) => {
            debug!("rejected status update: {e}");
            return Ok(ApiError::from(e).into_response());
        }
    };

    let res = match service.set_status(change).await? {
        StatusOutcome::Updated(entity) => {
            StatusResponse::ok(confirmation_message(&entity)).into_response()
        }
        StatusOutcome::NotFound => ApiError::not_found().into_response(),
    };
    Ok(res)
}

/// All feedback for a restaurant, newest first.
/// An unknown restaurant has no feedback, so the list is empty.
#[utoipa::path(
    get,
    path = FEEDBACK_LIST_PATH,
    responses(
        (status = OK, description = "The feedback for the restaurant, possibly empty", body = FeedbackListResponse),
        (status = BAD_REQUEST, description = "restaurantId was missing", body = ApiError),
        (status = INTERNAL_SERVER_ERROR, description = "Feedback could not be loaded", body = ApiError),
    ),
    params(FeedbackQuery)
)]
#[instrument(skip_all, err(Debug))]
async fn list_feedback<T>(
    State(service): State<FeedbackService<T>>,
    query: Result<Query<FeedbackQuery>, QueryRejection>,
) -> EndpointResult
where
    T: FeedbackEngine,
{
    let entity_id = match parse_query_entity(query) {
        Ok(id) => id,
        Err(e) => return Ok(e.into_response()),
    };

    let records = service.list_feedback(entity_id).await?;
    Ok(FeedbackListResponse::new(records).into_response())
}

/// Leave feedback for an active restaurant.
#[utoipa::path(
    post,
    path = FEEDBACK_SUBMIT_PATH,
    responses(
        (status = CREATED, description = "The feedback was recorded", body = FeedbackItem),
        (status = BAD_REQUEST, description = "restaurantId was missing, rating was not 1 to 5, or a text field was too long", body = ApiError),
        (status = NOT_FOUND, description = "No restaurant with the given id exists", body = ApiError),
        (status = CONFLICT, description = "The restaurant is blocked and does not take feedback", body = ApiError),
        (status = INTERNAL_SERVER_ERROR, description = "Storage failed", body = ApiError),
    ),
    request_body = SubmitFeedbackRequest
)]
#[instrument(skip_all, err(Debug))]
async fn submit_feedback<T>(
    State(service): State<FeedbackService<T>>,
    payload: Result<Json<SubmitFeedbackRequest>, JsonRejection>,
) -> EndpointResult
where
    T: FeedbackEngine,
{
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return Ok(ApiError::bad_request(rejection.body_text()).into_response()),
    };

    let submission = match FeedbackSubmission::parse(
        request.restaurant_id.as_deref(),
        request.rating,
        request.comment,
        request.author,
        ENTITY_ID_FIELD,
    ) {
        Ok(submission) => submission,
        Err(e) => return Ok(ApiError::from(e).into_response()),
    };

    let res = match service.submit_feedback(submission).await? {
        SubmitOutcome::Accepted(record) => FeedbackItem::from(record).into_response(),
        SubmitOutcome::EntityNotFound => ApiError::not_found().into_response(),
        SubmitOutcome::EntityBlocked => {
            ApiError::conflict("the restaurant is blocked and does not accept feedback")
                .into_response()
        }
    };
    Ok(res)
}

/// Count, average rating and most recent submission time for a restaurant.
#[utoipa::path(
    get,
    path = FEEDBACK_SUMMARY_PATH,
    responses(
        (status = OK, description = "The summary, with no average when there is no feedback", body = SummaryResponse),
        (status = BAD_REQUEST, description = "restaurantId was missing", body = ApiError),
        (status = INTERNAL_SERVER_ERROR, description = "Storage failed", body = ApiError),
    ),
    params(FeedbackQuery)
)]
#[instrument(skip_all, err(Debug))]
async fn feedback_summary<T>(
    State(service): State<FeedbackService<T>>,
    query: Result<Query<FeedbackQuery>, QueryRejection>,
) -> EndpointResult
where
    T: FeedbackEngine,
{
    let entity_id = match parse_query_entity(query) {
        Ok(id) => id,
        Err(e) => return Ok(e.into_response()),
    };

    let summary = service.feedback_summary(entity_id).await?;
    Ok(SummaryResponse::from(summary).into_response())
}

/// Register a restaurant. It starts out active with a generated id.
#[utoipa::path(
    post,
    path = ENTITY_CREATE_PATH,
    responses(
        (status = CREATED, description = "The restaurant was created", body = Entity),
        (status = BAD_REQUEST, description = "The name was missing or blank", body = ApiError),
        (status = INTERNAL_SERVER_ERROR, description = "Storage failed", body = ApiError),
    ),
    request_body = CreateEntityRequest
)]
#[instrument(skip_all, err(Debug))]
async fn create_entity<T>(
    State(service): State<FeedbackService<T>>,
    payload: Result<Json<CreateEntityRequest>, JsonRejection>,
) -> EndpointResult
where
    T: FeedbackEngine,
{
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return Ok(ApiError::bad_request(rejection.body_text()).into_response()),
    };

    let name = match entity_name(request.name.as_deref()) {
        Ok(name) => name,
        Err(e) => return Ok(ApiError::from(e).into_response()),
    };

    let entity = service.create_entity(name).await?;
    Ok(EntityResponse::created(entity).into_response())
}

#[utoipa::path(
    get,
    path = ENTITY_LIST_PATH,
    responses(
        (status = OK, description = "Restaurants were found on the given page", body = Vec<Entity>),
        (status = NO_CONTENT, description = "No restaurants exist on the given page"),
        (status = BAD_REQUEST, description = "page or page_size was not a number, or page_size was 0", body = ApiError),
        (status = INTERNAL_SERVER_ERROR, description = "Storage failed", body = ApiError),
    ),
    params(
        ("page" = Option<u64>, Query, description = "The 1-based page to list, defaults to 1"),
        ("page_size" = Option<u64>, Query, description = "The max number of restaurants to return, at least 1, defaults to 25"),
    )
)]
#[instrument(skip_all, err(Debug))]
async fn list_entities<T>(
    State(service): State<FeedbackService<T>>,
    pagination: Result<Query<Pagination>, QueryRejection>,
) -> EndpointResult
where
    T: FeedbackEngine,
{
    let Query(pagination) = match pagination {
        Ok(pagination) => pagination,
        Err(rejection) => return Ok(ApiError::bad_request(rejection.body_text()).into_response()),
    };

    if pagination.page_size == Some(0) {
        return Ok(ApiError::bad_request("`page_size` must be at least 1").into_response());
    }

    let entities = service.list_entities(pagination).await?;

    let res = if entities.is_empty() {
        StatusCode::NO_CONTENT.into_response()
    } else {
        StreamingResponse::ok(entities).into_response()
    };
    Ok(res)
}

#[utoipa::path(
    get,
    path = ENTITY_GET_PATH,
    responses(
        (status = OK, description = "The restaurant with the given id", body = Entity),
        (status = NOT_FOUND, description = "No restaurant with the given id exists", body = ApiError),
        (status = INTERNAL_SERVER_ERROR, description = "Storage failed", body = ApiError),
    ),
    params(
        ("restaurant_id" = String, Path, description = "The restaurant id to find"),
    )
)]
#[instrument(skip(service), err(Debug))]
async fn get_entity<T>(
    State(service): State<FeedbackService<T>>,
    Path(restaurant_id): Path<String>,
) -> EndpointResult
where
    T: FeedbackEngine,
{
    let entity = service.get_entity(EntityId::new(restaurant_id)).await?;

    Ok(entity
        .map(|e| EntityResponse::ok(e).into_response())
        .unwrap_or_else(|| ApiError::not_found().into_response()))
}

/// The public link customers use to leave feedback for a restaurant.
#[utoipa::path(
    get,
    path = FEEDBACK_LINK_PATH,
    responses(
        (status = OK, description = "The link for the restaurant", body = FeedbackLinkResponse),
        (status = NOT_FOUND, description = "No restaurant with the given id exists", body = ApiError),
        (status = INTERNAL_SERVER_ERROR, description = "Storage failed", body = ApiError),
    ),
    params(
        ("restaurant_id" = String, Path, description = "The restaurant to link to"),
    )
)]
#[instrument(skip(service), err(Debug))]
async fn feedback_link<T>(
    State(service): State<FeedbackService<T>>,
    Path(restaurant_id): Path<String>,
) -> EndpointResult
where
    T: FeedbackEngine,
{
    let restaurant_id = EntityId::new(restaurant_id);

    let res = match service.feedback_link(restaurant_id.clone()).await? {
        Some(url) => FeedbackLinkResponse { restaurant_id, url }.into_response(),
        None => ApiError::not_found().into_response(),
    };
    Ok(res)
}

fn parse_query_entity(
    query: Result<Query<FeedbackQuery>, QueryRejection>,
) -> Result<EntityId, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    Ok(EntityId::parse(query.restaurant_id.as_deref(), ENTITY_ID_FIELD)?)
}
