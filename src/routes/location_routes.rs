use axum::{
    extract::{Path, State},
    middleware,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::location_controller::LocationController;
use crate::dto::location_dto::{CreateLocationRequest, LocationResponse, UpdateLocationRequest};
use crate::dto::partner_dto::ApiResponse;
use crate::middleware::auth::{auth_middleware, AuthenticatedPartner};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_location_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(create_location))
        .route("/", get(list_locations))
        .route("/:id", get(get_location))
        .route("/:id", put(update_location))
        .route("/:id", delete(deactivate_location))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

async fn create_location(
    State(state): State<AppState>,
    Extension(partner): Extension<AuthenticatedPartner>,
    Json(request): Json<CreateLocationRequest>,
) -> Result<Json<ApiResponse<LocationResponse>>, AppError> {
    let controller = LocationController::new(&state);
    let response = controller.create(partner.partner_id, request).await?;
    Ok(Json(response))
}

async fn list_locations(
    State(state): State<AppState>,
    Extension(partner): Extension<AuthenticatedPartner>,
) -> Result<Json<Vec<LocationResponse>>, AppError> {
    let controller = LocationController::new(&state);
    let response = controller.list(partner.partner_id).await?;
    Ok(Json(response))
}

async fn get_location(
    State(state): State<AppState>,
    Extension(partner): Extension<AuthenticatedPartner>,
    Path(id): Path<Uuid>,
) -> Result<Json<LocationResponse>, AppError> {
    let controller = LocationController::new(&state);
    let response = controller.get(partner.partner_id, id).await?;
    Ok(Json(response))
}

async fn update_location(
    State(state): State<AppState>,
    Extension(partner): Extension<AuthenticatedPartner>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateLocationRequest>,
) -> Result<Json<ApiResponse<LocationResponse>>, AppError> {
    let controller = LocationController::new(&state);
    let response = controller.update(partner.partner_id, id, request).await?;
    Ok(Json(response))
}

async fn deactivate_location(
    State(state): State<AppState>,
    Extension(partner): Extension<AuthenticatedPartner>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<LocationResponse>>, AppError> {
    let controller = LocationController::new(&state);
    let response = controller.deactivate(partner.partner_id, id).await?;
    Ok(Json(response))
}
