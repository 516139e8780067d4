use axum::{
    extract::{Path, State},
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::dispatch_controller::DispatchController;
use crate::dto::partner_dto::ApiResponse;
use crate::dto::request_dto::{CreateOfferRequest, OfferResponse};
use crate::dto::session_dto::SessionResponse;
use crate::middleware::auth::{auth_middleware, AuthenticatedPartner};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_dispatch_router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/current", get(current_offer))
        .route("/:id/accept", post(accept_offer))
        .route("/:id/reject", post(reject_offer))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        // Superficie del despachador
        .route("/", post(create_offer))
        .merge(protected)
}

async fn create_offer(
    State(state): State<AppState>,
    Json(request): Json<CreateOfferRequest>,
) -> Result<Json<ApiResponse<OfferResponse>>, AppError> {
    let controller = DispatchController::new(&state);
    let response = controller.create_offer(request).await?;
    Ok(Json(response))
}

async fn current_offer(
    State(state): State<AppState>,
    Extension(partner): Extension<AuthenticatedPartner>,
) -> Result<Json<Option<OfferResponse>>, AppError> {
    let controller = DispatchController::new(&state);
    let response = controller.current(partner.partner_id).await?;
    Ok(Json(response))
}

async fn accept_offer(
    State(state): State<AppState>,
    Extension(partner): Extension<AuthenticatedPartner>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SessionResponse>>, AppError> {
    let controller = DispatchController::new(&state);
    let response = controller.accept(partner.partner_id, id).await?;
    Ok(Json(response))
}

async fn reject_offer(
    State(state): State<AppState>,
    Extension(partner): Extension<AuthenticatedPartner>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OfferResponse>>, AppError> {
    let controller = DispatchController::new(&state);
    let response = controller.reject(partner.partner_id, id).await?;
    Ok(Json(response))
}
